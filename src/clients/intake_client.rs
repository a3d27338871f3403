/// 分析服务 API 客户端
///
/// 封装 `/upload/` 与 `/analyze/all` 两个调用；两者都不带认证信息
use crate::config::Config;
use crate::error::{AnalysisError, AppResult, ConfigError, UploadError};
use crate::models::{AnalysisResult, PdfFile, ACCEPTED_MIME};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};

const UPLOAD_PATH: &str = "/upload/";
const ANALYZE_PATH: &str = "/analyze/all";

/// 上传成功后服务端的回执
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadReceipt {
    /// 服务端返回的 `message`，可能不存在
    pub message: Option<String>,
}

/// 远程分析服务的能力边界
///
/// 编排层只依赖这个 trait，测试里可以换成进程内的假实现。
#[async_trait]
pub trait IntakeApi: Send + Sync {
    /// 把整批文件作为一个 multipart 请求上传
    async fn upload(&self, files: &[PdfFile]) -> Result<UploadReceipt, UploadError>;

    /// 分析服务端已有的全部文档
    async fn analyze_all(&self) -> Result<AnalysisResult, AnalysisError>;
}

/// 基于 reqwest 的 HTTP 客户端
pub struct IntakeClient {
    http: Client,
    base_url: String,
}

impl IntakeClient {
    /// 创建新的客户端；配置了超时则所有请求都受其约束
    pub fn new(config: &Config) -> AppResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(ConfigError::HttpClient)?;

        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl IntakeApi for IntakeClient {
    async fn upload(&self, files: &[PdfFile]) -> Result<UploadReceipt, UploadError> {
        let mut form = Form::new();
        for file in files {
            let part = Part::bytes(file.bytes.as_ref().clone())
                .file_name(file.name.clone())
                .mime_str(ACCEPTED_MIME)
                .map_err(|source| UploadError::Transport { source })?;
            form = form.part("files", part);
        }

        let url = self.endpoint(UPLOAD_PATH);
        debug!("上传 {} 个文件到 {}", files.len(), url);

        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|source| UploadError::Transport { source })?;

        let status = response.status();
        let body = read_json_body(response).await;
        debug!("上传响应: {} {}", status, body);

        if !status.is_success() {
            let message = server_message(&body, &["message", "detail"])
                .unwrap_or_else(|| status_text(status));
            warn!("上传被拒绝: {} - {}", status, message);
            return Err(UploadError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        Ok(UploadReceipt {
            message: server_message(&body, &["message"]),
        })
    }

    async fn analyze_all(&self) -> Result<AnalysisResult, AnalysisError> {
        let url = self.endpoint(ANALYZE_PATH);
        debug!("请求分析: {}", url);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|source| AnalysisError::Transport { source })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|source| AnalysisError::Transport { source })?;

        if !status.is_success() {
            let body: Value = serde_json::from_str(&text).unwrap_or(Value::Null);
            let message = server_message(&body, &["detail"])
                .unwrap_or_else(|| format!("Analysis failed (HTTP {})", status.as_u16()));
            warn!("分析被拒绝: {} - {}", status, message);
            return Err(AnalysisError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        AnalysisResult::from_json_str(&text)
    }
}

/// 读取 JSON 响应体，非 JSON 时返回 `Null`
async fn read_json_body(response: reqwest::Response) -> Value {
    match response.text().await {
        Ok(text) => serde_json::from_str(&text).unwrap_or(Value::Null),
        Err(e) => {
            warn!("读取响应体失败: {}", e);
            Value::Null
        }
    }
}

/// 依次取 `keys` 中第一个非空的字段作为服务端消息
pub(crate) fn server_message(body: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match body.get(*key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Null | Value::String(_) => None,
        other => Some(other.to_string()),
    })
}

/// HTTP 状态文本，如 `Internal Server Error`
fn status_text(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| status.as_u16().to_string())
}
