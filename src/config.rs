use crate::error::{AppError, AppResult, ConfigError};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// 程序配置文件
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// 分析服务地址
    pub api_base_url: String,
    /// 请求超时（秒），为空表示一直等待
    pub request_timeout_secs: Option<u64>,
    // --- 上传进度模拟 ---
    pub upload_tick_ms: u64,
    pub upload_step: u8,
    pub upload_cap: u8,
    // --- 分析阶段计时（毫秒） ---
    /// 从开始到 OCR 阶段
    pub ocr_stage_delay_ms: u64,
    /// 从开始到提取阶段
    pub extract_stage_delay_ms: u64,
    /// 收到响应后到完成
    pub fill_stage_delay_ms: u64,
    /// 结束后到解除 analyzing 标记
    pub settle_delay_ms: u64,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:8000".to_string(),
            request_timeout_secs: None,
            upload_tick_ms: 200,
            upload_step: 10,
            upload_cap: 90,
            ocr_stage_delay_ms: 500,
            extract_stage_delay_ms: 2000,
            fill_stage_delay_ms: 1000,
            settle_delay_ms: 1000,
            verbose_logging: false,
            output_log_file: "intake_log.txt".to_string(),
        }
    }
}

/// TOML 配置文件中的可选字段
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    api_base_url: Option<String>,
    request_timeout_secs: Option<u64>,
    upload_tick_ms: Option<u64>,
    upload_step: Option<u8>,
    upload_cap: Option<u8>,
    ocr_stage_delay_ms: Option<u64>,
    extract_stage_delay_ms: Option<u64>,
    fill_stage_delay_ms: Option<u64>,
    settle_delay_ms: Option<u64>,
    verbose_logging: Option<bool>,
    output_log_file: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        Self::default().with_env()
    }

    /// 从 TOML 文件加载，缺失的字段使用默认值
    pub fn load(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|err| match err {
            AppError::Config(ConfigError::TomlParseFailed { source, .. }) => {
                ConfigError::TomlParseFailed {
                    path: path.display().to_string(),
                    source,
                }
                .into()
            }
            other => other,
        })
    }

    /// 从 TOML 文本解析
    pub fn from_toml_str(content: &str) -> AppResult<Self> {
        let file: ConfigFile =
            toml::from_str(content).map_err(|source| ConfigError::TomlParseFailed {
                path: String::new(),
                source,
            })?;
        let default = Self::default();
        Ok(Self {
            api_base_url: file.api_base_url.unwrap_or(default.api_base_url),
            request_timeout_secs: file.request_timeout_secs.or(default.request_timeout_secs),
            upload_tick_ms: file.upload_tick_ms.unwrap_or(default.upload_tick_ms),
            upload_step: file.upload_step.unwrap_or(default.upload_step),
            upload_cap: file.upload_cap.unwrap_or(default.upload_cap),
            ocr_stage_delay_ms: file.ocr_stage_delay_ms.unwrap_or(default.ocr_stage_delay_ms),
            extract_stage_delay_ms: file.extract_stage_delay_ms.unwrap_or(default.extract_stage_delay_ms),
            fill_stage_delay_ms: file.fill_stage_delay_ms.unwrap_or(default.fill_stage_delay_ms),
            settle_delay_ms: file.settle_delay_ms.unwrap_or(default.settle_delay_ms),
            verbose_logging: file.verbose_logging.unwrap_or(default.verbose_logging),
            output_log_file: file.output_log_file.unwrap_or(default.output_log_file),
        })
    }

    /// 用环境变量覆盖已有配置
    pub fn with_env(self) -> Self {
        Self {
            api_base_url: std::env::var("INTAKE_API_BASE_URL").unwrap_or(self.api_base_url),
            request_timeout_secs: std::env::var("INTAKE_REQUEST_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).or(self.request_timeout_secs),
            upload_tick_ms: std::env::var("INTAKE_UPLOAD_TICK_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(self.upload_tick_ms),
            upload_step: std::env::var("INTAKE_UPLOAD_STEP").ok().and_then(|v| v.parse().ok()).unwrap_or(self.upload_step),
            upload_cap: std::env::var("INTAKE_UPLOAD_CAP").ok().and_then(|v| v.parse().ok()).unwrap_or(self.upload_cap),
            ocr_stage_delay_ms: std::env::var("INTAKE_OCR_STAGE_DELAY_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(self.ocr_stage_delay_ms),
            extract_stage_delay_ms: std::env::var("INTAKE_EXTRACT_STAGE_DELAY_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(self.extract_stage_delay_ms),
            fill_stage_delay_ms: std::env::var("INTAKE_FILL_STAGE_DELAY_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(self.fill_stage_delay_ms),
            settle_delay_ms: std::env::var("INTAKE_SETTLE_DELAY_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(self.settle_delay_ms),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(self.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(self.output_log_file),
        }
    }

    /// 检查配置之间的约束
    pub fn validate(&self) -> AppResult<()> {
        if self.api_base_url.trim().is_empty() {
            return Err(AppError::invalid_config("api_base_url", "不能为空"));
        }
        if self.upload_tick_ms == 0 {
            return Err(AppError::invalid_config("upload_tick_ms", "必须大于 0"));
        }
        if self.upload_step == 0 {
            return Err(AppError::invalid_config("upload_step", "必须大于 0"));
        }
        if self.upload_cap > 100 {
            return Err(AppError::invalid_config(
                "upload_cap",
                format!("{} 超过 100", self.upload_cap),
            ));
        }
        if self.extract_stage_delay_ms < self.ocr_stage_delay_ms {
            return Err(AppError::invalid_config(
                "extract_stage_delay_ms",
                "不能早于 ocr_stage_delay_ms",
            ));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn upload_tick(&self) -> Duration {
        Duration::from_millis(self.upload_tick_ms)
    }

    pub fn ocr_stage_delay(&self) -> Duration {
        Duration::from_millis(self.ocr_stage_delay_ms)
    }

    pub fn extract_stage_delay(&self) -> Duration {
        Duration::from_millis(self.extract_stage_delay_ms)
    }

    pub fn fill_stage_delay(&self) -> Duration {
        Duration::from_millis(self.fill_stage_delay_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}
