use thiserror::Error;

/// 应用程序错误类型
///
/// 三类业务错误（校验 / 上传 / 分析）都在编排层边界被捕获，
/// 原样交给调用方展示，不做自动重试。
#[derive(Debug, Error)]
pub enum AppError {
    /// 提交前的校验错误
    #[error("{0}")]
    Validation(#[from] ValidationError),
    /// 上传事务错误
    #[error("Upload failed: {0}")]
    Upload(#[from] UploadError),
    /// 分析调用错误
    #[error("Analysis failed: {0}")]
    Analysis(#[from] AnalysisError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
}

/// 校验错误，发生在任何网络请求之前
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// 没有选择任何文件
    #[error("Please select a file first")]
    NoFilesSelected,
    /// 选择的文件全部不是 PDF
    #[error("No accepted files in selection (only PDF is supported): {}", rejected.join(", "))]
    NoAcceptedFiles { rejected: Vec<String> },
    /// 文档列表为空时不能发起分析
    #[error("Upload at least one document before analyzing")]
    NoDocuments,
    /// 上一批还没有结束
    #[error("An upload is already in progress")]
    UploadInProgress,
}

/// `/upload/` 调用错误
#[derive(Debug, Error)]
pub enum UploadError {
    /// 网络层失败
    #[error("{source}")]
    Transport {
        #[source]
        source: reqwest::Error,
    },
    /// 服务端返回非 2xx
    #[error("{message}")]
    Rejected { status: u16, message: String },
}

impl UploadError {
    /// 面向用户的错误消息
    pub fn message(&self) -> String {
        match self {
            UploadError::Transport { source } => source.to_string(),
            UploadError::Rejected { message, .. } => message.clone(),
        }
    }
}

/// `/analyze/all` 调用错误
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// 网络层失败
    #[error("{source}")]
    Transport {
        #[source]
        source: reqwest::Error,
    },
    /// 服务端返回非 2xx，`message` 为 `detail` 或通用提示
    #[error("{message}")]
    Rejected { status: u16, message: String },
    /// 2xx 但响应体不是合法的分析结果
    #[error("malformed analysis payload: {reason}")]
    Malformed { reason: String },
}

impl AnalysisError {
    /// 面向用户的错误消息
    pub fn message(&self) -> String {
        match self {
            AnalysisError::Transport { source } => source.to_string(),
            AnalysisError::Rejected { message, .. } => message.clone(),
            AnalysisError::Malformed { .. } => self.to_string(),
        }
    }
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 配置文件读取失败
    #[error("无法读取配置文件 {path}: {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("无法解析配置文件 {path}: {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// 配置值不合法
    #[error("配置项 {field} 不合法: {reason}")]
    Invalid { field: &'static str, reason: String },
    /// HTTP 客户端构建失败
    #[error("无法创建 HTTP 客户端: {0}")]
    HttpClient(#[source] reqwest::Error),
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建文件读取错误
    pub fn file_read_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source,
        })
    }

    /// 创建文件写入错误
    pub fn file_write_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source,
        })
    }

    /// 创建配置值不合法错误
    pub fn invalid_config(field: &'static str, reason: impl Into<String>) -> Self {
        AppError::Config(ConfigError::Invalid {
            field,
            reason: reason.into(),
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
