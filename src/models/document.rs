//! 已上传文档

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 文档状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    Processing,
    Completed,
    Failed,
}

impl DocumentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            DocumentStatus::Processing => "processing",
            DocumentStatus::Completed => "completed",
            DocumentStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 文档列表中的一条记录
///
/// 创建后不再修改；状态在登记时就已确定。
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedDocument {
    /// 登记时生成的时间戳 ID（毫秒），会话内唯一
    pub id: String,
    /// 原始文件名
    pub name: String,
    /// 登记时间
    pub uploaded_at: DateTime<Local>,
    /// 原始字节数
    pub size_bytes: u64,
    /// 格式化后的大小，如 `2.0 MB`
    pub size: String,
    pub status: DocumentStatus,
}

impl UploadedDocument {
    /// 侧边栏显示的时间，如 `Oct 19, 09:05 AM`
    pub fn display_time(&self) -> String {
        self.uploaded_at.format("%b %-d, %I:%M %p").to_string()
    }
}

impl fmt::Display for UploadedDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] {} · {}",
            self.name,
            self.status,
            self.size,
            self.display_time()
        )
    }
}

const KIB: u64 = 1024;
const MIB: u64 = 1024 * 1024;

/// 把字节数格式化为 B / KB / MB
///
/// KB 和 MB 保留一位小数。
pub fn format_file_size(bytes: u64) -> String {
    if bytes < KIB {
        format!("{} B", bytes)
    } else if bytes < MIB {
        format!("{:.1} KB", bytes as f64 / KIB as f64)
    } else {
        format!("{:.1} MB", bytes as f64 / MIB as f64)
    }
}
