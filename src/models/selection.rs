//! 待上传文件的选择
//!
//! 只接受 PDF，其他类型在提交前就被过滤掉。

use crate::error::{AppError, AppResult};
use std::path::Path;
use std::sync::Arc;

/// 唯一接受的 MIME 类型
pub const ACCEPTED_MIME: &str = "application/pdf";
const ACCEPTED_EXTENSION: &str = "pdf";

/// 一个待上传的文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfFile {
    pub name: String,
    pub size: u64,
    /// 文件内容，多个批次之间共享
    pub bytes: Arc<Vec<u8>>,
}

impl PdfFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            size: bytes.len() as u64,
            bytes: Arc::new(bytes),
        }
    }

    /// 从磁盘读取文件
    pub async fn from_path(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(name, bytes))
    }

    /// 按扩展名判断是否为 PDF（不区分大小写）
    pub fn is_accepted(&self) -> bool {
        is_accepted_name(&self.name)
    }

    /// 选择列表中显示的大小，如 `12.5 KB`
    pub fn display_size(&self) -> String {
        format!("{:.1} KB", self.size as f64 / 1024.0)
    }
}

pub fn is_accepted_name(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(ACCEPTED_EXTENSION))
        .unwrap_or(false)
}

/// 一次选择的结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionOutcome {
    pub accepted: usize,
    /// 被过滤掉的文件名
    pub rejected: Vec<String>,
}

/// 当前选择的文件列表
#[derive(Debug, Clone, Default)]
pub struct FileSelection {
    files: Vec<PdfFile>,
}

impl FileSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// 用新的候选文件替换当前选择，非 PDF 被排除
    pub fn select(&mut self, candidates: Vec<PdfFile>) -> SelectionOutcome {
        let (accepted, rejected): (Vec<_>, Vec<_>) =
            candidates.into_iter().partition(PdfFile::is_accepted);

        self.files = accepted;
        SelectionOutcome {
            accepted: self.files.len(),
            rejected: rejected.into_iter().map(|f| f.name).collect(),
        }
    }

    /// 移除第 `index` 个文件
    pub fn remove(&mut self, index: usize) -> Option<PdfFile> {
        (index < self.files.len()).then(|| self.files.remove(index))
    }

    pub fn clear(&mut self) {
        self.files.clear();
    }

    pub fn files(&self) -> &[PdfFile] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
