//! 上传编排器 - 编排层
//!
//! ## 职责
//!
//! 1. **选择文件**：只保留 PDF，非 PDF 在提交前被排除
//! 2. **批量上传**：整批文件作为一个 multipart 请求发出
//! 3. **进度模拟**：请求进行中按固定间隔推进进度，响应后置 100，保持一个计时周期后归零
//! 4. **登记文档**：成功后每个文件登记一次，并清空选择
//!
//! 批量是原子的：服务端拒绝时不登记任何文件，选择保留以便重试。

use crate::clients::{IntakeApi, UploadReceipt};
use crate::config::Config;
use crate::error::{AppError, AppResult, ValidationError};
use crate::models::{FileSelection, PdfFile, SelectionOutcome, UploadedDocument};
use crate::orchestrator::busy::BusyGuard;
use crate::services::DocumentRegistry;
use crate::utils::logging;
use crate::workflow::UploadProgress;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{interval_at, sleep, Instant};
use tracing::{error, info, warn};

/// 一次成功上传的结果
#[derive(Debug, Clone)]
pub struct UploadOutcome {
    pub receipt: UploadReceipt,
    /// 本批登记的文档，顺序与选择一致
    pub documents: Vec<UploadedDocument>,
}

impl UploadOutcome {
    /// 给用户的提示文本
    pub fn notice(&self) -> &str {
        self.receipt.message.as_deref().unwrap_or("Upload successful!")
    }
}

/// 上传编排器
pub struct UploadOrchestrator {
    api: Arc<dyn IntakeApi>,
    registry: Arc<DocumentRegistry>,
    selection: watch::Sender<FileSelection>,
    progress: watch::Sender<u8>,
    busy: AtomicBool,
    batches: AtomicUsize,
    tick: Duration,
    step: u8,
    cap: u8,
}

impl UploadOrchestrator {
    pub fn new(api: Arc<dyn IntakeApi>, registry: Arc<DocumentRegistry>, config: &Config) -> Self {
        let (selection, _) = watch::channel(FileSelection::new());
        let (progress, _) = watch::channel(0);
        Self {
            api,
            registry,
            selection,
            progress,
            busy: AtomicBool::new(false),
            batches: AtomicUsize::new(0),
            tick: config.upload_tick(),
            step: config.upload_step,
            cap: config.upload_cap,
        }
    }

    /// 替换当前选择；上传进行中时忽略并返回 `None`
    pub fn select(&self, candidates: Vec<PdfFile>) -> Option<SelectionOutcome> {
        if self.is_uploading() {
            warn!("⚠️ 上传进行中，忽略文件选择");
            return None;
        }

        let mut outcome = SelectionOutcome::default();
        self.selection.send_modify(|selection| outcome = selection.select(candidates));

        for name in &outcome.rejected {
            warn!("⚠️ 已排除非 PDF 文件: {}", name);
        }
        Some(outcome)
    }

    /// 从选择中移除一个文件；上传进行中时不允许
    pub fn remove(&self, index: usize) -> Option<PdfFile> {
        if self.is_uploading() {
            return None;
        }
        let mut removed = None;
        self.selection.send_modify(|selection| removed = selection.remove(index));
        removed
    }

    pub fn selection(&self) -> Vec<PdfFile> {
        self.selection.borrow().files().to_vec()
    }

    pub fn registry(&self) -> &Arc<DocumentRegistry> {
        &self.registry
    }

    /// 当前模拟进度
    pub fn progress(&self) -> u8 {
        *self.progress.borrow()
    }

    pub fn subscribe_progress(&self) -> watch::Receiver<u8> {
        self.progress.subscribe()
    }

    pub fn is_uploading(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// 上传按钮是否可用
    pub fn can_upload(&self) -> bool {
        !self.is_uploading() && !self.selection.borrow().is_empty()
    }

    /// 上传当前选择
    ///
    /// # 返回
    /// - `Ok(Some(_))`：上传成功，文档已登记
    /// - `Ok(None)`：已有上传在进行，本次调用被忽略
    /// - `Err(_)`：校验失败或上传失败，选择保留
    pub async fn upload(&self) -> AppResult<Option<UploadOutcome>> {
        let Some(_guard) = BusyGuard::acquire(&self.busy) else {
            warn!("⚠️ 已有上传在进行中，忽略本次请求");
            return Ok(None);
        };

        let files = self.selection();
        if files.is_empty() {
            return Err(ValidationError::NoFilesSelected.into());
        }

        let batch_num = self.batches.fetch_add(1, Ordering::Relaxed) + 1;
        logging::log_batch_start(batch_num, files.len());
        info!(
            "📤 开始上传: {}",
            files.iter().map(|f| f.name.as_str()).collect::<Vec<_>>().join(", ")
        );

        let mut progress = UploadProgress::new(self.step, self.cap);
        self.progress.send_replace(progress.reset());

        let request = self.api.upload(&files);
        tokio::pin!(request);
        let mut ticker = interval_at(Instant::now() + self.tick, self.tick);

        let result = loop {
            tokio::select! {
                biased;
                result = &mut request => break result,
                _ = ticker.tick() => {
                    self.progress.send_replace(progress.tick());
                }
            }
        };

        // 无论成功失败，先到 100 并保持一个周期，再归零
        self.progress.send_replace(progress.settle());
        sleep(self.tick).await;

        match result {
            Ok(receipt) => {
                let documents: Vec<UploadedDocument> = files
                    .iter()
                    .map(|file| self.registry.register(&file.name, file.size))
                    .collect();

                self.selection.send_modify(FileSelection::clear);
                self.progress.send_replace(progress.reset());

                logging::log_batch_complete(batch_num, documents.len(), self.registry.count());
                let outcome = UploadOutcome { receipt, documents };
                info!("✓ {}", outcome.notice());
                Ok(Some(outcome))
            }
            Err(e) => {
                self.progress.send_replace(progress.reset());
                error!("❌ 第 {} 批上传失败: {}", batch_num, e);
                Err(AppError::Upload(e))
            }
        }
    }
}
