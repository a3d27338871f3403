use crate::clients::{IntakeApi, IntakeClient};
use crate::config::Config;
use crate::error::{AppError, AppResult, ValidationError};
use crate::models::PdfFile;
use crate::orchestrator::{AnalysisOrchestrator, UploadOrchestrator, UploadOutcome};
use crate::services::{DocumentRegistry, ResultView};
use crate::utils::logging::{self, truncate_text};
use anyhow::{Context, Result};
use futures::future::try_join_all;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

/// 应用主结构
///
/// 一个会话：一个登记表、一个上传编排器、一个分析编排器
pub struct App {
    config: Config,
    registry: Arc<DocumentRegistry>,
    uploader: UploadOrchestrator,
    analyzer: AnalysisOrchestrator,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        config.validate().context("配置检查失败")?;

        // 初始化日志文件
        logging::init_log_file(&config.output_log_file)?;
        logging::log_startup(&config.api_base_url, config.request_timeout_secs);

        let api: Arc<dyn IntakeApi> = Arc::new(IntakeClient::new(&config)?);
        Ok(Self::with_api(config, api))
    }

    /// 使用指定的 API 实现创建应用
    pub fn with_api(config: Config, api: Arc<dyn IntakeApi>) -> Self {
        let registry = Arc::new(DocumentRegistry::new());
        let uploader = UploadOrchestrator::new(api.clone(), registry.clone(), &config);
        let analyzer = AnalysisOrchestrator::new(api, &config);
        Self {
            config,
            registry,
            uploader,
            analyzer,
        }
    }

    pub fn registry(&self) -> &DocumentRegistry {
        &self.registry
    }

    /// 运行应用主逻辑：上传 → 分析 → 展示
    pub async fn run(&self, paths: &[PathBuf]) -> Result<()> {
        if paths.is_empty() {
            warn!("⚠️ 没有指定要上传的文件，程序结束");
            return Ok(());
        }

        let files = load_files(paths).await?;

        if let Err(e) = self.upload_batch(files).await {
            self.notify(&e);
            return Err(e.into());
        }
        self.print_sidebar();

        let outcome = self.analyze().await;
        let files_processed = outcome
            .as_ref()
            .ok()
            .and_then(|view| view.as_ref().map(|v| v.files_processed));
        logging::print_final_stats(
            self.registry.count(),
            files_processed,
            &self.config.output_log_file,
        );

        match outcome {
            Ok(Some(view)) => {
                println!("\n{}", view.render());
                Ok(())
            }
            Ok(None) => Ok(()),
            Err(e) => {
                self.notify(&e);
                Err(e.into())
            }
        }
    }

    /// 选择并上传一批文件，打印模拟进度
    pub async fn upload_batch(&self, files: Vec<PdfFile>) -> AppResult<UploadOutcome> {
        if let Some(selection) = self.uploader.select(files) {
            if selection.accepted == 0 && !selection.rejected.is_empty() {
                return Err(ValidationError::NoAcceptedFiles {
                    rejected: selection.rejected,
                }
                .into());
            }
        }

        let mut progress = self.uploader.subscribe_progress();
        let upload = self.uploader.upload();
        tokio::pin!(upload);

        let outcome = loop {
            tokio::select! {
                result = &mut upload => break result,
                Ok(()) = progress.changed() => {
                    let value = *progress.borrow_and_update();
                    if value > 0 {
                        info!("⏳ Uploading... {}%", value);
                    }
                }
            }
        }?;

        let outcome = outcome.ok_or(ValidationError::UploadInProgress)?;

        for doc in &outcome.documents {
            self.log_to_file(&format!("registered {} ({}) id={}", doc.name, doc.size, doc.id));
        }
        println!("{}", outcome.notice());
        Ok(outcome)
    }

    /// 发起分析并打印阶段进度
    pub async fn analyze(&self) -> AppResult<Option<ResultView>> {
        let mut events = self.analyzer.subscribe_events();
        let analysis = self.analyzer.analyze(&self.registry);
        tokio::pin!(analysis);

        let result = loop {
            tokio::select! {
                result = &mut analysis => break result,
                Ok(transition) = events.recv() => {
                    let stage = transition.to;
                    if !stage.message().is_empty() {
                        info!("⏳ {} {}% complete", stage.message(), stage.progress());
                    }
                }
            }
        }?;

        Ok(result.map(|result| {
            let view = ResultView::from_result(&result);
            if let Some(notes) = view.additional_notes.as_deref() {
                info!("📝 备注: {}", truncate_text(notes, 60));
            }
            self.log_to_file(&format!(
                "analysis complete: {} file(s) processed",
                view.files_processed
            ));
            view
        }))
    }

    /// 打印侧边栏：计数徽标 + 文档列表
    fn print_sidebar(&self) {
        let documents = self.registry.list();
        println!("\nRecent Uploads ({})", documents.len());
        if documents.is_empty() {
            println!("  No documents uploaded yet");
        }
        for doc in documents {
            println!("  {}", doc);
        }
    }

    /// 阻塞式提示：把错误直接展示给用户
    fn notify(&self, err: &AppError) {
        error!("{}", err);
        eprintln!("{}", err);
        self.log_to_file(&err.to_string());
    }

    fn log_to_file(&self, line: &str) {
        if let Err(e) = logging::append_log_line(&self.config.output_log_file, line) {
            warn!("写入日志文件失败: {}", e);
        }
    }
}

/// 从磁盘并发读取待上传文件，顺序与参数一致
async fn load_files(paths: &[PathBuf]) -> Result<Vec<PdfFile>> {
    info!("\n📁 正在读取 {} 个文件...", paths.len());
    let files = try_join_all(paths.iter().map(|path| async move {
        PdfFile::from_path(path)
            .await
            .with_context(|| format!("无法读取文件: {}", path.display()))
    }))
    .await?;

    for file in &files {
        info!("  {} ({})", file.name, file.display_size());
    }
    Ok(files)
}
