//! 分析编排器 - 编排层
//!
//! ## 职责
//!
//! 发起一次 `/analyze/all` 调用，同时按固定时间表推进模拟的阶段进度。
//!
//! ## 时间表
//!
//! - 开始：Initializing(10%)
//! - 开始后 500ms：Ocr(30%)
//! - 开始后 2000ms：Extracting(60%)
//! - 收到响应：Filling(90%)
//! - 响应后 1000ms：Complete(100%)，发布结果
//! - 响应失败：Failed(0%)
//! - 结束后 1000ms：清除 analyzing 标记
//!
//! 所有计时器和网络响应都在同一个 `select!` 循环里处理，响应优先。
//! 响应早于 500ms / 2000ms 到达时，对应的模拟阶段被跳过，而不是在真实工作
//! 完成之后才出现。

use crate::clients::IntakeApi;
use crate::config::Config;
use crate::error::{AnalysisError, AppError, AppResult, ValidationError};
use crate::models::AnalysisResult;
use crate::orchestrator::busy::BusyGuard;
use crate::services::DocumentRegistry;
use crate::workflow::{Stage, StageEvent, StageMachine, StageTransition};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, error, info, warn};

const EVENT_CAPACITY: usize = 32;

/// 分析状态快照，供界面绑定
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnalysisSnapshot {
    pub stage: Stage,
    pub progress: u8,
    /// 阶段文本，失败或空闲时为空
    pub message: String,
    pub analyzing: bool,
    /// 最近一次成功的结果；新的分析开始时清空
    pub result: Option<Arc<AnalysisResult>>,
    /// 最近一次失败的消息
    pub error: Option<String>,
}

/// 分析编排器
pub struct AnalysisOrchestrator {
    api: Arc<dyn IntakeApi>,
    state: watch::Sender<AnalysisSnapshot>,
    events: broadcast::Sender<StageTransition>,
    busy: AtomicBool,
    ocr_delay: Duration,
    extract_delay: Duration,
    fill_delay: Duration,
    settle_delay: Duration,
}

impl AnalysisOrchestrator {
    pub fn new(api: Arc<dyn IntakeApi>, config: &Config) -> Self {
        let (state, _) = watch::channel(AnalysisSnapshot::default());
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            api,
            state,
            events,
            busy: AtomicBool::new(false),
            ocr_delay: config.ocr_stage_delay(),
            extract_delay: config.extract_stage_delay(),
            fill_delay: config.fill_stage_delay(),
            settle_delay: config.settle_delay(),
        }
    }

    pub fn snapshot(&self) -> AnalysisSnapshot {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AnalysisSnapshot> {
        self.state.subscribe()
    }

    /// 订阅每一次阶段变化
    pub fn subscribe_events(&self) -> broadcast::Receiver<StageTransition> {
        self.events.subscribe()
    }

    pub fn is_analyzing(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// 分析按钮是否可用
    pub fn can_analyze(&self, registry: &DocumentRegistry) -> bool {
        !self.is_analyzing() && !registry.is_empty()
    }

    /// 分析服务端已有的全部文档
    ///
    /// # 返回
    /// - `Ok(Some(_))`：分析完成
    /// - `Ok(None)`：已有分析在进行，本次调用被忽略，状态不变
    /// - `Err(_)`：没有已登记文档，或分析失败
    pub async fn analyze(
        &self,
        registry: &DocumentRegistry,
    ) -> AppResult<Option<Arc<AnalysisResult>>> {
        let Some(guard) = BusyGuard::acquire(&self.busy) else {
            debug!("已有分析在进行中，忽略本次请求");
            return Ok(None);
        };

        if registry.is_empty() {
            return Err(ValidationError::NoDocuments.into());
        }

        info!("🔬 开始分析 {} 个已登记文档", registry.count());
        self.state.send_modify(|s| {
            s.analyzing = true;
            s.result = None;
            s.error = None;
        });

        let mut machine = StageMachine::new();
        let started = Instant::now();
        self.advance(&mut machine, StageEvent::Start, None);

        let request = self.api.analyze_all();
        tokio::pin!(request);

        let mut settled_at: Option<Instant> = None;
        let mut outcome: Option<Result<Arc<AnalysisResult>, AnalysisError>> = None;

        while !machine.stage().is_terminal() {
            let timer = machine.pending_timer();
            let deadline = match timer {
                Some(StageEvent::OcrTimerFired) => started + self.ocr_delay,
                Some(StageEvent::ExtractTimerFired) => started + self.extract_delay,
                Some(StageEvent::FillTimerFired) => {
                    settled_at.unwrap_or_else(Instant::now) + self.fill_delay
                }
                _ => Instant::now(),
            };

            tokio::select! {
                biased;
                response = &mut request, if settled_at.is_none() => {
                    settled_at = Some(Instant::now());
                    debug!("分析响应到达，耗时 {:?}", started.elapsed());
                    match response {
                        Ok(result) => {
                            self.advance(&mut machine, StageEvent::ResponseReceived, None);
                            outcome = Some(Ok(Arc::new(result)));
                        }
                        Err(e) => {
                            self.fail(&mut machine, &e);
                            outcome = Some(Err(e));
                        }
                    }
                }
                _ = sleep_until(deadline), if timer.is_some() => {
                    if let Some(event) = timer {
                        let result = match (&outcome, event) {
                            (Some(Ok(result)), StageEvent::FillTimerFired) => Some(result.clone()),
                            _ => None,
                        };
                        self.advance(&mut machine, event, result);
                    }
                }
                else => break,
            }
        }

        // 结束后保留一段时间，让最终阶段可见，再恢复按钮
        if let Some(at) = settled_at {
            sleep_until(at + self.settle_delay).await;
        }
        self.state.send_modify(|s| s.analyzing = false);
        drop(guard);

        match outcome {
            Some(Ok(result)) => {
                info!(
                    "✅ 分析完成: 处理 {} 个文件",
                    result.num_files_processed
                );
                Ok(Some(result))
            }
            Some(Err(e)) => Err(AppError::Analysis(e)),
            None => {
                warn!("⚠️ 分析在收到响应前结束");
                Err(AppError::Analysis(AnalysisError::Malformed {
                    reason: "analysis ended without a response".to_string(),
                }))
            }
        }
    }

    /// 应用事件并发布快照；进入 Complete 时同时发布结果
    fn advance(
        &self,
        machine: &mut StageMachine,
        event: StageEvent,
        result: Option<Arc<AnalysisResult>>,
    ) {
        let Some(transition) = machine.apply(event) else {
            debug!("忽略过期事件 {:?}（当前阶段 {}）", event, machine.stage());
            return;
        };

        debug!("阶段变化: {} -> {}", transition.from, transition.to);
        self.state.send_modify(|s| {
            s.stage = transition.to;
            s.progress = transition.to.progress();
            s.message = transition.to.message().to_string();
            if transition.to == Stage::Complete {
                s.result = result;
            }
        });
        let _ = self.events.send(transition);
    }

    fn fail(&self, machine: &mut StageMachine, err: &AnalysisError) {
        error!("❌ 分析失败: {}", err);
        let message = err.message();
        self.state.send_modify(|s| s.error = Some(message));
        self.advance(machine, StageEvent::ResponseFailed, None);
    }
}
