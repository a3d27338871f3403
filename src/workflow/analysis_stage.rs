//! 分析进度状态机 - 流程层
//!
//! 核心职责：定义"一次分析"的阶段流转
//!
//! ```text
//! Idle --Start--> Initializing(10%)
//! Initializing --OCR 计时器--> Ocr(30%)
//! Ocr / Initializing --提取计时器--> Extracting(60%)
//! Initializing / Ocr / Extracting --收到响应--> Filling(90%)
//! Filling --填表计时器--> Complete(100%)
//! 任意运行中阶段 --响应失败--> Failed(0%)
//! ```
//!
//! 中间阶段是模拟出来的：响应一旦到达，尚未触发的 OCR / 提取计时器
//! 全部作废（`apply` 返回 `None`），进度不会在真实工作结束后倒退或跳回中间阶段。

use std::fmt;

/// 分析阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Stage {
    #[default]
    Idle,
    Initializing,
    Ocr,
    Extracting,
    Filling,
    Complete,
    Failed,
}

impl Stage {
    /// 该阶段对应的进度百分比
    pub fn progress(self) -> u8 {
        match self {
            Stage::Idle | Stage::Failed => 0,
            Stage::Initializing => 10,
            Stage::Ocr => 30,
            Stage::Extracting => 60,
            Stage::Filling => 90,
            Stage::Complete => 100,
        }
    }

    /// 界面上显示的阶段文本
    pub fn message(self) -> &'static str {
        match self {
            Stage::Idle | Stage::Failed => "",
            Stage::Initializing => "Initializing...",
            Stage::Ocr => "Performing OCR on documents...",
            Stage::Extracting => "Extracting medical information...",
            Stage::Filling => "Auto-filling EMR form...",
            Stage::Complete => "Complete!",
        }
    }

    /// 是否还在等待响应
    pub fn awaiting_response(self) -> bool {
        matches!(self, Stage::Initializing | Stage::Ocr | Stage::Extracting)
    }

    pub fn is_running(self) -> bool {
        self.awaiting_response() || self == Stage::Filling
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Complete | Stage::Failed)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Idle => "Idle",
            Stage::Initializing => "Initializing",
            Stage::Ocr => "OCR",
            Stage::Extracting => "Extracting",
            Stage::Filling => "Filling",
            Stage::Complete => "Complete",
            Stage::Failed => "Failed",
        };
        write!(f, "{}({}%)", name, self.progress())
    }
}

/// 驱动状态机的事件
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageEvent {
    Start,
    OcrTimerFired,
    ExtractTimerFired,
    ResponseReceived,
    ResponseFailed,
    FillTimerFired,
}

/// 一次被接受的阶段变化
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageTransition {
    pub from: Stage,
    pub to: Stage,
    pub event: StageEvent,
}

/// 分析阶段状态机
///
/// 纯状态，不持有计时器；由编排层把计时器和网络响应翻译成事件。
#[derive(Debug, Clone, Default)]
pub struct StageMachine {
    stage: Stage,
}

impl StageMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// 应用事件；事件在当前阶段无效（例如响应到达后才触发的计时器）时返回 `None`
    pub fn apply(&mut self, event: StageEvent) -> Option<StageTransition> {
        let from = self.stage;
        let to = match (from, event) {
            (Stage::Idle | Stage::Complete | Stage::Failed, StageEvent::Start) => {
                Stage::Initializing
            }
            (Stage::Initializing, StageEvent::OcrTimerFired) => Stage::Ocr,
            (Stage::Initializing | Stage::Ocr, StageEvent::ExtractTimerFired) => Stage::Extracting,
            (s, StageEvent::ResponseReceived) if s.awaiting_response() => Stage::Filling,
            (s, StageEvent::ResponseFailed) if s.is_running() => Stage::Failed,
            (Stage::Filling, StageEvent::FillTimerFired) => Stage::Complete,
            _ => return None,
        };
        self.stage = to;
        Some(StageTransition { from, to, event })
    }

    /// 当前阶段在等待的下一个计时器
    pub fn pending_timer(&self) -> Option<StageEvent> {
        match self.stage {
            Stage::Initializing => Some(StageEvent::OcrTimerFired),
            Stage::Ocr => Some(StageEvent::ExtractTimerFired),
            Stage::Filling => Some(StageEvent::FillTimerFired),
            _ => None,
        }
    }
}
