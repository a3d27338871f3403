//! # EMR Intake
//!
//! 把一批医疗文档上传到远程分析服务，并以分阶段的进度观察服务端提取结构化信息
//!
//! ## 架构设计
//!
//! ### ① 客户端层（Clients）
//! - `clients/` - 远程服务的能力边界
//! - `IntakeApi` - `/upload/` 与 `/analyze/all`，测试中可替换
//! - `IntakeClient` - 基于 reqwest 的实现
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，不关心流程
//! - `DocumentRegistry` - 内存中的文档登记表（新的在前）
//! - `ResultView` - 把宽松的分析结果投影成展示模型
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 纯状态，不持有计时器或网络
//! - `StageMachine` - 分析阶段状态机
//! - `UploadProgress` - 上传进度模拟
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/upload` - 校验选择、发起批量上传、登记文档
//! - `orchestrator/analysis` - 计时器与远程调用并行推进，发布结果或错误
//!
//! ## 模块结构
//!
//! - `app` - 一次会话：上传 → 侧边栏 → 分析 → 展示
//! - `config` / `error` / `logger` / `utils` - 配置、错误类型与日志
//! - `models` - 上传文件、已登记文档、分析结果

pub mod app;
pub mod clients;
pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use app::App;
pub use clients::{IntakeApi, IntakeClient, UploadReceipt};
pub use config::Config;
pub use error::{AnalysisError, AppError, AppResult, UploadError, ValidationError};
pub use models::{AnalysisResult, DocumentStatus, PdfFile, UploadedDocument};
pub use orchestrator::{AnalysisOrchestrator, AnalysisSnapshot, UploadOrchestrator, UploadOutcome};
pub use services::{DocumentRegistry, Field, ResultView};
pub use workflow::{Stage, StageMachine};
