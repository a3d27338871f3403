//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责事务级的流程调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `upload` - 上传编排器
//! - 维护待上传的文件选择（只接受 PDF）
//! - 把整批文件作为一个请求发出
//! - 模拟上传进度（与真实传输无关）
//! - 成功后向 `DocumentRegistry` 登记每个文件
//!
//! ### `analysis` - 分析编排器
//! - 驱动阶段状态机（Initializing → OCR → Extracting → Filling → Complete）
//! - 与唯一一次远程分析调用并行推进
//! - 发布最终结果或错误
//!
//! ## 层次关系
//!
//! ```text
//! orchestrator (一次上传 / 一次分析)
//!     ↓
//! workflow (StageMachine / UploadProgress，纯状态)
//!     ↓
//! services (DocumentRegistry / ResultView)
//!     ↓
//! clients (IntakeApi：/upload/ 与 /analyze/all)
//! ```
//!
//! ## 设计原则
//!
//! 1. **单一事务**：每个编排器同一时间只有一个事务，第二次调用被忽略
//! 2. **单一写入者**：只有上传编排器的成功路径写入登记表
//! 3. **错误上抛**：所有错误在本层边界返回给调用方，不重试

mod busy;

pub mod analysis;
pub mod upload;

// 重新导出主要类型
pub use analysis::{AnalysisOrchestrator, AnalysisSnapshot};
pub use upload::{UploadOrchestrator, UploadOutcome};
