pub mod analysis_stage;
pub mod upload_progress;

pub use analysis_stage::{Stage, StageEvent, StageMachine, StageTransition};
pub use upload_progress::UploadProgress;
