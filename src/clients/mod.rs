pub mod intake_client;

pub use intake_client::{IntakeApi, IntakeClient, UploadReceipt};
