#![allow(dead_code)]

use async_trait::async_trait;
use emr_intake::{AnalysisError, AnalysisResult, Config, IntakeApi, PdfFile, UploadError, UploadReceipt};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// 上传调用的预设响应
#[derive(Debug, Clone)]
pub enum UploadReply {
    Accept(Option<String>),
    Reject { status: u16, message: String },
}

/// 分析调用的预设响应
#[derive(Debug, Clone)]
pub enum AnalyzeReply {
    Payload(Value),
    Reject { status: u16, message: String },
}

/// 进程内的假分析服务，按预设延迟返回预设响应
pub struct FakeApi {
    upload_delay: Duration,
    upload_reply: Mutex<UploadReply>,
    analyze_delay: Mutex<Duration>,
    analyze_reply: Mutex<AnalyzeReply>,
    upload_calls: AtomicUsize,
    analyze_calls: AtomicUsize,
    uploaded: Mutex<Vec<Vec<String>>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self {
            upload_delay: Duration::from_millis(100),
            upload_reply: Mutex::new(UploadReply::Accept(Some(
                "Files uploaded successfully".to_string(),
            ))),
            analyze_delay: Mutex::new(Duration::from_millis(300)),
            analyze_reply: Mutex::new(AnalyzeReply::Payload(sample_payload())),
            upload_calls: AtomicUsize::new(0),
            analyze_calls: AtomicUsize::new(0),
            uploaded: Mutex::new(Vec::new()),
        }
    }

    pub fn with_upload_delay(mut self, delay: Duration) -> Self {
        self.upload_delay = delay;
        self
    }

    pub fn with_upload_reply(self, reply: UploadReply) -> Self {
        *self.upload_reply.lock().unwrap() = reply;
        self
    }

    pub fn with_analyze_delay(self, delay: Duration) -> Self {
        self.set_analyze_delay(delay);
        self
    }

    pub fn with_analyze_reply(self, reply: AnalyzeReply) -> Self {
        self.set_analyze_reply(reply);
        self
    }

    pub fn set_analyze_delay(&self, delay: Duration) {
        *self.analyze_delay.lock().unwrap() = delay;
    }

    pub fn set_analyze_reply(&self, reply: AnalyzeReply) {
        *self.analyze_reply.lock().unwrap() = reply;
    }

    pub fn set_upload_reply(&self, reply: UploadReply) {
        *self.upload_reply.lock().unwrap() = reply;
    }

    pub fn upload_calls(&self) -> usize {
        self.upload_calls.load(Ordering::SeqCst)
    }

    pub fn analyze_calls(&self) -> usize {
        self.analyze_calls.load(Ordering::SeqCst)
    }

    /// 每次上传调用收到的文件名
    pub fn uploaded(&self) -> Vec<Vec<String>> {
        self.uploaded.lock().unwrap().clone()
    }
}

#[async_trait]
impl IntakeApi for FakeApi {
    async fn upload(&self, files: &[PdfFile]) -> Result<UploadReceipt, UploadError> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);
        self.uploaded
            .lock()
            .unwrap()
            .push(files.iter().map(|f| f.name.clone()).collect());

        tokio::time::sleep(self.upload_delay).await;

        let reply = self.upload_reply.lock().unwrap().clone();
        match reply {
            UploadReply::Accept(message) => Ok(UploadReceipt { message }),
            UploadReply::Reject { status, message } => {
                Err(UploadError::Rejected { status, message })
            }
        }
    }

    async fn analyze_all(&self) -> Result<AnalysisResult, AnalysisError> {
        self.analyze_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.analyze_delay.lock().unwrap();
        tokio::time::sleep(delay).await;

        let reply = self.analyze_reply.lock().unwrap().clone();
        match reply {
            AnalyzeReply::Payload(value) => AnalysisResult::from_value(value),
            AnalyzeReply::Reject { status, message } => {
                Err(AnalysisError::Rejected { status, message })
            }
        }
    }
}

/// 默认时间表下的配置
pub fn config() -> Config {
    Config::default()
}

pub fn pdf(name: &str, size: usize) -> PdfFile {
    PdfFile::new(name, vec![b'%'; size])
}

pub fn sample_payload() -> Value {
    json!({
        "num_files_processed": 1,
        "cleaned_data": {
            "document_type": "Discharge Summary",
            "patient_info": { "name": "Jane Roe", "dob": "1980-02-14", "id": "MRN-4471" },
            "provider_info": { "name": "Dr. Smith" },
            "clinical_info": {
                "diagnosis": "Hypertension",
                "medications": [
                    { "name": "Lisinopril", "dosage": "10mg", "instructions": "once daily" }
                ],
                "vital_signs": { "blood_pressure": "140/90" }
            },
            "additional_notes": "Follow up in two weeks"
        },
        "form_filling_status": "running_in_background"
    })
}
