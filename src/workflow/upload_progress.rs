//! 上传进度模拟 - 流程层
//!
//! 进度只是给用户看的提示：按固定间隔加固定步长，请求结束前封顶，
//! 与实际传输的字节数无关。

/// 模拟的上传进度（0..=100）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadProgress {
    value: u8,
    step: u8,
    cap: u8,
}

impl UploadProgress {
    pub fn new(step: u8, cap: u8) -> Self {
        Self {
            value: 0,
            step,
            cap: cap.min(100),
        }
    }

    /// 计时器触发一次：加一个步长，不超过上限
    pub fn tick(&mut self) -> u8 {
        if self.value < self.cap {
            self.value = self.value.saturating_add(self.step).min(self.cap);
        }
        self.value
    }

    /// 收到响应（无论成功失败）立即置为 100
    pub fn settle(&mut self) -> u8 {
        self.value = 100;
        self.value
    }

    pub fn reset(&mut self) -> u8 {
        self.value = 0;
        self.value
    }
}
