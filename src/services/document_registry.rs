//! 文档登记服务 - 业务能力层
//!
//! 只负责"记录已上传的文档"，不关心上传流程本身

use crate::models::{format_file_size, DocumentStatus, UploadedDocument};
use chrono::Local;
use std::collections::VecDeque;
use tokio::sync::watch;
use tracing::debug;

/// 登记表的快照
///
/// 文档列表和计数是同一个值，订阅者看到的计数总是和列表一致。
#[derive(Debug, Clone, Default)]
pub struct RegistryState {
    /// 最新的在前
    documents: VecDeque<UploadedDocument>,
    last_id: i64,
}

impl RegistryState {
    pub fn documents(&self) -> impl Iterator<Item = &UploadedDocument> {
        self.documents.iter()
    }

    pub fn count(&self) -> usize {
        self.documents.len()
    }

    /// 基于毫秒时间戳生成 ID；同一毫秒内的多次登记顺延
    fn next_id(&mut self, now_millis: i64) -> i64 {
        let id = now_millis.max(self.last_id + 1);
        self.last_id = id;
        id
    }
}

/// 内存中的文档登记表
///
/// 职责：
/// - 按登记顺序倒序保存文档（新的在前）
/// - 对外暴露 register / list / count
/// - 不提供修改和删除
/// - 只由上传编排器在成功路径上写入
pub struct DocumentRegistry {
    state: watch::Sender<RegistryState>,
}

impl DocumentRegistry {
    pub fn new() -> Self {
        let (state, _) = watch::channel(RegistryState::default());
        Self { state }
    }

    /// 登记一个上传成功的文件，状态固定为 `completed`
    pub fn register(&self, name: impl Into<String>, size_bytes: u64) -> UploadedDocument {
        let mut document = UploadedDocument {
            id: String::new(),
            name: name.into(),
            uploaded_at: Local::now(),
            size_bytes,
            size: format_file_size(size_bytes),
            status: DocumentStatus::Completed,
        };

        self.state.send_modify(|state| {
            document.id = state.next_id(document.uploaded_at.timestamp_millis()).to_string();
            state.documents.push_front(document.clone());
        });

        debug!("登记文档: {} ({}) id={}", document.name, document.size, document.id);
        document
    }

    /// 所有文档，最新的在前
    pub fn list(&self) -> Vec<UploadedDocument> {
        self.state.borrow().documents.iter().cloned().collect()
    }

    pub fn count(&self) -> usize {
        self.state.borrow().count()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// 订阅登记表变化（例如侧边栏的计数徽标）
    pub fn subscribe(&self) -> watch::Receiver<RegistryState> {
        self.state.subscribe()
    }
}

impl Default for DocumentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    #[test]
    fn two_megabyte_report_lands_at_the_front() {
        let registry = DocumentRegistry::new();
        registry.register("older.pdf", 10);
        registry.register("report.pdf", 2 * 1024 * 1024);

        let front = &registry.list()[0];
        assert_eq!(front.name, "report.pdf");
        assert_eq!(front.size, "2.0 MB");
        assert_eq!(front.status, DocumentStatus::Completed);
    }

    #[test]
    fn ids_are_unique_within_the_same_millisecond() {
        let mut state = RegistryState::default();
        let a = state.next_id(1_000);
        let b = state.next_id(1_000);
        let c = state.next_id(999);
        let d = state.next_id(5_000);
        assert_eq!((a, b, c, d), (1_000, 1_001, 1_002, 5_000));
    }

    #[tokio::test]
    async fn subscribers_see_count_with_each_registration() {
        let registry = DocumentRegistry::new();
        let mut badge = registry.subscribe();
        assert_eq!(badge.borrow().count(), 0);

        registry.register("a.pdf", 1);
        badge.changed().await.unwrap();
        let snapshot = badge.borrow_and_update().clone();
        assert_eq!(snapshot.count(), 1);
        assert_eq!(snapshot.documents().count(), snapshot.count());
    }

    proptest! {
        #[test]
        fn batches_register_newest_first_with_unique_ids(
            batches in prop::collection::vec(prop::collection::vec(0u64..5_000_000, 1..5), 1..6)
        ) {
            let registry = DocumentRegistry::new();
            let mut expected = Vec::new();

            for (b, batch) in batches.iter().enumerate() {
                let before = registry.count();
                for (f, size) in batch.iter().enumerate() {
                    let name = format!("batch{b}-file{f}.pdf");
                    registry.register(name.clone(), *size);
                    expected.insert(0, name);
                }
                prop_assert_eq!(registry.count(), before + batch.len());
            }

            let listed = registry.list();
            let names: Vec<_> = listed.iter().map(|d| d.name.clone()).collect();
            prop_assert_eq!(names, expected);

            let ids: HashSet<_> = listed.iter().map(|d| d.id.clone()).collect();
            prop_assert_eq!(ids.len(), listed.len());
        }
    }
}
