//! Append-only log of accepted submissions.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::HistoryRecord;

/// Every accepted submission, in the order it was accepted.
#[derive(Debug, Clone, Default)]
pub struct HistoryLog {
    records: Arc<RwLock<Vec<HistoryRecord>>>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn append(&self, record: HistoryRecord) {
        self.records.write().await.push(record);
    }

    pub async fn snapshot_all(&self) -> Vec<HistoryRecord> {
        self.records.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}
