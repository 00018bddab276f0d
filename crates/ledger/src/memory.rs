use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use domain::SubmittedOrder;
use tokio::sync::RwLock;

use crate::{AuditLedger, LedgerRecord, LedgerWriteError, Result};

/// In-memory ledger for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedger {
    records: Arc<RwLock<Vec<LedgerRecord>>>,
    fail_on_append: Arc<AtomicBool>,
}

impl InMemoryLedger {
    /// Creates a new empty in-memory ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the ledger to reject appends.
    pub fn set_fail_on_append(&self, fail: bool) {
        self.fail_on_append.store(fail, Ordering::SeqCst);
    }

    /// Returns the number of rows recorded.
    pub async fn row_count(&self) -> usize {
        self.records.read().await.len()
    }

    /// Returns the rows recorded for one order number.
    pub async fn rows_for(&self, order_number: &str) -> Vec<LedgerRecord> {
        self.records
            .read()
            .await
            .iter()
            .filter(|r| r.order_number == order_number)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl AuditLedger for InMemoryLedger {
    async fn append(&self, order: &SubmittedOrder) -> Result<usize> {
        if self.fail_on_append.load(Ordering::SeqCst) {
            return Err(LedgerWriteError::Unavailable("disk full".to_string()));
        }

        let records = LedgerRecord::for_order(order);
        let written = records.len();
        self.records.write().await.extend(records);
        Ok(written)
    }
}
