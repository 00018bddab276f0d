use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use domain::{OrderNumber, SubmittedOrder};
use tokio::sync::RwLock;

use crate::{
    PersistenceError, Result,
    store::{OrderStore, StoredOrderLine, validate_batch},
};

#[derive(Debug, Default)]
struct Table {
    rows: Vec<StoredOrderLine>,
    next_id: i64,
}

/// In-memory order store for tests and database-less runs.
///
/// Provides the same all-or-nothing batch semantics as the PostgreSQL
/// implementation and can be switched into an unreachable state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOrderStore {
    table: Arc<RwLock<Table>>,
    unavailable: Arc<AtomicBool>,
}

impl InMemoryOrderStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call fail with `PersistenceError::Unavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Returns the total number of rows stored.
    pub async fn row_count(&self) -> usize {
        self.table.read().await.rows.len()
    }

    /// Returns every stored row.
    pub async fn all_rows(&self) -> Vec<StoredOrderLine> {
        self.table.read().await.rows.clone()
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(PersistenceError::Unavailable(
                "in-memory store is switched off".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn ensure_schema(&self) -> Result<()> {
        self.check_available()
    }

    async fn insert_batch(&self, order: &SubmittedOrder) -> Result<usize> {
        self.check_available()?;
        validate_batch(order)?;

        let mut table = self.table.write().await;

        // Build every row before touching the table so a bad line leaves it unchanged.
        let first_id = table.next_id + 1;
        let rows = order
            .lines()
            .iter()
            .zip(first_id..)
            .map(|(line, id)| StoredOrderLine::from_line(id, order, line))
            .collect::<Result<Vec<_>>>()?;

        let written = rows.len();
        table.next_id += written as i64;
        table.rows.extend(rows);

        Ok(written)
    }

    async fn lines_for_order(&self, order_number: &OrderNumber) -> Result<Vec<StoredOrderLine>> {
        self.check_available()?;
        let table = self.table.read().await;
        Ok(table
            .rows
            .iter()
            .filter(|row| row.order_number == order_number.as_str())
            .cloned()
            .collect())
    }
}
