use async_trait::async_trait;
use domain::{LineItem, SubmittedOrder};

use crate::Result;

/// One ledger row: a line item stamped with its order's identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerRecord {
    pub order_number: String,
    pub timestamp: String,
    pub category: String,
    pub product: String,
    pub quantity: u32,
    pub unit_price: i64,
    pub total_price: i64,
}

impl LedgerRecord {
    /// Builds the record for one line of `order`.
    pub fn new(order: &SubmittedOrder, line: &LineItem) -> Self {
        Self {
            order_number: order.order_number().to_string(),
            timestamp: order.timestamp_iso(),
            category: line.category.clone(),
            product: line.product.clone(),
            quantity: line.quantity,
            unit_price: line.unit_price.amount(),
            total_price: line.total_price().amount(),
        }
    }

    /// Builds one record per line of `order`, in line order.
    pub fn for_order(order: &SubmittedOrder) -> Vec<Self> {
        order
            .lines()
            .iter()
            .map(|line| Self::new(order, line))
            .collect()
    }
}

/// Append-only audit destination.
///
/// Implementations must tolerate concurrent appends from different sessions
/// without interleaving the rows of one call with another.
#[async_trait]
pub trait AuditLedger: Send + Sync {
    /// Appends one record per line of `order`. Returns the number of rows written.
    async fn append(&self, order: &SubmittedOrder) -> Result<usize>;
}
