use async_trait::async_trait;
use domain::{LineItem, OrderNumber, SubmittedOrder};

use crate::{PersistenceError, Result};

/// One persisted row of the `orders` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredOrderLine {
    /// Surrogate key assigned by the store.
    pub id: i64,
    pub order_number: String,
    pub timestamp: String,
    pub category: String,
    pub product: String,
    pub quantity: i32,
    pub unit_price: i64,
    pub total_price: i64,
}

impl StoredOrderLine {
    /// Builds the row for `line` of `order` under surrogate key `id`.
    pub(crate) fn from_line(id: i64, order: &SubmittedOrder, line: &LineItem) -> Result<Self> {
        let quantity = i32::try_from(line.quantity).map_err(|_| {
            PersistenceError::InvalidBatch(format!(
                "quantity {} of {}/{} exceeds column range",
                line.quantity, line.category, line.product
            ))
        })?;

        Ok(Self {
            id,
            order_number: order.order_number().to_string(),
            timestamp: order.timestamp_iso(),
            category: line.category.clone(),
            product: line.product.clone(),
            quantity,
            unit_price: line.unit_price.amount(),
            total_price: line.total_price().amount(),
        })
    }
}

/// Core trait for order store implementations.
///
/// All implementations must be thread-safe (Send + Sync); concurrent batches
/// from different sessions must not interfere with each other.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Creates the schema if it does not exist. Safe to call repeatedly.
    async fn ensure_schema(&self) -> Result<()>;

    /// Inserts one row per line of `order`.
    ///
    /// Rows are written atomically - either all commit or none do.
    /// Returns the number of rows written.
    async fn insert_batch(&self, order: &SubmittedOrder) -> Result<usize>;

    /// Retrieves the rows of one order, in insertion order.
    async fn lines_for_order(&self, order_number: &OrderNumber) -> Result<Vec<StoredOrderLine>>;
}

/// Validates an order before it is written.
pub fn validate_batch(order: &SubmittedOrder) -> Result<()> {
    if order.lines().is_empty() {
        return Err(PersistenceError::InvalidBatch(format!(
            "order {} has no lines",
            order.order_number()
        )));
    }

    if let Some(line) = order.lines().iter().find(|line| line.quantity == 0) {
        return Err(PersistenceError::InvalidBatch(format!(
            "line {}/{} has zero quantity",
            line.category, line.product
        )));
    }

    Ok(())
}
