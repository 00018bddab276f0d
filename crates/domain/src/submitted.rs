//! Immutable snapshot of a submitted order.

use serde::{Deserialize, Serialize};

use crate::cart::{LineItem, OrderCart};
use crate::identity::{OrderIdentity, OrderNumber};
use crate::money::Money;

/// An order as handed to the ledger and the store.
///
/// Every line shares the one `identity`; the snapshot is never mutated after
/// construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedOrder {
    identity: OrderIdentity,
    lines: Vec<LineItem>,
}

impl SubmittedOrder {
    /// Snapshots the current lines of a cart under `identity`.
    pub fn from_cart(identity: OrderIdentity, cart: &OrderCart) -> Self {
        Self {
            identity,
            lines: cart.lines(),
        }
    }

    /// Returns the shared identity.
    pub fn identity(&self) -> &OrderIdentity {
        &self.identity
    }

    /// Returns the order number.
    pub fn order_number(&self) -> &OrderNumber {
        &self.identity.order_number
    }

    /// Returns the submission timestamp as ISO-8601.
    pub fn timestamp_iso(&self) -> String {
        self.identity.timestamp_iso()
    }

    /// Returns the lines in cart order.
    pub fn lines(&self) -> &[LineItem] {
        &self.lines
    }

    /// Returns the number of lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Returns the sum of line totals.
    pub fn total(&self) -> Money {
        self.lines.iter().map(LineItem::total_price).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{OrderIdGenerator, SequentialOrderIds};

    #[test]
    fn test_snapshot_is_detached_from_cart() {
        let mut cart = OrderCart::new();
        cart.add_item("BIER", "Pabst", Money::new(5)).unwrap();
        cart.add_item("ESSEN", "Plättli", Money::new(18)).unwrap();

        let order = SubmittedOrder::from_cart(SequentialOrderIds::new().next(), &cart);
        cart.reset();

        assert_eq!(order.line_count(), 2);
        assert_eq!(order.total(), Money::new(23));
        assert!(order.order_number().as_str().ends_with("-000001"));
    }
}
