//! Per-session order cart.

use std::collections::HashMap;

use crate::error::ValidationError;
use crate::money::Money;

use super::{LineItem, LineKey};

/// Mutable aggregate of line items for one session.
///
/// Lines are kept in first-insertion order. The running total is maintained
/// incrementally and always equals the sum of `quantity × unit_price` over
/// all lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderCart {
    lines: Vec<LineItem>,

    /// Position of each key in `lines`.
    index: HashMap<LineKey, usize>,

    total: Money,
}

impl OrderCart {
    /// Creates an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one unit of `(category, product)` at `unit_price`.
    ///
    /// An existing line with the same key has its quantity incremented,
    /// otherwise a new line with quantity 1 is appended. The unit price of an
    /// existing line is kept as first recorded.
    pub fn add_item(
        &mut self,
        category: impl Into<String>,
        product: impl Into<String>,
        unit_price: Money,
    ) -> Result<&LineItem, ValidationError> {
        let key = LineKey::new(category, product);
        Self::validate(&key, unit_price)?;

        let position = match self.index.get(&key) {
            Some(&position) => {
                let line = &self.lines[position];
                let (quantity, total) = line
                    .quantity
                    .checked_add(1)
                    .zip(self.total.checked_add(line.unit_price))
                    .ok_or_else(|| Self::overflow(&key))?;

                self.lines[position].quantity = quantity;
                self.total = total;
                position
            }
            None => {
                let total = self
                    .total
                    .checked_add(unit_price)
                    .ok_or_else(|| Self::overflow(&key))?;

                let position = self.lines.len();
                self.index.insert(key.clone(), position);
                self.lines.push(LineItem::single(key, unit_price));
                self.total = total;
                position
            }
        };

        let line = &self.lines[position];
        tracing::debug!(
            category = %line.category,
            product = %line.product,
            quantity = line.quantity,
            total = %self.total,
            "item added to cart"
        );
        Ok(line)
    }

    /// Clears every line and sets the total to zero.
    pub fn reset(&mut self) {
        self.lines.clear();
        self.index.clear();
        self.total = Money::zero();
    }

    /// Returns a read-only snapshot of the current lines.
    pub fn lines(&self) -> Vec<LineItem> {
        self.lines.clone()
    }

    /// Iterates over the current lines without copying.
    pub fn iter(&self) -> impl Iterator<Item = &LineItem> {
        self.lines.iter()
    }

    /// Returns the line for a key.
    pub fn get(&self, key: &LineKey) -> Option<&LineItem> {
        self.index.get(key).map(|&position| &self.lines[position])
    }

    /// Returns the running total.
    pub fn total(&self) -> Money {
        self.total
    }

    /// Returns the number of distinct lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Returns the sum of quantities over all lines.
    pub fn total_quantity(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    /// Returns true if the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn overflow(key: &LineKey) -> ValidationError {
        ValidationError::AmountOverflow {
            category: key.category.clone(),
            product: key.product.clone(),
        }
    }

    fn validate(key: &LineKey, unit_price: Money) -> Result<(), ValidationError> {
        if key.category.trim().is_empty() {
            return Err(ValidationError::BlankField { field: "category" });
        }
        if key.product.trim().is_empty() {
            return Err(ValidationError::BlankField { field: "product" });
        }
        if !unit_price.is_positive() {
            return Err(ValidationError::InvalidPrice {
                price: unit_price.amount(),
            });
        }
        Ok(())
    }
}
