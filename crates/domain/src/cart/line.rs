//! Line item value objects.

use serde::{Deserialize, Serialize};

use crate::money::Money;

/// Composite identity of a line item within a cart: `(category, product)`.
///
/// Two adds with equal keys aggregate into one line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LineKey {
    pub category: String,
    pub product: String,
}

impl LineKey {
    /// Creates a new line key.
    pub fn new(category: impl Into<String>, product: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            product: product.into(),
        }
    }
}

impl std::fmt::Display for LineKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.category, self.product)
    }
}

/// One aggregated line of a cart or submitted order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Catalog category, e.g. `BIER`.
    pub category: String,

    /// Product name within the category.
    pub product: String,

    /// Price per unit.
    pub unit_price: Money,

    /// Number of units; never below 1.
    pub quantity: u32,
}

impl LineItem {
    /// Creates a line holding a single unit.
    pub fn single(key: LineKey, unit_price: Money) -> Self {
        Self {
            category: key.category,
            product: key.product,
            unit_price,
            quantity: 1,
        }
    }

    /// Returns the composite key of this line.
    pub fn key(&self) -> LineKey {
        LineKey::new(self.category.clone(), self.product.clone())
    }

    /// Returns `quantity × unit_price`.
    pub fn total_price(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }
}
