//! Domain error types.

use thiserror::Error;

/// Rejection of a cart mutation or catalog lookup.
///
/// Raised at the call site; a rejected call leaves the cart untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Unit price must be strictly positive.
    #[error("Invalid price: {price} (must be greater than 0)")]
    InvalidPrice { price: i64 },

    /// A required name was empty or whitespace.
    #[error("{field} must not be blank")]
    BlankField { field: &'static str },

    /// The category is not part of the catalog.
    #[error("Unknown category: {category}")]
    UnknownCategory { category: String },

    /// Adding the item would overflow the line quantity or the cart total.
    #[error("Adding {category}/{product} would overflow the cart total")]
    AmountOverflow { category: String, product: String },

    /// The category exists but does not list the product.
    #[error("Unknown product '{product}' in category {category}")]
    UnknownProduct { category: String, product: String },
}
