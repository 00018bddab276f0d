//! Domain layer for the POS order capture service.
//!
//! This crate provides:
//! - `OrderCart`, the per-session aggregate of line items and running total
//! - `Catalog`, the static category → product/price reference data
//! - Order identity (`OrderNumber`, `OrderIdentity`) and the generators that mint it
//! - `SubmittedOrder`, the immutable snapshot handed to the ledger and the store

pub mod cart;
pub mod catalog;
pub mod error;
pub mod identity;
pub mod money;
pub mod submitted;

pub use cart::{LineItem, LineKey, OrderCart};
pub use catalog::{Catalog, Category, Product};
pub use error::ValidationError;
pub use identity::{
    OrderIdGenerator, OrderIdentity, OrderNumber, RandomOrderIds, SequentialOrderIds,
};
pub use money::Money;
pub use submitted::SubmittedOrder;
