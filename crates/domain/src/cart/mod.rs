//! The order cart and its line items.

mod line;
mod order_cart;

pub use line::{LineItem, LineKey};
pub use order_cart::OrderCart;
