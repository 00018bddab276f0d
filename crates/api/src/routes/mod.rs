//! HTTP route handlers.

pub mod catalog;
pub mod ops;
pub mod sessions;
