//! Authoritative, transactional storage of submitted order lines.
//!
//! `OrderStore` is implemented by `PostgresOrderStore` for production and by
//! `InMemoryOrderStore` for tests and local runs without a database.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;

pub use error::{PersistenceError, Result};
pub use memory::InMemoryOrderStore;
pub use postgres::{DEFAULT_STATEMENT_TIMEOUT, PostgresOrderStore};
pub use store::{OrderStore, StoredOrderLine, validate_batch};
