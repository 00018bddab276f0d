use std::time::Duration;

use thiserror::Error;

/// Errors that can occur when writing to or reading from the order store.
///
/// Any of these on `insert_batch` means nothing from the batch was committed.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// A database error occurred (connection, constraint, aborted transaction).
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The operation did not finish within the configured bound.
    #[error("Order store did not respond within {0:?}")]
    Timeout(Duration),

    /// The store is unreachable.
    #[error("Order store unavailable: {0}")]
    Unavailable(String),

    /// The batch cannot be written as given.
    #[error("Invalid batch: {0}")]
    InvalidBatch(String),
}

/// Result type for order store operations.
pub type Result<T> = std::result::Result<T, PersistenceError>;
