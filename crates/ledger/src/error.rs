use std::path::PathBuf;

use thiserror::Error;

/// Failure to append to the audit ledger.
///
/// Never fatal to a submission; surfaced so the audit gap is visible.
#[derive(Debug, Error)]
pub enum LedgerWriteError {
    /// The destination could not be opened or written.
    #[error("Cannot write ledger {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The ledger refused the write.
    #[error("Ledger unavailable: {0}")]
    Unavailable(String),
}

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerWriteError>;
