//! Append-only audit ledger of submitted order lines.
//!
//! The ledger is a secondary, human-readable copy of every submission. It is
//! never read back by the service and never rewritten.

pub mod csv;
pub mod error;
pub mod ledger;
pub mod memory;

pub use csv::{CsvLedger, HEADER};
pub use error::{LedgerWriteError, Result};
pub use ledger::{AuditLedger, LedgerRecord};
pub use memory::InMemoryLedger;
