//! Shared types used across the POS order capture crates.

mod types;

pub use types::{ParseSessionIdError, SessionId};
