//! Submission state machine.

use serde::{Deserialize, Serialize};

/// The state of one submission attempt.
///
/// State transitions:
/// ```text
/// Idle ──► Identified ──► LedgerWritten ──┬──► StoreCommitted ──► Succeeded
///                                         └──► Failed
/// ```
/// `LedgerWritten` is reached whether or not the ledger append succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SubmissionState {
    /// Nothing has happened yet.
    #[default]
    Idle,

    /// An order identity has been minted.
    Identified,

    /// The ledger append has been attempted.
    LedgerWritten,

    /// The store transaction committed.
    StoreCommitted,

    /// Order stored and cart reset (terminal state).
    Succeeded,

    /// Store write failed, cart kept (terminal state).
    Failed,
}

impl SubmissionState {
    /// Returns true if `next` is a legal successor of this state.
    pub fn can_advance_to(&self, next: SubmissionState) -> bool {
        use SubmissionState::*;
        matches!(
            (*self, next),
            (Idle, Identified)
                | (Identified, LedgerWritten)
                | (LedgerWritten, StoreCommitted)
                | (LedgerWritten, Failed)
                | (StoreCommitted, Succeeded)
        )
    }

    /// Returns true if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SubmissionState::Succeeded | SubmissionState::Failed)
    }

    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionState::Idle => "Idle",
            SubmissionState::Identified => "Identified",
            SubmissionState::LedgerWritten => "LedgerWritten",
            SubmissionState::StoreCommitted => "StoreCommitted",
            SubmissionState::Succeeded => "Succeeded",
            SubmissionState::Failed => "Failed",
        }
    }
}

impl std::fmt::Display for SubmissionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
