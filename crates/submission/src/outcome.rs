//! Result of a submission attempt.

use domain::{OrderIdentity, OrderNumber};
use ledger::LedgerWriteError;
use order_store::PersistenceError;

use crate::state::SubmissionState;

/// What happened to one `submit` call.
///
/// The ledger and store results are reported separately so that
/// "order saved, audit row missing" and "audit row written, order not saved"
/// are both visible to the caller.
#[derive(Debug)]
pub enum SubmissionOutcome {
    /// The cart was empty; no identity was minted and nothing was written.
    NothingToSubmit,

    /// The store committed every line and the cart was reset.
    Succeeded {
        identity: OrderIdentity,
        lines_written: usize,
        /// Set when the ledger append failed for this order.
        ledger_error: Option<LedgerWriteError>,
    },

    /// The store committed nothing; the cart is unchanged.
    Failed {
        identity: OrderIdentity,
        error: PersistenceError,
        /// Set when the ledger append failed too.
        ledger_error: Option<LedgerWriteError>,
    },
}

impl SubmissionOutcome {
    /// Returns true if the order is in the store.
    pub fn is_success(&self) -> bool {
        matches!(self, SubmissionOutcome::Succeeded { .. })
    }

    /// Returns the order number minted for this attempt.
    pub fn order_number(&self) -> Option<&OrderNumber> {
        self.identity().map(|identity| &identity.order_number)
    }

    /// Returns the identity minted for this attempt.
    pub fn identity(&self) -> Option<&OrderIdentity> {
        match self {
            SubmissionOutcome::NothingToSubmit => None,
            SubmissionOutcome::Succeeded { identity, .. }
            | SubmissionOutcome::Failed { identity, .. } => Some(identity),
        }
    }

    /// Returns the ledger failure, if any.
    pub fn ledger_error(&self) -> Option<&LedgerWriteError> {
        match self {
            SubmissionOutcome::NothingToSubmit => None,
            SubmissionOutcome::Succeeded { ledger_error, .. }
            | SubmissionOutcome::Failed { ledger_error, .. } => ledger_error.as_ref(),
        }
    }

    /// Returns the store failure, if any.
    pub fn store_error(&self) -> Option<&PersistenceError> {
        match self {
            SubmissionOutcome::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Returns true if the ledger append failed.
    pub fn has_audit_gap(&self) -> bool {
        self.ledger_error().is_some()
    }

    /// Returns true if the ledger and the store disagree about this order.
    pub fn needs_reconciliation(&self) -> bool {
        match self {
            SubmissionOutcome::NothingToSubmit => false,
            SubmissionOutcome::Succeeded { ledger_error, .. } => ledger_error.is_some(),
            SubmissionOutcome::Failed { ledger_error, .. } => ledger_error.is_none(),
        }
    }

    /// Returns the final state of the attempt.
    pub fn state(&self) -> SubmissionState {
        match self {
            SubmissionOutcome::NothingToSubmit => SubmissionState::Idle,
            SubmissionOutcome::Succeeded { .. } => SubmissionState::Succeeded,
            SubmissionOutcome::Failed { .. } => SubmissionState::Failed,
        }
    }

    /// Short label used for metrics and responses.
    pub fn label(&self) -> &'static str {
        match self {
            SubmissionOutcome::NothingToSubmit => "nothing_to_submit",
            SubmissionOutcome::Succeeded { .. } => "succeeded",
            SubmissionOutcome::Failed { .. } => "failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use domain::{OrderIdGenerator, SequentialOrderIds};

    use super::*;

    fn identity() -> OrderIdentity {
        SequentialOrderIds::new().next()
    }

    #[test]
    fn test_nothing_to_submit_has_no_identity() {
        let outcome = SubmissionOutcome::NothingToSubmit;
        assert!(!outcome.is_success());
        assert!(outcome.order_number().is_none());
        assert!(!outcome.needs_reconciliation());
        assert_eq!(outcome.state(), SubmissionState::Idle);
    }

    #[test]
    fn test_clean_success_needs_no_reconciliation() {
        let outcome = SubmissionOutcome::Succeeded {
            identity: identity(),
            lines_written: 2,
            ledger_error: None,
        };
        assert!(outcome.is_success());
        assert!(!outcome.has_audit_gap());
        assert!(!outcome.needs_reconciliation());
        assert_eq!(outcome.label(), "succeeded");
    }

    #[test]
    fn test_success_with_audit_gap() {
        let outcome = SubmissionOutcome::Succeeded {
            identity: identity(),
            lines_written: 1,
            ledger_error: Some(LedgerWriteError::Unavailable("disk full".into())),
        };
        assert!(outcome.is_success());
        assert!(outcome.has_audit_gap());
        assert!(outcome.needs_reconciliation());
    }

    #[test]
    fn test_failure_after_ledger_write_needs_reconciliation() {
        let outcome = SubmissionOutcome::Failed {
            identity: identity(),
            error: PersistenceError::Unavailable("down".into()),
            ledger_error: None,
        };
        assert!(!outcome.is_success());
        assert!(outcome.store_error().is_some());
        assert!(outcome.needs_reconciliation());
        assert_eq!(outcome.state(), SubmissionState::Failed);
    }

    #[test]
    fn test_failure_on_both_sides_is_consistent() {
        let outcome = SubmissionOutcome::Failed {
            identity: identity(),
            error: PersistenceError::Unavailable("down".into()),
            ledger_error: Some(LedgerWriteError::Unavailable("disk full".into())),
        };
        assert!(outcome.has_audit_gap());
        assert!(!outcome.needs_reconciliation());
    }
}
