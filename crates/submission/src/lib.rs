//! Order submission.
//!
//! A submission takes a non-empty cart through these steps:
//! 1. Mint one order identity shared by every line
//! 2. Append the lines to the audit ledger (best effort)
//! 3. Insert the lines into the order store in one transaction (authoritative)
//!
//! The cart is reset only when the store commits. The two destinations are not
//! made atomic with each other; instead the outcome reports each side's
//! failure separately so an operator can reconcile them.

pub mod coordinator;
pub mod outcome;
pub mod state;

pub use coordinator::SubmissionCoordinator;
pub use outcome::SubmissionOutcome;
pub use state::SubmissionState;
