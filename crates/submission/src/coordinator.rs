//! Submission coordinator.

use std::sync::Arc;
use std::time::Instant;

use domain::{OrderCart, OrderIdGenerator, RandomOrderIds, SubmittedOrder};
use ledger::AuditLedger;
use order_store::OrderStore;

use crate::outcome::SubmissionOutcome;
use crate::state::SubmissionState;

/// Orchestrates one submission: identity, ledger append, store commit.
///
/// The ledger is the best-effort audit copy, the store is the authority.
/// A ledger failure is recorded and the store write still happens; a store
/// failure leaves the cart untouched. There are no retries here.
pub struct SubmissionCoordinator<L, S>
where
    L: AuditLedger,
    S: OrderStore,
{
    ledger: L,
    store: S,
    ids: Arc<dyn OrderIdGenerator>,
}

impl<L, S> SubmissionCoordinator<L, S>
where
    L: AuditLedger,
    S: OrderStore,
{
    /// Creates a coordinator minting random order numbers.
    pub fn new(ledger: L, store: S) -> Self {
        Self {
            ledger,
            store,
            ids: Arc::new(RandomOrderIds::new()),
        }
    }

    /// Replaces the order identity source.
    pub fn with_id_generator(mut self, ids: impl OrderIdGenerator + 'static) -> Self {
        self.ids = Arc::new(ids);
        self
    }

    /// Returns the ledger.
    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Returns the store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Submits the cart.
    ///
    /// The exclusive borrow of `cart` serializes submissions per session.
    /// On success the cart is reset; on any store failure it is left exactly
    /// as it was.
    #[tracing::instrument(skip(self, cart), fields(lines = cart.line_count(), total = %cart.total()))]
    pub async fn submit(&self, cart: &mut OrderCart) -> SubmissionOutcome {
        if cart.is_empty() {
            tracing::debug!("empty cart, nothing to submit");
            metrics::counter!("submissions_total", "outcome" => "nothing_to_submit").increment(1);
            return SubmissionOutcome::NothingToSubmit;
        }

        let started = Instant::now();

        // 1. One identity for every line
        let order = SubmittedOrder::from_cart(self.ids.next(), cart);
        let state = self.transition(SubmissionState::Idle, SubmissionState::Identified);
        tracing::info!(order_number = %order.order_number(), "order identity minted");

        // 2. Ledger append, best effort
        let ledger_error = match self.ledger.append(&order).await {
            Ok(rows) => {
                tracing::debug!(rows, "ledger append done");
                None
            }
            Err(e) => {
                tracing::warn!(
                    order_number = %order.order_number(),
                    error = %e,
                    "ledger append failed, continuing with store write"
                );
                metrics::counter!("ledger_write_failures_total").increment(1);
                Some(e)
            }
        };
        let state = self.transition(state, SubmissionState::LedgerWritten);

        // 3. Store commit, authoritative
        let outcome = match self.store.insert_batch(&order).await {
            Ok(lines_written) => {
                let state = self.transition(state, SubmissionState::StoreCommitted);
                cart.reset();
                self.transition(state, SubmissionState::Succeeded);

                tracing::info!(
                    order_number = %order.order_number(),
                    lines_written,
                    audit_gap = ledger_error.is_some(),
                    "order submitted"
                );
                SubmissionOutcome::Succeeded {
                    identity: order.identity().clone(),
                    lines_written,
                    ledger_error,
                }
            }
            Err(error) => {
                self.transition(state, SubmissionState::Failed);

                tracing::error!(
                    order_number = %order.order_number(),
                    error = %error,
                    ledger_written = ledger_error.is_none(),
                    "order not saved, cart kept"
                );
                SubmissionOutcome::Failed {
                    identity: order.identity().clone(),
                    error,
                    ledger_error,
                }
            }
        };

        metrics::counter!("submissions_total", "outcome" => outcome.label()).increment(1);
        metrics::histogram!("submission_duration_seconds").record(started.elapsed().as_secs_f64());

        outcome
    }

    fn transition(&self, from: SubmissionState, to: SubmissionState) -> SubmissionState {
        debug_assert!(from.can_advance_to(to), "illegal transition {from} -> {to}");
        tracing::trace!(%from, %to, "submission state");
        to
    }
}
