//! Per-session cart registry.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use common::SessionId;
use domain::OrderCart;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// A session's cart. The mutex serializes add, reset and submit for one session.
pub type SharedCart = Arc<Mutex<OrderCart>>;

#[derive(Debug)]
struct Session {
    cart: SharedCart,
    last_used: Instant,
}

impl Session {
    fn new() -> Self {
        Self {
            cart: Arc::new(Mutex::new(OrderCart::new())),
            last_used: Instant::now(),
        }
    }
}

/// Concurrency-safe mapping from session to its private cart.
///
/// Sessions never share a cart; only the map itself is shared. Sessions that
/// are not used for longer than the idle limit are removed by
/// [`SessionRegistry::evict_idle`].
#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<SessionId, Session>>>,
}

impl SessionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a new session with an empty cart.
    pub async fn open(&self) -> SessionId {
        let id = SessionId::new();
        self.sessions.write().await.insert(id, Session::new());
        tracing::debug!(session_id = %id, "session opened");
        id
    }

    /// Returns the cart of a session and marks the session as used.
    pub async fn get(&self, id: SessionId) -> Option<SharedCart> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&id)?;
        session.last_used = Instant::now();
        Some(Arc::clone(&session.cart))
    }

    /// Closes a session, discarding its cart. Returns false if it did not exist.
    pub async fn close(&self, id: SessionId) -> bool {
        let removed = self.sessions.write().await.remove(&id).is_some();
        if removed {
            tracing::debug!(session_id = %id, "session closed");
        }
        removed
    }

    /// Removes sessions unused for longer than `max_idle`.
    ///
    /// A session whose cart is locked (a request is in flight) is kept.
    /// Returns the number of sessions removed.
    pub async fn evict_idle(&self, max_idle: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| {
            session.last_used.elapsed() <= max_idle || session.cart.try_lock().is_err()
        });

        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::info!(evicted, remaining = sessions.len(), "idle sessions evicted");
        }
        evicted
    }

    /// Runs [`Self::evict_idle`] every `every` until the task is aborted.
    pub fn spawn_idle_sweeper(&self, max_idle: Duration, every: Duration) -> JoinHandle<()> {
        let registry = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                registry.evict_idle(max_idle).await;
            }
        })
    }

    /// Returns the number of open sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Returns true if no session is open.
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use domain::Money;

    use super::*;

    #[tokio::test]
    async fn test_sessions_have_private_carts() {
        let registry = SessionRegistry::new();
        let a = registry.open().await;
        let b = registry.open().await;

        registry
            .get(a)
            .await
            .unwrap()
            .lock()
            .await
            .add_item("BIER", "Pabst", Money::new(5))
            .unwrap();

        assert_eq!(registry.get(a).await.unwrap().lock().await.line_count(), 1);
        assert!(registry.get(b).await.unwrap().lock().await.is_empty());
        assert_eq!(registry.len().await, 2);
    }

    #[tokio::test]
    async fn test_close_discards_cart() {
        let registry = SessionRegistry::new();
        let id = registry.open().await;

        assert!(registry.close(id).await);
        assert!(!registry.close(id).await);
        assert!(registry.get(id).await.is_none());
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_unknown_session() {
        let registry = SessionRegistry::new();
        assert!(registry.get(SessionId::new()).await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_sessions_are_evicted() {
        let registry = SessionRegistry::new();
        let idle = registry.open().await;
        let active = registry.open().await;

        tokio::time::advance(Duration::from_secs(50)).await;
        registry.get(active).await.unwrap();
        tokio::time::advance(Duration::from_secs(20)).await;

        assert_eq!(registry.evict_idle(Duration::from_secs(60)).await, 1);
        assert!(registry.get(idle).await.is_none());
        assert!(registry.get(active).await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_in_use_is_not_evicted() {
        let registry = SessionRegistry::new();
        let id = registry.open().await;
        let cart = registry.get(id).await.unwrap();
        let _held = cart.lock().await;

        tokio::time::advance(Duration::from_secs(120)).await;
        assert_eq!(registry.evict_idle(Duration::from_secs(60)).await, 0);
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_evicts_in_background() {
        let registry = SessionRegistry::new();
        registry.open().await;

        let sweeper =
            registry.spawn_idle_sweeper(Duration::from_secs(60), Duration::from_secs(10));
        tokio::time::sleep(Duration::from_secs(75)).await;

        assert!(registry.is_empty().await);
        sweeper.abort();
    }
}
