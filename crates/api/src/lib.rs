//! HTTP adapter for the POS order capture service.
//!
//! Exposes the cart operations (add item, reset, submit) and a read-only
//! cart view per session, with structured logging (tracing) and Prometheus
//! metrics.

pub mod config;
pub mod error;
pub mod routes;
pub mod session;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use domain::Catalog;
use ledger::AuditLedger;
use metrics_exporter_prometheus::PrometheusHandle;
use order_store::OrderStore;
use submission::SubmissionCoordinator;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use session::SessionRegistry;

/// Shared application state accessible from all handlers.
pub struct AppState<L: AuditLedger, S: OrderStore> {
    pub sessions: SessionRegistry,
    pub catalog: Catalog,
    pub coordinator: SubmissionCoordinator<L, S>,
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<L: AuditLedger + 'static, S: OrderStore + 'static>(
    state: Arc<AppState<L, S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::ops::metrics))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::ops::health::<L, S>))
        .route("/catalog", get(routes::catalog::list::<L, S>))
        .route("/sessions", post(routes::sessions::open::<L, S>))
        .route(
            "/sessions/{id}",
            axum::routing::delete(routes::sessions::close::<L, S>),
        )
        .route("/sessions/{id}/cart", get(routes::sessions::cart::<L, S>))
        .route(
            "/sessions/{id}/items",
            post(routes::sessions::add_item::<L, S>),
        )
        .route("/sessions/{id}/reset", post(routes::sessions::reset::<L, S>))
        .route(
            "/sessions/{id}/submit",
            post(routes::sessions::submit::<L, S>),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates application state with the festival catalog.
pub fn create_state<L: AuditLedger, S: OrderStore>(ledger: L, store: S) -> Arc<AppState<L, S>> {
    create_state_with(Catalog::beizlifest(), SubmissionCoordinator::new(ledger, store))
}

/// Creates application state from explicit parts.
pub fn create_state_with<L: AuditLedger, S: OrderStore>(
    catalog: Catalog,
    coordinator: SubmissionCoordinator<L, S>,
) -> Arc<AppState<L, S>> {
    Arc::new(AppState {
        sessions: SessionRegistry::new(),
        catalog,
        coordinator,
    })
}
