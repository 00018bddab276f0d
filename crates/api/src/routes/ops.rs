//! Health and Prometheus metrics endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use ledger::AuditLedger;
use metrics_exporter_prometheus::PrometheusHandle;
use order_store::OrderStore;
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub open_sessions: usize,
}

/// GET /health: liveness plus the number of open sessions.
pub async fn health<L: AuditLedger + 'static, S: OrderStore + 'static>(
    State(state): State<Arc<AppState<L, S>>>,
) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        open_sessions: state.sessions.len().await,
    })
}

/// GET /metrics: returns Prometheus-formatted metrics.
pub async fn metrics(State(handle): State<PrometheusHandle>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        handle.render(),
    )
}
