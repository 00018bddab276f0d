//! Catalog endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use domain::Category;
use ledger::AuditLedger;
use order_store::OrderStore;
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct CatalogResponse {
    pub categories: Vec<Category>,
}

/// GET /catalog: categories and products in display order.
pub async fn list<L: AuditLedger + 'static, S: OrderStore + 'static>(
    State(state): State<Arc<AppState<L, S>>>,
) -> Json<CatalogResponse> {
    Json(CatalogResponse {
        categories: state.catalog.categories().to_vec(),
    })
}
