//! Session and cart endpoints used by the POS front end.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::SessionId;
use domain::{LineItem, OrderCart};
use ledger::AuditLedger;
use order_store::OrderStore;
use serde::{Deserialize, Serialize};
use submission::SubmissionOutcome;

use crate::AppState;
use crate::error::ApiError;
use crate::session::SharedCart;

// -- Request types --

#[derive(Deserialize)]
pub struct AddItemRequest {
    pub category: String,
    pub product: String,
}

// -- Response types --

#[derive(Serialize)]
pub struct SessionCreatedResponse {
    pub session_id: String,
}

#[derive(Serialize)]
pub struct CartLineResponse {
    pub category: String,
    pub product: String,
    pub quantity: u32,
    pub unit_price: i64,
    pub total_price: i64,
}

impl From<&LineItem> for CartLineResponse {
    fn from(line: &LineItem) -> Self {
        Self {
            category: line.category.clone(),
            product: line.product.clone(),
            quantity: line.quantity,
            unit_price: line.unit_price.amount(),
            total_price: line.total_price().amount(),
        }
    }
}

#[derive(Serialize)]
pub struct CartResponse {
    pub lines: Vec<CartLineResponse>,
    pub item_count: u32,
    pub total: i64,
}

impl From<&OrderCart> for CartResponse {
    fn from(cart: &OrderCart) -> Self {
        Self {
            lines: cart.iter().map(CartLineResponse::from).collect(),
            item_count: cart.total_quantity(),
            total: cart.total().amount(),
        }
    }
}

#[derive(Serialize)]
pub struct SubmitResponse {
    pub status: &'static str,
    pub order_number: Option<String>,
    pub timestamp: Option<String>,
    pub lines_written: Option<usize>,
    pub error: Option<String>,
    /// Present when the audit ledger could not be written.
    pub ledger_warning: Option<String>,
    pub cart: CartResponse,
}

impl SubmitResponse {
    fn new(outcome: &SubmissionOutcome, cart: &OrderCart) -> Self {
        let lines_written = match outcome {
            SubmissionOutcome::Succeeded { lines_written, .. } => Some(*lines_written),
            _ => None,
        };

        Self {
            status: outcome.label(),
            order_number: outcome.order_number().map(ToString::to_string),
            timestamp: outcome.identity().map(|identity| identity.timestamp_iso()),
            lines_written,
            error: outcome.store_error().map(ToString::to_string),
            ledger_warning: outcome.ledger_error().map(ToString::to_string),
            cart: CartResponse::from(cart),
        }
    }
}

// -- Handlers --

/// POST /sessions: open a session with an empty cart.
#[tracing::instrument(skip(state))]
pub async fn open<L: AuditLedger + 'static, S: OrderStore + 'static>(
    State(state): State<Arc<AppState<L, S>>>,
) -> (StatusCode, Json<SessionCreatedResponse>) {
    let session_id = state.sessions.open().await;
    (
        StatusCode::CREATED,
        Json(SessionCreatedResponse {
            session_id: session_id.to_string(),
        }),
    )
}

/// DELETE /sessions/:id: close a session and discard its cart.
#[tracing::instrument(skip(state))]
pub async fn close<L: AuditLedger + 'static, S: OrderStore + 'static>(
    State(state): State<Arc<AppState<L, S>>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let session_id = parse_session_id(&id)?;
    if state.sessions.close(session_id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("Session {id} not found")))
    }
}

/// GET /sessions/:id/cart: current lines and total.
#[tracing::instrument(skip(state))]
pub async fn cart<L: AuditLedger + 'static, S: OrderStore + 'static>(
    State(state): State<Arc<AppState<L, S>>>,
    Path(id): Path<String>,
) -> Result<Json<CartResponse>, ApiError> {
    let cart = session_cart(&state, &id).await?;
    let cart = cart.lock().await;
    Ok(Json(CartResponse::from(&*cart)))
}

/// POST /sessions/:id/items: add one unit of a catalog product.
#[tracing::instrument(skip(state, req), fields(category = %req.category, product = %req.product))]
pub async fn add_item<L: AuditLedger + 'static, S: OrderStore + 'static>(
    State(state): State<Arc<AppState<L, S>>>,
    Path(id): Path<String>,
    Json(req): Json<AddItemRequest>,
) -> Result<Json<CartResponse>, ApiError> {
    let cart = session_cart(&state, &id).await?;
    let price = state.catalog.price_of(&req.category, &req.product)?;

    let mut cart = cart.lock().await;
    cart.add_item(req.category, req.product, price)?;
    metrics::counter!("cart_items_added_total").increment(1);

    Ok(Json(CartResponse::from(&*cart)))
}

/// POST /sessions/:id/reset: empty the cart.
#[tracing::instrument(skip(state))]
pub async fn reset<L: AuditLedger + 'static, S: OrderStore + 'static>(
    State(state): State<Arc<AppState<L, S>>>,
    Path(id): Path<String>,
) -> Result<Json<CartResponse>, ApiError> {
    let cart = session_cart(&state, &id).await?;
    let mut cart = cart.lock().await;
    cart.reset();
    Ok(Json(CartResponse::from(&*cart)))
}

/// POST /sessions/:id/submit: persist the cart as an order.
///
/// Responds 503 when the store did not commit; the cart is then unchanged.
#[tracing::instrument(skip(state))]
pub async fn submit<L: AuditLedger + 'static, S: OrderStore + 'static>(
    State(state): State<Arc<AppState<L, S>>>,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<SubmitResponse>), ApiError> {
    let cart = session_cart(&state, &id).await?;

    // Held for the whole submission so the session has one in flight at most.
    let mut cart = cart.lock().await;
    let outcome = state.coordinator.submit(&mut cart).await;

    let status = match outcome {
        SubmissionOutcome::Failed { .. } => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::OK,
    };
    Ok((status, Json(SubmitResponse::new(&outcome, &cart))))
}

async fn session_cart<L: AuditLedger, S: OrderStore>(
    state: &AppState<L, S>,
    id: &str,
) -> Result<SharedCart, ApiError> {
    let session_id = parse_session_id(id)?;
    state
        .sessions
        .get(session_id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("Session {id} not found")))
}

fn parse_session_id(id: &str) -> Result<SessionId, ApiError> {
    id.parse()
        .map_err(|e| ApiError::BadRequest(format!("Invalid session ID: {e}")))
}
