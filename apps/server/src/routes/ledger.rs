//! # Ledger Routes
//!
//! Writes to the ledger plus the full sales listing.
//!
//! A missing or blank `timestamp` means "now" on the server's clock. Every
//! line of one order shares that timestamp.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ApiResult;
use crate::state::AppState;
use gustanto_core::{resolve_timestamp, NewExpense, NewOrder, NewSale, OrderLine, Sale};

// =============================================================================
// Request / Response Types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct OrderRequest {
    pub order: Vec<OrderLine>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ExpenseRequest {
    pub amount: i64,
    pub description: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SaleRequest {
    pub item: String,
    pub price: i64,
    #[serde(default)]
    pub timestamp: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub status: &'static str,
    pub id: i64,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/order", post(record_order))
        .route("/expense", post(record_expense))
        .route("/sales", post(record_sale).get(list_sales))
}

// =============================================================================
// Handlers
// =============================================================================

/// `POST /order`: all lines are written or none.
async fn record_order(
    State(state): State<AppState>,
    payload: Result<Json<OrderRequest>, JsonRejection>,
) -> ApiResult<Json<StatusResponse>> {
    let Json(request) = payload?;
    debug!(lines = request.order.len(), "record_order");

    let timestamp = resolve_timestamp(request.timestamp.as_deref(), state.now());
    let order = NewOrder::new(&request.order, &timestamp)?;

    let ids = state.db.sales().record_order(&order).await?;
    info!(lines = ids.len(), total = %order.total(), timestamp = %order.timestamp(), "Order recorded");

    Ok(Json(StatusResponse { status: "success" }))
}

/// `POST /expense`
async fn record_expense(
    State(state): State<AppState>,
    payload: Result<Json<ExpenseRequest>, JsonRejection>,
) -> ApiResult<Json<StatusResponse>> {
    let Json(request) = payload?;

    let timestamp = resolve_timestamp(request.timestamp.as_deref(), state.now());
    let expense = NewExpense::new(request.amount, &request.description, &timestamp)?;

    let id = state.db.expenses().insert(&expense).await?;
    info!(id, amount = %expense.amount(), "Expense recorded");

    Ok(Json(StatusResponse {
        status: "expense saved",
    }))
}

/// `POST /sales`: one row, no order wrapper.
async fn record_sale(
    State(state): State<AppState>,
    payload: Result<Json<SaleRequest>, JsonRejection>,
) -> ApiResult<Json<CreatedResponse>> {
    let Json(request) = payload?;

    let timestamp = resolve_timestamp(request.timestamp.as_deref(), state.now());
    let sale = NewSale::new(&request.item, request.price, &timestamp)?;

    let id = state.db.sales().insert(&sale).await?;
    info!(id, item = %sale.item(), price = %sale.price(), "Sale recorded");

    Ok(Json(CreatedResponse {
        status: "success",
        id,
    }))
}

/// `GET /sales`: newest first.
async fn list_sales(State(state): State<AppState>) -> ApiResult<Json<Vec<Sale>>> {
    let sales = state.db.sales().list_all().await?;
    debug!(count = sales.len(), "list_sales");
    Ok(Json(sales))
}
