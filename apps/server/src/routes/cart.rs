//! # Cart Routes
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐     ┌──────────┐       │
//! │  │  Empty   │────►│ In Cart  │────►│ Payment  │────►│   Sale   │       │
//! │  │  Cart    │     │          │     │  choice  │     │ recorded │       │
//! │  └──────────┘     └──────────┘     └──────────┘     └──────────┘       │
//! │                        │                                 │              │
//! │                POST/PUT/DELETE /items           POST /checkout          │
//! │                        │                                 │              │
//! │                        ▼                                 ▼              │
//! │                   DELETE /cart ───────────────► (back to empty)         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each signed-in seller has one cart, keyed by the email in the token.

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::debug;

use vape_core::{Cart, CartLine, CartTotals, CheckoutSummary, PaymentRequest};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::services;
use crate::state::AppState;

/// Cart response including lines and totals.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub lines: Vec<CartLine>,
    pub totals: CartTotals,
}

impl From<&Cart> for CartResponse {
    fn from(cart: &Cart) -> Self {
        CartResponse {
            lines: cart.lines.clone(),
            totals: CartTotals::from(cart),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    pub product_id: String,
    pub flavor: Option<String>,
    pub quantity: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemRequest {
    pub product_id: String,
    pub flavor: Option<String>,
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveItemRequest {
    pub product_id: String,
    pub flavor: Option<String>,
}

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_cart).delete(clear_cart))
        .route("/items", post(add_item).put(update_item).delete(remove_item))
        .route("/checkout", post(checkout))
}

async fn get_cart(user: AuthUser, State(state): State<AppState>) -> Json<CartResponse> {
    let cart = state.carts.lock(user.email()).await;
    Json(CartResponse::from(&*cart))
}

/// Adds units at today's price; stock is checked now and again at checkout.
async fn add_item(
    user: AuthUser,
    State(state): State<AppState>,
    Json(request): Json<AddItemRequest>,
) -> ApiResult<Json<CartResponse>> {
    let quantity = request.quantity.unwrap_or(1);
    debug!(product_id = %request.product_id, flavor = ?request.flavor, quantity, "add_item");

    let product = state
        .db
        .products()
        .get_by_id(&request.product_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", &request.product_id))?;

    let mut cart = state.carts.lock(user.email()).await;
    cart.add_item(&product, request.flavor.as_deref(), quantity)?;
    Ok(Json(CartResponse::from(&*cart)))
}

async fn update_item(
    user: AuthUser,
    State(state): State<AppState>,
    Json(request): Json<UpdateItemRequest>,
) -> ApiResult<Json<CartResponse>> {
    let mut cart = state.carts.lock(user.email()).await;
    cart.update_quantity(&request.product_id, request.flavor.as_deref(), request.quantity)?;
    Ok(Json(CartResponse::from(&*cart)))
}

async fn remove_item(
    user: AuthUser,
    State(state): State<AppState>,
    Json(request): Json<RemoveItemRequest>,
) -> ApiResult<Json<CartResponse>> {
    let mut cart = state.carts.lock(user.email()).await;
    cart.remove_item(&request.product_id, request.flavor.as_deref())?;
    Ok(Json(CartResponse::from(&*cart)))
}

async fn clear_cart(user: AuthUser, State(state): State<AppState>) -> Json<CartResponse> {
    let mut cart = state.carts.lock(user.email()).await;
    cart.clear();
    Json(CartResponse::from(&*cart))
}

async fn checkout(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payment): Json<PaymentRequest>,
) -> ApiResult<Json<CheckoutSummary>> {
    let summary = services::checkout(&state, user.email(), &payment).await?;
    Ok(Json(summary))
}
