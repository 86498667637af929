//! # Admin Routes
//!
//! Every handler takes [`AdminUser`], so a seller token gets 403 before any
//! work is done.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Route                          Service                 Chat report    │
//! │  ─────                          ───────                 ───────────    │
//! │  POST   /arrivals               receive_arrival         yes            │
//! │  POST   /discard                discard                 yes            │
//! │  PUT    /ledger                 edit_ledger             yes            │
//! │  PUT    /products/{id}          edit_product            no             │
//! │  DELETE /products/{id}          delete_product          no             │
//! │  POST   /cleanup                cleanup                 no             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use tracing::info;

use vape_core::{CleanupReport, DailySales, DepletionMarker, Ledger, LedgerPatch, Product, ProductDraft, ProductKind};

use crate::auth::AdminUser;
use crate::error::ApiResult;
use crate::images::StoredImage;
use crate::services::{self, ArrivalResponse, DiscardResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ProductsQuery {
    pub kind: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscardRequest {
    pub product_id: String,
    pub flavor: Option<String>,
}

/// Absolute balances plus an optional label for the chat report.
#[derive(Debug, Deserialize)]
pub struct LedgerEditRequest {
    #[serde(flatten)]
    pub patch: LedgerPatch,
    pub operation: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    #[serde(default)]
    pub filename: String,
}

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products))
        .route("/products/{id}", put(edit_product).delete(delete_product))
        .route("/arrivals", post(receive_arrival))
        .route("/discard", post(discard))
        .route("/ledger", put(edit_ledger))
        .route("/stats", get(daily_stats))
        .route("/cleanup", post(cleanup))
        .route("/depletions", get(list_depletions))
        .route("/depletions/{id}", delete(clear_depletion))
        .route("/images", post(upload_image))
}

async fn list_products(
    _admin: AdminUser,
    State(state): State<AppState>,
    Query(query): Query<ProductsQuery>,
) -> ApiResult<Json<Vec<Product>>> {
    let kind = match query.kind.as_deref().filter(|k| !k.is_empty()) {
        Some(kind) => Some(kind.parse::<ProductKind>()?),
        None => None,
    };
    Ok(Json(state.db.products().list(kind).await?))
}

async fn receive_arrival(
    _admin: AdminUser,
    State(state): State<AppState>,
    Json(draft): Json<ProductDraft>,
) -> ApiResult<Json<ArrivalResponse>> {
    Ok(Json(services::receive_arrival(&state, &draft).await?))
}

async fn edit_product(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(draft): Json<ProductDraft>,
) -> ApiResult<Json<Product>> {
    Ok(Json(services::edit_product(&state, &id, &draft).await?))
}

async fn delete_product(
    admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Ledger>> {
    let ledger = services::delete_product(&state, &id).await?;
    info!(product_id = %id, by = %admin.0.sub, "Product deleted by admin");
    Ok(Json(ledger))
}

async fn discard(
    _admin: AdminUser,
    State(state): State<AppState>,
    Json(request): Json<DiscardRequest>,
) -> ApiResult<Json<DiscardResponse>> {
    let response = services::discard(&state, &request.product_id, request.flavor.as_deref()).await?;
    Ok(Json(response))
}

async fn edit_ledger(
    _admin: AdminUser,
    State(state): State<AppState>,
    Json(request): Json<LedgerEditRequest>,
) -> ApiResult<Json<Ledger>> {
    let ledger = services::edit_ledger(&state, &request.patch, request.operation.as_deref()).await?;
    Ok(Json(ledger))
}

async fn daily_stats(_admin: AdminUser, State(state): State<AppState>) -> ApiResult<Json<Vec<DailySales>>> {
    Ok(Json(state.db.daily_sales().list().await?))
}

async fn cleanup(_admin: AdminUser, State(state): State<AppState>) -> ApiResult<Json<CleanupReport>> {
    Ok(Json(services::cleanup(&state).await?))
}

async fn list_depletions(_admin: AdminUser, State(state): State<AppState>) -> ApiResult<Json<Vec<DepletionMarker>>> {
    Ok(Json(state.db.depletions().list().await?))
}

/// Forgets a marker so the item is announced again next time it runs out.
async fn clear_depletion(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<DepletionMarker>>> {
    state.db.depletions().clear(&id).await?;
    Ok(Json(state.db.depletions().list().await?))
}

/// Raw body upload; the name only seeds the stored key.
async fn upload_image(
    _admin: AdminUser,
    State(state): State<AppState>,
    Query(query): Query<UploadQuery>,
    body: Bytes,
) -> ApiResult<Json<StoredImage>> {
    Ok(Json(state.images.save(&query.filename, &body).await?))
}
