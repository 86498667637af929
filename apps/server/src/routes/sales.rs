use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use vape_core::{Ledger, Sale};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

const DEFAULT_HISTORY_LIMIT: u32 = 20;
const MAX_HISTORY_LIMIT: u32 = 200;

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<u32>,
}

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/sales", get(list_sales))
        .route("/sales/{id}", get(get_sale))
        .route("/ledger", get(get_ledger))
}

/// Most recent sales first, with their items.
async fn list_sales(
    _user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<Json<Vec<Sale>>> {
    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT).clamp(1, MAX_HISTORY_LIMIT);
    Ok(Json(state.db.sales().list_recent(limit).await?))
}

async fn get_sale(_user: AuthUser, State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Sale>> {
    state
        .db
        .sales()
        .get_by_id(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Sale", &id))
}

async fn get_ledger(_user: AuthUser, State(state): State<AppState>) -> ApiResult<Json<Ledger>> {
    Ok(Json(state.db.ledger().get().await?))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};

    use vape_core::{PaymentRequest, ProductKind, Role};

    use crate::notify::NotificationDispatcher;
    use crate::routes::tests::{send, token_for};
    use crate::services::{checkout, receive_arrival};
    use crate::test_support::{test_state_with, unit_draft, SELLER_EMAIL};

    #[tokio::test]
    async fn test_history_and_ledger() {
        let state = test_state_with(NotificationDispatcher::disabled()).await;
        let token = token_for(&state, Role::Seller);
        let xros = receive_arrival(&state, &unit_draft(ProductKind::Cartridges, "XROS", 150, 3))
            .await
            .unwrap()
            .product;

        for _ in 0..2 {
            state.carts.lock(SELLER_EMAIL).await.add_item(&xros, None, 1).unwrap();
            checkout(&state, SELLER_EMAIL, &PaymentRequest::card()).await.unwrap();
        }

        let (status, sales) = send(&state, Method::GET, "/api/sales?limit=1", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(sales.as_array().unwrap().len(), 1);
        assert_eq!(sales[0]["sellerEmail"], SELLER_EMAIL);
        assert_eq!(sales[0]["items"][0]["label"], "XROS");

        let (_, ledger) = send(&state, Method::GET, "/api/ledger", Some(&token), None).await;
        assert_eq!(ledger["card"], 30_000);
        assert_eq!(ledger["total"], 15_000);
    }

    #[tokio::test]
    async fn test_single_sale_lookup() {
        let state = test_state_with(NotificationDispatcher::disabled()).await;
        let token = token_for(&state, Role::Seller);
        let xros = receive_arrival(&state, &unit_draft(ProductKind::Cartridges, "XROS", 150, 2))
            .await
            .unwrap()
            .product;

        state.carts.lock(SELLER_EMAIL).await.add_item(&xros, None, 2).unwrap();
        let summary = checkout(&state, SELLER_EMAIL, &PaymentRequest::cash()).await.unwrap();

        let uri = format!("/api/sales/{}", summary.sale.id);
        let (status, sale) = send(&state, Method::GET, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(sale["id"], summary.sale.id.to_string());
        assert_eq!(sale["items"].as_array().unwrap().len(), summary.sale.items.len());

        let (status, body) = send(&state, Method::GET, "/api/sales/missing", Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");

        let (status, _) = send(&state, Method::GET, &uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
