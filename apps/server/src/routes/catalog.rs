//! The seller's picker: kind, then brand, then flavor or unit.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use vape_core::inventory::group_by_brand;
use vape_core::{BrandGroup, Product, ProductKind};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KindEntry {
    pub kind: ProductKind,
    /// Brands with at least one unit on the shelf.
    pub brand_count: usize,
}

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/catalog", get(list_kinds))
        .route("/catalog/{kind}", get(list_brands))
        .route("/products/{id}", get(get_product))
}

async fn list_kinds(_user: AuthUser, State(state): State<AppState>) -> ApiResult<Json<Vec<KindEntry>>> {
    let products = state.db.products().list(None).await?;

    let kinds = ProductKind::ALL
        .iter()
        .map(|&kind| KindEntry {
            kind,
            brand_count: group_by_brand(&products, kind).len(),
        })
        .collect();
    Ok(Json(kinds))
}

async fn list_brands(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> ApiResult<Json<Vec<BrandGroup>>> {
    let kind: ProductKind = kind.parse()?;
    let products = state.db.products().list(Some(kind)).await?;
    Ok(Json(group_by_brand(&products, kind)))
}

async fn get_product(_user: AuthUser, State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Product>> {
    state
        .db
        .products()
        .get_by_id(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Product", &id))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};

    use vape_core::{ProductKind, Role};

    use crate::notify::NotificationDispatcher;
    use crate::routes::tests::{send, token_for};
    use crate::services::receive_arrival;
    use crate::test_support::{liquid_draft, test_state_with, unit_draft};

    #[tokio::test]
    async fn test_brands_hide_sold_out_stock() {
        let state = test_state_with(NotificationDispatcher::disabled()).await;
        let token = token_for(&state, Role::Seller);
        receive_arrival(&state, &liquid_draft("Elf", 100, &[("Mint", 2)])).await.unwrap();
        receive_arrival(&state, &unit_draft(ProductKind::Cartridges, "XROS", 150, 0))
            .await
            .unwrap();

        let (status, kinds) = send(&state, Method::GET, "/api/catalog", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(kinds[0]["kind"], "liquids");
        assert_eq!(kinds[0]["brandCount"], 1);
        assert_eq!(kinds[1]["brandCount"], 0);

        let (_, brands) = send(&state, Method::GET, "/api/catalog/liquids", Some(&token), None).await;
        assert_eq!(brands[0]["brand"], "Elf");
        assert_eq!(brands[0]["products"][0]["flavors"][0]["name"], "Mint");

        let (status, body) = send(&state, Method::GET, "/api/catalog/pods", Some(&token), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_get_product_not_found() {
        let state = test_state_with(NotificationDispatcher::disabled()).await;
        let token = token_for(&state, Role::Seller);

        let (status, body) = send(&state, Method::GET, "/api/products/missing", Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");
    }
}
