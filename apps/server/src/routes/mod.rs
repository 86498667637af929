//! # HTTP Routes
//!
//! ## Route Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  /health                       public                                   │
//! │  /images/...                   public, static files                     │
//! │                                                                         │
//! │  /api/auth/login               public                                   │
//! │  /api/telegram                 public relay                             │
//! │  /api/auth/me                  AuthUser                                 │
//! │  /api/catalog, /api/products   AuthUser                                 │
//! │  /api/cart/...                 AuthUser  (cart keyed by email)          │
//! │  /api/sales[/{id}], /api/ledger AuthUser                                │
//! │  /api/admin/...                AdminUser                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Role checks live in the `AuthUser` / `AdminUser` extractors, so every
//! handler states its requirement in its signature.

use axum::extract::DefaultBodyLimit;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

mod admin;
mod auth;
mod cart;
mod catalog;
mod health;
mod sales;
mod telegram;

/// Builds the full application router.
pub fn build_router(state: AppState) -> Router {
    let images = ServeDir::new(state.images.dir());
    let body_limit = state.config.images.max_upload_bytes;

    let api = Router::new()
        .nest("/auth", auth::routes())
        .nest("/cart", cart::routes())
        .nest("/admin", admin::routes())
        .merge(catalog::routes())
        .merge(sales::routes())
        .merge(telegram::routes());

    Router::new()
        .merge(health::routes())
        .nest("/api", api)
        .nest_service("/images", images)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use axum::Router;
    use serde_json::Value;
    use tower::ServiceExt;

    use vape_core::Role;

    use crate::state::AppState;
    use crate::test_support::{ADMIN_EMAIL, SELLER_EMAIL};

    pub(crate) fn token_for(state: &AppState, role: Role) -> String {
        let email = match role {
            Role::Admin => ADMIN_EMAIL,
            Role::Seller => SELLER_EMAIL,
        };
        state.jwt.issue(email, role).unwrap()
    }

    /// Sends one request through a fresh router and returns status and JSON body.
    pub(crate) async fn send(
        state: &AppState,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let app: Router = super::build_router(state.clone());
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }
}
