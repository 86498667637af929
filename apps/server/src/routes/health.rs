use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    database: bool,
    notifications: bool,
    version: &'static str,
}

pub(super) fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

/// Liveness plus a database round trip; 503 when the database is down.
async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let database = state.db.health_check().await;
    let status = if database { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };

    (
        status,
        Json(HealthResponse {
            status: if database { "ok" } else { "degraded" },
            database,
            notifications: state.notifier.is_enabled(),
            version: env!("CARGO_PKG_VERSION"),
        }),
    )
}
