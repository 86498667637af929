use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::info;

use vape_core::Role;

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub email: String,
    pub role: Role,
    /// Seconds until the token expires.
    pub expires_in: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub email: String,
    pub role: Role,
    pub expires_at: i64,
}

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/me", get(me))
}

async fn login(State(state): State<AppState>, Json(request): Json<LoginRequest>) -> ApiResult<Json<LoginResponse>> {
    let email = state
        .users
        .authenticate(&request.email, &request.password, request.role)?;
    let token = state.jwt.issue(&email, request.role)?;

    info!(email = %email, role = %request.role, "Signed in");
    Ok(Json(LoginResponse {
        token,
        email,
        role: request.role,
        expires_in: state.jwt.lifetime_secs(),
    }))
}

async fn me(user: AuthUser) -> Json<MeResponse> {
    Json(MeResponse {
        email: user.0.sub,
        role: user.0.role,
        expires_at: user.0.exp,
    })
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::notify::NotificationDispatcher;
    use crate::routes::tests::send;
    use crate::test_support::{test_state_with, ADMIN_EMAIL, PASSWORD, SELLER_EMAIL};

    #[tokio::test]
    async fn test_login_and_me() {
        let state = test_state_with(NotificationDispatcher::disabled()).await;

        let (status, body) = send(
            &state,
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": "Seller@Shop.ua", "password": PASSWORD, "role": "seller"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["email"], SELLER_EMAIL);
        assert_eq!(body["expiresIn"], 43_200);

        let token = body["token"].as_str().unwrap().to_string();
        let (status, me) = send(&state, Method::GET, "/api/auth/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(me["role"], "seller");
    }

    #[tokio::test]
    async fn test_login_rejections() {
        let state = test_state_with(NotificationDispatcher::disabled()).await;

        let (status, body) = send(
            &state,
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": ADMIN_EMAIL, "password": "wrong", "role": "admin"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "UNAUTHORIZED");

        let (status, _) = send(
            &state,
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": SELLER_EMAIL, "password": PASSWORD, "role": "admin"})),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = send(&state, Method::GET, "/api/auth/me", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
