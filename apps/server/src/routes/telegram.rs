//! Chat relay: lets the frontend post a message without holding the bot token.
//!
//! The route needs no sign-in, so it only ever writes to the configured shop
//! chat; a `chat_id` in the body is ignored.
//!
//! Answers `{ "ok": true }` or `500 { "error": "..." }`, the shape the
//! frontend's chat helper expects, rather than the usual `ApiError` body.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RelayRequest {
    #[serde(default)]
    pub text: String,
    pub chat_id: Option<String>,
}

pub(super) fn routes() -> Router<AppState> {
    Router::new().route("/telegram", post(relay))
}

async fn relay(State(state): State<AppState>, Json(request): Json<RelayRequest>) -> (StatusCode, Json<Value>) {
    if request.text.trim().is_empty() {
        return (StatusCode::BAD_REQUEST, Json(json!({"error": "text is required"})));
    }

    if let Some(requested) = request.chat_id.as_deref() {
        debug!(requested, "Ignoring chat_id from relay request");
    }

    match state.notifier.relay(&request.text).await {
        Ok(()) => {
            info!(chars = request.text.chars().count(), "Message relayed");
            (StatusCode::OK, Json(json!({"ok": true})))
        }
        Err(e) => {
            warn!(error = %e, "Relay failed");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"error": e.to_string()})))
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::notify::tests::{dispatcher_with, Inbox};
    use crate::notify::NotificationDispatcher;
    use crate::routes::tests::send;
    use crate::test_support::test_state_with;

    #[tokio::test]
    async fn test_relay_forwards_to_shop_chat_only() {
        let inbox = Inbox::default();
        let state = test_state_with(dispatcher_with(inbox.clone()).await).await;

        let (status, body) = send(
            &state,
            Method::POST,
            "/api/telegram",
            None,
            Some(json!({"text": "<b>hi</b>", "chat_id": "-42"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"ok": true}));
        let sent = inbox.messages.lock().await;
        assert_eq!(sent[0]["chat_id"], "-100");
        assert_eq!(sent[0]["parse_mode"], "HTML");
    }

    #[tokio::test]
    async fn test_relay_errors() {
        let state = test_state_with(NotificationDispatcher::disabled()).await;
        let (status, body) = send(&state, Method::POST, "/api/telegram", None, Some(json!({"text": "hi"}))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains("bot token"));

        let inbox = Inbox {
            fail: true,
            ..Inbox::default()
        };
        let state = test_state_with(dispatcher_with(inbox).await).await;
        let (status, body) = send(&state, Method::POST, "/api/telegram", None, Some(json!({"text": "hi"}))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains("chat not found"));

        let (status, _) = send(&state, Method::POST, "/api/telegram", None, Some(json!({"text": "  "}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
