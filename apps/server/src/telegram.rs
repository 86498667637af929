//! Telegram Bot API client.
//!
//! Only `sendMessage` is needed: every message is HTML-formatted text posted
//! to one chat.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::TelegramConfig;

#[derive(Debug, thiserror::Error)]
pub enum TelegramError {
    /// Bot token or chat id is missing.
    #[error("Telegram {0} is not configured")]
    NotConfigured(&'static str),

    #[error("Telegram request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The Bot API answered with an error.
    #[error("Telegram API error {status}: {description}")]
    Api { status: u16, description: String },
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
}

#[derive(Debug, Deserialize)]
struct ApiReply {
    #[serde(default)]
    description: Option<String>,
}

/// Client bound to one bot token.
#[derive(Debug, Clone)]
pub struct TelegramClient {
    http: reqwest::Client,
    api_base: String,
    token: String,
}

impl TelegramClient {
    pub fn new(api_base: &str, token: &str, timeout: Duration) -> Result<Self, TelegramError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(TelegramClient {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    /// Builds a client when a bot token is configured.
    pub fn from_config(config: &TelegramConfig) -> Result<Option<Self>, TelegramError> {
        match config.bot_token.as_deref().map(str::trim) {
            Some(token) if !token.is_empty() => Ok(Some(Self::new(
                &config.api_base,
                token,
                Duration::from_secs(config.timeout_secs),
            )?)),
            _ => Ok(None),
        }
    }

    /// Posts `text` to `chat_id` with HTML parse mode.
    pub async fn send_message(&self, chat_id: &str, text: &str) -> Result<(), TelegramError> {
        let url = format!("{}/bot{}/sendMessage", self.api_base, self.token);
        let body = SendMessage {
            chat_id,
            text,
            parse_mode: "HTML",
        };

        let response = self.http.post(&url).json(&body).send().await?;
        let status = response.status();
        if status.is_success() {
            debug!(chat_id = %chat_id, chars = text.chars().count(), "Telegram message sent");
            return Ok(());
        }

        let description = response
            .json::<ApiReply>()
            .await
            .ok()
            .and_then(|reply| reply.description)
            .unwrap_or_else(|| status.to_string());

        Err(TelegramError::Api {
            status: status.as_u16(),
            description,
        })
    }
}
