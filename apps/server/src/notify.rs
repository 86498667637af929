//! # Notification Dispatcher
//!
//! Sends formatted reports to the shop's chat after a write has committed.
//!
//! ## Delivery Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  dispatch([m1, m2, m3])                                                 │
//! │    │                                                                    │
//! │    ├── disabled (no token or chat id) ──► debug! each message, return   │
//! │    │                                                                    │
//! │    └── for m in messages (in order, one at a time)                      │
//! │          send_message(chat_id, m)                                       │
//! │          └── error ──► warn! and continue                               │
//! │                                                                         │
//! │  No retries. A failed delivery never undoes the committed write.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::{debug, warn};

use crate::config::TelegramConfig;
use crate::telegram::{TelegramClient, TelegramError};

#[derive(Debug, Clone, Default)]
pub struct NotificationDispatcher {
    client: Option<TelegramClient>,
    chat_id: Option<String>,
}

impl NotificationDispatcher {
    pub fn new(client: Option<TelegramClient>, chat_id: Option<String>) -> Self {
        let chat_id = chat_id.map(|id| id.trim().to_string()).filter(|id| !id.is_empty());
        NotificationDispatcher { client, chat_id }
    }

    pub fn from_config(config: &TelegramConfig) -> Result<Self, TelegramError> {
        Ok(Self::new(TelegramClient::from_config(config)?, config.chat_id.clone()))
    }

    /// A dispatcher that only logs.
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.client.is_some() && self.chat_id.is_some()
    }

    /// Sends the messages in order; failures are logged and swallowed.
    pub async fn dispatch(&self, messages: &[String]) {
        let (Some(client), Some(chat_id)) = (&self.client, &self.chat_id) else {
            for message in messages {
                debug!(message = %message, "Notifications disabled, message not sent");
            }
            return;
        };

        for (index, message) in messages.iter().enumerate() {
            if let Err(e) = client.send_message(chat_id, message).await {
                warn!(error = %e, index, total = messages.len(), "Failed to deliver notification");
            }
        }
    }

    /// Forwards one message to the shop chat, reporting delivery errors.
    pub async fn relay(&self, text: &str) -> Result<(), TelegramError> {
        let client = self.client.as_ref().ok_or(TelegramError::NotConfigured("bot token"))?;
        let chat_id = self.chat_id.as_deref().ok_or(TelegramError::NotConfigured("chat id"))?;

        client.send_message(chat_id, text).await
    }
}
