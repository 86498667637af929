//! # Vape POS Server
//!
//! HTTP API for the shop's sellers and owner, plus the Telegram reports that
//! follow every stock or money change.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          vape-server                                    │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────────┐│
//! │  │  routes        │  │  services      │  │  notify / telegram         ││
//! │  │                │  │                │  │                            ││
//! │  │ • auth         │─►│ • checkout     │─►│ • NotificationDispatcher   ││
//! │  │ • catalog/cart │  │ • arrivals     │  │ • TelegramClient           ││
//! │  │ • admin        │  │ • ledger flow  │  │   (sendMessage, HTML)      ││
//! │  └────────────────┘  └───────┬────────┘  └────────────────────────────┘│
//! │                              │                                          │
//! │  ┌───────────────────────────▼──────────────────────────────────────┐  │
//! │  │  AppState: Database (vape-db) • carts • JwtManager • ImageStore  │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! See [`config::ServerConfig`]. Secrets (JWT secret, bot token, chat id) come
//! from the config file or the environment, never from source.

pub mod auth;
pub mod config;
pub mod error;
pub mod images;
pub mod notify;
pub mod routes;
pub mod services;
pub mod state;
pub mod telegram;

#[cfg(test)]
mod test_support;

// Re-exports
pub use config::ServerConfig;
pub use error::{ApiError, ApiResult};
pub use notify::NotificationDispatcher;
pub use routes::build_router;
pub use state::AppState;
