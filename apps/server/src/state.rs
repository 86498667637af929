//! # Application State
//!
//! Everything handlers share, cloned into each request by axum.
//!
//! ## Cart Ownership
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CartStore                                                              │
//! │  Mutex<HashMap<email, Arc<Mutex<Cart>>>>                                │
//! │     │                                                                   │
//! │     ├── "seller@shop.ua" ──► Mutex<Cart>   (held through checkout)      │
//! │     └── "owner@shop.ua"  ──► Mutex<Cart>                                │
//! │                                                                         │
//! │  The outer lock is only held to find or create a seller's cart, so one  │
//! │  seller's checkout never blocks another seller's cart.                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

use vape_core::Cart;
use vape_db::Database;

use crate::auth::{JwtManager, UserDirectory};
use crate::config::ServerConfig;
use crate::images::ImageStore;
use crate::notify::NotificationDispatcher;

/// In-memory carts keyed by seller email.
#[derive(Debug, Clone, Default)]
pub struct CartStore {
    carts: Arc<Mutex<HashMap<String, Arc<Mutex<Cart>>>>>,
}

impl CartStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks the cart of `email`, creating an empty one on first use.
    pub async fn lock(&self, email: &str) -> OwnedMutexGuard<Cart> {
        let cart = {
            let mut carts = self.carts.lock().await;
            carts
                .entry(email.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(Cart::new())))
                .clone()
        };
        cart.lock_owned().await
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<ServerConfig>,
    pub jwt: Arc<JwtManager>,
    pub users: Arc<UserDirectory>,
    pub carts: CartStore,
    pub notifier: NotificationDispatcher,
    pub images: ImageStore,
}

impl AppState {
    pub fn new(db: Database, config: ServerConfig, notifier: NotificationDispatcher) -> Self {
        let jwt = JwtManager::new(&config.auth.jwt_secret, config.auth.token_lifetime_secs);
        let users = UserDirectory::new(&config.auth.users);
        let images = ImageStore::from_config(&config.images);

        AppState {
            db,
            jwt: Arc::new(jwt),
            users: Arc::new(users),
            carts: CartStore::new(),
            notifier,
            images,
            config: Arc::new(config),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use vape_core::{Product, ProductKind};

    fn cartridge(id: &str, quantity: i64) -> Product {
        Product {
            id: id.to_string(),
            kind: ProductKind::Cartridges,
            brand: "XROS".to_string(),
            purchase_price_kopecks: 5_000,
            sale_price_kopecks: 10_000,
            seller_amount_kopecks: 1_000,
            image_url: "/images/xros.jpg".to_string(),
            volume_ml: None,
            quantity: Some(quantity),
            flavors: Vec::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_carts_are_per_seller() {
        let store = CartStore::new();
        let product = cartridge("p1", 5);

        store.lock("a@shop.ua").await.add_item(&product, None, 2).unwrap();

        assert_eq!(store.lock("a@shop.ua").await.lines.len(), 1);
        assert!(store.lock("b@shop.ua").await.is_empty());
    }
}
