//! Shared fixtures for the server's unit tests.

use std::sync::OnceLock;

use vape_core::{Flavor, ProductDraft, ProductKind, Role};
use vape_db::{Database, DbConfig};

use crate::auth::tests::entry;
use crate::config::{ServerConfig, UserEntry};
use crate::notify::NotificationDispatcher;
use crate::state::AppState;

pub(crate) const ADMIN_EMAIL: &str = "owner@shop.ua";
pub(crate) const SELLER_EMAIL: &str = "seller@shop.ua";
pub(crate) const PASSWORD: &str = "correct horse";

/// Argon2 is slow in debug builds; hash the allow-list once per test binary.
fn users() -> Vec<UserEntry> {
    static USERS: OnceLock<Vec<UserEntry>> = OnceLock::new();
    USERS
        .get_or_init(|| {
            vec![
                entry(ADMIN_EMAIL, PASSWORD, Role::Admin),
                entry(SELLER_EMAIL, PASSWORD, Role::Seller),
            ]
        })
        .clone()
}

/// An in-memory shop with one admin and one seller.
pub(crate) async fn test_state_with(notifier: NotificationDispatcher) -> AppState {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();

    let mut config = ServerConfig::default();
    config.auth.jwt_secret = "test-secret-0123456789".to_string();
    config.auth.users = users();
    config.inventory.visibility_attempts = 2;
    config.inventory.visibility_delay_ms = 1;
    config.images.dir = std::env::temp_dir().join(format!("vape-images-{}", uuid::Uuid::new_v4()));

    AppState::new(db, config, notifier)
}

pub(crate) fn liquid_draft(brand: &str, sale_hryvnias: i64, flavors: &[(&str, i64)]) -> ProductDraft {
    ProductDraft {
        kind: Some(ProductKind::Liquids),
        brand: brand.to_string(),
        purchase_price_kopecks: Some(sale_hryvnias * 50),
        sale_price_kopecks: Some(sale_hryvnias * 100),
        seller_amount_kopecks: Some(sale_hryvnias * 10),
        image_url: Some("/images/products/1-elf.jpg".to_string()),
        volume_ml: Some(30),
        quantity: None,
        flavors: flavors.iter().map(|(n, q)| Flavor::new(*n, *q)).collect(),
    }
}

pub(crate) fn unit_draft(kind: ProductKind, brand: &str, sale_hryvnias: i64, qty: i64) -> ProductDraft {
    ProductDraft {
        kind: Some(kind),
        brand: brand.to_string(),
        purchase_price_kopecks: Some(sale_hryvnias * 50),
        sale_price_kopecks: Some(sale_hryvnias * 100),
        seller_amount_kopecks: Some(sale_hryvnias * 10),
        image_url: Some("/images/products/2-xros.jpg".to_string()),
        volume_ml: None,
        quantity: Some(qty),
        flavors: Vec::new(),
    }
}
