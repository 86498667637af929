//! Admin inventory operations: arrivals, discards, edits, cleanup.

use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, warn};

use vape_core::validation::{validate_product_draft, DraftMode};
use vape_core::{ArrivalKind, CleanupReport, DepletionMarker, Ledger, Product, ProductDraft, ProductKind};

use crate::error::ApiResult;
use crate::services::ledger::publish_inventory_report;
use crate::state::AppState;

const ARRIVAL_UPDATED: &str = "✅ Товар оновлено!";
const ARRIVAL_ADDED: &str = "✅ Новий товар додано!";
const LEDGER_CREATED: &str = "✅ Новий лог створено";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrivalResponse {
    pub kind: ArrivalKind,
    pub product: Product,
    pub ledger: Ledger,
    /// The operation label the report was sent with.
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscardResponse {
    pub label: String,
    pub remaining: i64,
    pub depleted: Option<DepletionMarker>,
    pub ledger: Ledger,
}

/// Receives stock: merges into an existing liquid or creates a product,
/// then sends the inventory report.
pub async fn receive_arrival(state: &AppState, draft: &ProductDraft) -> ApiResult<ArrivalResponse> {
    let spec = validate_product_draft(draft, DraftMode::Arrival)?;
    let outcome = state.db.products().receive_arrival(&spec).await?;

    wait_until_visible(state, spec.kind, &spec.brand).await?;

    let message = if !state.db.ledger().exists().await? {
        LEDGER_CREATED
    } else {
        match outcome.kind {
            ArrivalKind::Updated => ARRIVAL_UPDATED,
            ArrivalKind::Added => ARRIVAL_ADDED,
        }
    };

    let ledger = publish_inventory_report(state, message, &[]).await?;

    Ok(ArrivalResponse {
        kind: outcome.kind,
        product: outcome.product,
        ledger,
        message: message.to_string(),
    })
}

/// Polls until `brand` is listed among in-stock products of `kind`.
///
/// Returns whether it showed up; the report goes out either way.
async fn wait_until_visible(state: &AppState, kind: ProductKind, brand: &str) -> ApiResult<bool> {
    let attempts = state.config.inventory.visibility_attempts.max(1);
    let delay = Duration::from_millis(state.config.inventory.visibility_delay_ms);

    for attempt in 1..=attempts {
        if state.db.products().brand_visible(kind, brand).await? {
            debug!(brand = %brand, attempt, "Arrival visible");
            return Ok(true);
        }
        if attempt < attempts {
            tokio::time::sleep(delay).await;
        }
    }

    warn!(brand = %brand, kind = %kind, attempts, "Arrival not visible, computing total anyway");
    Ok(false)
}

/// Writes off one unit and sends the inventory report.
pub async fn discard(state: &AppState, product_id: &str, flavor: Option<&str>) -> ApiResult<DiscardResponse> {
    let outcome = state.db.products().discard_one(product_id, flavor).await?;

    let operation = format!("🗑️ Списано 1 од.: {}", outcome.label);
    let depleted: Vec<String> = outcome.newly_depleted.iter().map(|m| m.label.clone()).collect();
    let ledger = publish_inventory_report(state, &operation, &depleted).await?;

    Ok(DiscardResponse {
        label: outcome.label,
        remaining: outcome.remaining,
        depleted: outcome.newly_depleted,
        ledger,
    })
}

/// Replaces a product's fields; refreshes the total without notifying.
pub async fn edit_product(state: &AppState, id: &str, draft: &ProductDraft) -> ApiResult<Product> {
    let spec = validate_product_draft(draft, DraftMode::Edit)?;
    let product = state.db.products().update(id, &spec).await?;
    state.db.ledger().refresh_total().await?;

    info!(product_id = %id, brand = %product.brand, "Product edited");
    Ok(product)
}

pub async fn delete_product(state: &AppState, id: &str) -> ApiResult<Ledger> {
    state.db.products().delete(id).await?;
    let ledger = state.db.ledger().refresh_total().await?;
    Ok(ledger)
}

/// Deletes sold-out products and prunes empty flavors.
pub async fn cleanup(state: &AppState) -> ApiResult<CleanupReport> {
    let report = state.db.products().cleanup().await?;
    state.db.ledger().refresh_total().await?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::notify::tests::{dispatcher_with, Inbox};
    use crate::notify::NotificationDispatcher;
    use crate::test_support::{liquid_draft, test_state_with, unit_draft};
    use vape_core::{Flavor, Money};

    #[tokio::test]
    async fn test_first_arrival_creates_ledger() {
        let inbox = Inbox::default();
        let state = test_state_with(dispatcher_with(inbox.clone()).await).await;

        let first = receive_arrival(&state, &liquid_draft("Elf", 100, &[("Mint", 5)]))
            .await
            .unwrap();
        assert_eq!(first.kind, ArrivalKind::Added);
        assert_eq!(first.message, LEDGER_CREATED);
        assert_eq!(first.ledger.total, Money::from_hryvnias(500));

        let second = receive_arrival(&state, &liquid_draft("elf", 100, &[("mint", 2), ("Grape", 1)]))
            .await
            .unwrap();
        assert_eq!(second.kind, ArrivalKind::Updated);
        assert_eq!(second.message, ARRIVAL_UPDATED);
        assert_eq!(
            second.product.flavors,
            vec![Flavor::new("Mint", 7), Flavor::new("Grape", 1)]
        );

        let third = receive_arrival(&state, &unit_draft(ProductKind::Nicoboosters, "Boost", 40, 3))
            .await
            .unwrap();
        assert_eq!(third.message, ARRIVAL_ADDED);

        let texts = inbox.texts().await;
        assert_eq!(texts.len(), 6);
        assert!(texts[0].starts_with("🧾 <b>✅ Новий лог створено</b>"));
        assert!(texts[2].starts_with("🧾 <b>✅ Товар оновлено!</b>"));
    }

    #[tokio::test]
    async fn test_invalid_arrival_rejected() {
        let state = test_state_with(NotificationDispatcher::disabled()).await;
        let mut draft = liquid_draft("Elf", 100, &[("Mint", 5)]);
        draft.volume_ml = Some(20);

        let err = receive_arrival(&state, &draft).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(state.db.products().list(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_oversized_arrival_leaves_shop_usable() {
        let state = test_state_with(NotificationDispatcher::disabled()).await;
        receive_arrival(&state, &liquid_draft("Elf", 100, &[("Mint", 2)]))
            .await
            .unwrap();

        let mut draft = unit_draft(ProductKind::Cartridges, "Big", 1, 100_000);
        draft.sale_price_kopecks = Some(1_000_000_000_000_000);
        let err = receive_arrival(&state, &draft).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(err.message.contains("salePrice"));

        assert_eq!(state.db.products().list(None).await.unwrap().len(), 1);
        let ledger = state.db.ledger().refresh_total().await.unwrap();
        assert_eq!(ledger.total, Money::from_hryvnias(200));
    }

    #[tokio::test]
    async fn test_discard_last_unit_reports_depletion() {
        let inbox = Inbox::default();
        let state = test_state_with(dispatcher_with(inbox.clone()).await).await;
        let elf = receive_arrival(&state, &liquid_draft("Elf", 100, &[("Mint", 1), ("Grape", 2)]))
            .await
            .unwrap()
            .product;
        inbox.messages.lock().await.clear();

        let response = discard(&state, &elf.id, Some("Mint")).await.unwrap();
        assert_eq!(response.remaining, 0);
        assert!(response.depleted.is_some());
        assert_eq!(response.ledger.total, Money::from_hryvnias(200));

        let texts = inbox.texts().await;
        assert_eq!(texts.len(), 3);
        assert!(texts[0].starts_with("🧾 <b>🗑️ Списано 1 од.: Elf 30 ml Mint</b>"));
        assert!(!texts[1].contains("Mint"));
        assert!(texts[2].contains("• Elf 30 ml Mint"));

        let err = discard(&state, &elf.id, Some("Mint")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_edit_refreshes_total_silently() {
        let inbox = Inbox::default();
        let state = test_state_with(dispatcher_with(inbox.clone()).await).await;
        let xros = receive_arrival(&state, &unit_draft(ProductKind::Cartridges, "XROS", 150, 2))
            .await
            .unwrap()
            .product;
        inbox.messages.lock().await.clear();

        let edited = edit_product(&state, &xros.id, &unit_draft(ProductKind::Cartridges, "XROS 2", 200, 4))
            .await
            .unwrap();
        assert_eq!(edited.brand, "XROS 2");
        assert_eq!(state.db.ledger().get().await.unwrap().total, Money::from_hryvnias(800));
        assert!(inbox.texts().await.is_empty());

        let err = edit_product(&state, &xros.id, &unit_draft(ProductKind::Nicoboosters, "XROS", 1, 1))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::BusinessLogic);
    }

    #[tokio::test]
    async fn test_delete_and_cleanup() {
        let state = test_state_with(NotificationDispatcher::disabled()).await;
        let empty = receive_arrival(&state, &unit_draft(ProductKind::Cartridges, "Old", 100, 0))
            .await
            .unwrap()
            .product;
        let kept = receive_arrival(&state, &unit_draft(ProductKind::Cartridges, "New", 100, 1))
            .await
            .unwrap()
            .product;

        let report = cleanup(&state).await.unwrap();
        assert_eq!(report.deleted.len(), 1);
        assert!(state.db.products().get_by_id(&empty.id).await.unwrap().is_none());

        let ledger = delete_product(&state, &kept.id).await.unwrap();
        assert_eq!(ledger.total, Money::zero());
        let err = delete_product(&state, &kept.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }
}
