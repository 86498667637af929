//! Seller checkout.
//!
//! The seller's cart stays locked from payment resolution until it is
//! cleared, so a double-tapped "pay" cannot sell the same cart twice.

use chrono::Utc;
use tracing::{info, warn};

use vape_core::report::{self, SaleSummary};
use vape_core::{CheckoutSummary, CoreError, PaymentRequest};
use vape_db::{CheckoutRequest, DbError};

use crate::error::ApiResult;
use crate::state::AppState;

/// Sells the seller's cart, clears it and posts the sale summary.
pub async fn checkout(state: &AppState, seller_email: &str, payment: &PaymentRequest) -> ApiResult<CheckoutSummary> {
    let mut cart = state.carts.lock(seller_email).await;
    if cart.is_empty() {
        return Err(CoreError::EmptyCart.into());
    }

    let split = payment.resolve(cart.total())?;
    let now = Utc::now();
    let local = now.with_timezone(&state.config.timezone());

    let summary = state
        .db
        .sales()
        .checkout(&CheckoutRequest {
            seller_email,
            cart: &cart,
            payment: split,
            local_date: local.format("%Y-%m-%d").to_string(),
            at: now,
        })
        .await
        .inspect_err(|err| {
            if let DbError::Domain(core) = err {
                if core.is_stock_conflict() {
                    warn!(seller = %seller_email, error = %core, "Stock sold elsewhere before checkout");
                }
            }
        })?;

    let message = report::sale_summary(&SaleSummary {
        at: local,
        kind: cart.single_kind(),
        unit_labels: cart.unit_labels(),
        payment: split,
        remaining_total: summary.ledger.total,
        depleted: summary.depleted.iter().map(|m| m.label.clone()).collect(),
    });

    cart.clear();
    drop(cart);

    info!(
        sale_id = %summary.sale.id,
        seller = %seller_email,
        total = %summary.sale.total(),
        "Sale recorded"
    );

    state.notifier.dispatch(&[message]).await;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::notify::tests::{dispatcher_with, Inbox};
    use crate::notify::NotificationDispatcher;
    use crate::services::receive_arrival;
    use crate::test_support::{liquid_draft, test_state_with, unit_draft};
    use vape_core::{Money, ProductKind};

    #[tokio::test]
    async fn test_checkout_clears_cart_and_posts_summary() {
        let inbox = Inbox::default();
        let state = test_state_with(dispatcher_with(inbox.clone()).await).await;
        let elf = receive_arrival(&state, &liquid_draft("Elf", 100, &[("Mint", 5)]))
            .await
            .unwrap()
            .product;
        inbox.messages.lock().await.clear();

        state
            .carts
            .lock("seller@shop.ua")
            .await
            .add_item(&elf, Some("Mint"), 2)
            .unwrap();

        let summary = checkout(&state, "seller@shop.ua", &PaymentRequest::card()).await.unwrap();
        assert_eq!(summary.ledger.card, Money::from_hryvnias(200));
        assert!(state.carts.lock("seller@shop.ua").await.is_empty());

        let texts = inbox.texts().await;
        assert_eq!(texts.len(), 1);
        assert!(texts[0].contains("Продаж рідини:\nElf 30 ml Mint\nElf 30 ml Mint\n"));
        assert!(texts[0].contains("200 грн карта\n0 грн готівка"));
        assert!(texts[0].contains("Актуальна наявність: 300 грн"));
    }

    #[tokio::test]
    async fn test_sold_out_item_listed_in_summary() {
        let inbox = Inbox::default();
        let state = test_state_with(dispatcher_with(inbox.clone()).await).await;
        let xros = receive_arrival(&state, &unit_draft(ProductKind::Cartridges, "XROS", 150, 1))
            .await
            .unwrap()
            .product;
        inbox.messages.lock().await.clear();

        state.carts.lock("s@shop.ua").await.add_item(&xros, None, 1).unwrap();
        let summary = checkout(&state, "s@shop.ua", &PaymentRequest::cash()).await.unwrap();

        assert_eq!(summary.depleted.len(), 1);
        let texts = inbox.texts().await;
        assert!(texts[0].contains("Продаж катриджа:"));
        assert!(texts[0].contains("⚠️ <b>Вичерпано:</b>\n• XROS (основний товар)"));
    }

    #[tokio::test]
    async fn test_restocked_item_is_not_announced_twice() {
        let inbox = Inbox::default();
        let state = test_state_with(dispatcher_with(inbox.clone()).await).await;
        let elf = receive_arrival(&state, &liquid_draft("Elf", 100, &[("Mint", 1)]))
            .await
            .unwrap()
            .product;

        state.carts.lock("s@shop.ua").await.add_item(&elf, Some("Mint"), 1).unwrap();
        let first = checkout(&state, "s@shop.ua", &PaymentRequest::cash()).await.unwrap();
        assert_eq!(first.depleted.len(), 1);

        let restocked = receive_arrival(&state, &liquid_draft("Elf", 100, &[("Mint", 1)]))
            .await
            .unwrap()
            .product;
        assert_eq!(restocked.id, elf.id);
        inbox.messages.lock().await.clear();

        state.carts.lock("s@shop.ua").await.add_item(&restocked, Some("Mint"), 1).unwrap();
        let second = checkout(&state, "s@shop.ua", &PaymentRequest::cash()).await.unwrap();
        assert!(second.depleted.is_empty());

        let texts = inbox.texts().await;
        assert_eq!(texts.len(), 1);
        assert!(!texts[0].contains("Вичерпано"));
        assert_eq!(state.db.depletions().list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_cart_and_bad_split() {
        let state = test_state_with(NotificationDispatcher::disabled()).await;

        let err = checkout(&state, "s@shop.ua", &PaymentRequest::cash()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::CartError);

        let xros = receive_arrival(&state, &unit_draft(ProductKind::Cartridges, "XROS", 150, 3))
            .await
            .unwrap()
            .product;
        state.carts.lock("s@shop.ua").await.add_item(&xros, None, 1).unwrap();

        let payment = PaymentRequest::split(Money::from_hryvnias(100), Money::from_hryvnias(40));
        let err = checkout(&state, "s@shop.ua", &payment).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::PaymentError);
        // Rejected payment keeps the cart.
        assert!(!state.carts.lock("s@shop.ua").await.is_empty());
    }

    #[tokio::test]
    async fn test_second_seller_loses_race_for_last_unit() {
        let state = test_state_with(NotificationDispatcher::disabled()).await;
        let elf = receive_arrival(&state, &liquid_draft("Elf", 100, &[("Mint", 1)]))
            .await
            .unwrap()
            .product;

        state.carts.lock("a@shop.ua").await.add_item(&elf, Some("Mint"), 1).unwrap();
        state.carts.lock("b@shop.ua").await.add_item(&elf, Some("Mint"), 1).unwrap();

        let pay = PaymentRequest::cash();
        let (a, b) = tokio::join!(
            checkout(&state, "a@shop.ua", &pay),
            checkout(&state, "b@shop.ua", &pay),
        );

        assert_eq!([a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(), 1);
        let ledger = state.db.ledger().get().await.unwrap();
        assert_eq!(ledger.cash, Money::from_hryvnias(100));
        assert_eq!(ledger.total, Money::zero());
    }
}
