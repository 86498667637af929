//! The ledger-update flow.
//!
//! ```text
//! update_ledger(patch, operation, depleted)
//!   1. total = Σ quantity × salePrice               (inside the transaction)
//!   2. ledger = stored ⊕ patch, ledger.total = total (persisted)
//!   3. dispatch [ledger summary, availability, depletion alert?]
//! ```

use tracing::info;

use vape_core::report;
use vape_core::validation::validate_payment_amount;
use vape_core::{Ledger, LedgerPatch, ProductKind};

use crate::error::ApiResult;
use crate::state::AppState;

/// Operation label used when the admin does not name the edit.
pub const MANUAL_EDIT_LABEL: &str = "✏️ Ручне редагування балансу";

/// Persists `patch` with a fresh total, then sends the inventory report.
pub async fn update_ledger(
    state: &AppState,
    patch: &LedgerPatch,
    operation: &str,
    depleted: &[String],
) -> ApiResult<Ledger> {
    let ledger = state.db.ledger().apply_patch(patch).await?;

    let liquids = state.db.products().list(Some(ProductKind::Liquids)).await?;
    let messages = report::inventory_report(operation, &ledger, &liquids, depleted);
    state.notifier.dispatch(&messages).await;

    info!(
        operation = %operation,
        total = %ledger.total,
        depleted = depleted.len(),
        "Inventory report published"
    );
    Ok(ledger)
}

/// Refreshes the total only and sends the inventory report.
pub async fn publish_inventory_report(state: &AppState, operation: &str, depleted: &[String]) -> ApiResult<Ledger> {
    update_ledger(state, &LedgerPatch::default(), operation, depleted).await
}

/// Admin's manual edit: absolute values for any of the four balances.
pub async fn edit_ledger(state: &AppState, patch: &LedgerPatch, operation: Option<&str>) -> ApiResult<Ledger> {
    for (field, value) in [
        ("cash", patch.cash),
        ("card", patch.card),
        ("salary", patch.salary),
        ("mine", patch.mine),
    ] {
        if let Some(amount) = value {
            validate_payment_amount(field, amount)?;
        }
    }

    let operation = operation
        .map(str::trim)
        .filter(|op| !op.is_empty())
        .unwrap_or(MANUAL_EDIT_LABEL);

    update_ledger(state, patch, operation, &[]).await
}
