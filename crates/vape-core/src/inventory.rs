//! # Inventory Rules
//!
//! Pure stock calculations shared by the checkout, arrival, discard and
//! cleanup flows.
//!
//! ## Remaining Total
//! ```text
//! liquids       Σ flavor.quantity × sale_price
//! cartridges    quantity × sale_price
//! nicoboosters  quantity × sale_price
//!               ─────────────────────────────
//!               ledger.total
//! ```
//!
//! ## Depletion Keys
//! ```text
//! liquids_{productId}_{flavor}        e.g. liquids_9f1c…_Mint
//! cartridges_{productId}_main         e.g. cartridges_41aa…_main
//! ```

use std::collections::BTreeMap;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{BrandGroup, Flavor, Product, ProductKind};

/// Sale value of everything on the shelf.
///
/// ## Example
/// ```rust
/// use vape_core::inventory::remaining_total;
///
/// assert!(remaining_total(&[]).unwrap().is_zero());
/// ```
pub fn remaining_total(products: &[Product]) -> CoreResult<Money> {
    products
        .iter()
        .try_fold(Money::zero(), |acc, product| {
            product.stock_value().and_then(|value| acc.checked_add(value))
        })
        .ok_or_else(|| CoreError::AmountOverflow {
            what: "remaining total".to_string(),
        })
}

/// Case-insensitive, whitespace-insensitive brand comparison.
pub fn same_name(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

/// Merges an arrival's flavors into the stored ones.
///
/// Flavors are matched by name ignoring case; matched quantities are summed
/// and keep the stored spelling. Unmatched flavors are appended in the order
/// they arrived.
pub fn merge_flavors(existing: &[Flavor], incoming: &[Flavor]) -> Vec<Flavor> {
    let mut merged = existing.to_vec();

    for flavor in incoming {
        match merged.iter_mut().find(|f| same_name(&f.name, &flavor.name)) {
            Some(stored) => stored.quantity += flavor.quantity,
            None => merged.push(flavor.clone()),
        }
    }

    merged
}

/// Drops flavors with nothing left.
pub fn prune_empty_flavors(flavors: &[Flavor]) -> Vec<Flavor> {
    flavors.iter().filter(|f| f.quantity > 0).cloned().collect()
}

/// What the cleanup utility does with a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupAction {
    Keep,
    /// Liquid with some empty flavors: keep only these.
    Prune(Vec<Flavor>),
    /// Nothing left at all.
    Delete,
}

/// Decides how the cleanup utility treats a product.
pub fn cleanup_action(product: &Product) -> CleanupAction {
    if !product.kind.has_flavors() {
        return if product.quantity.unwrap_or(0) <= 0 {
            CleanupAction::Delete
        } else {
            CleanupAction::Keep
        };
    }

    let kept = prune_empty_flavors(&product.flavors);
    if kept.is_empty() {
        CleanupAction::Delete
    } else if kept.len() < product.flavors.len() {
        CleanupAction::Prune(kept)
    } else {
        CleanupAction::Keep
    }
}

/// Deterministic id of a depletion marker.
pub fn depletion_key(kind: ProductKind, product_id: &str, flavor: Option<&str>) -> String {
    match (kind.has_flavors(), flavor) {
        (true, Some(name)) => format!("{}_{}_{}", kind.as_str(), product_id, name),
        _ => format!("{}_{}_main", kind.as_str(), product_id),
    }
}

/// Text shown for a depleted item in chat alerts.
pub fn depletion_label(product: &Product, flavor: Option<&str>) -> String {
    match (product.kind.has_flavors(), flavor) {
        (true, Some(name)) => product.unit_label(Some(name)),
        _ => format!("{} (основний товар)", product.brand),
    }
}

/// Checks that `count` units can be taken and returns what would remain.
///
/// ## Errors
/// - `FlavorNotFound` for a liquid without that flavor
/// - `InsufficientStock` when fewer than `count` units are on hand
pub fn take_units(product: &Product, flavor: Option<&str>, count: i64) -> CoreResult<i64> {
    let available = product.available(flavor)?;
    if available < count {
        return Err(CoreError::InsufficientStock {
            item: product.unit_label(flavor),
            available,
            requested: count,
        });
    }
    Ok(available - count)
}

/// Groups in-stock products of one kind by brand for the seller's picker.
///
/// Brands with the same name (ignoring case) share a group; groups are sorted
/// by brand name.
pub fn group_by_brand(products: &[Product], kind: ProductKind) -> Vec<BrandGroup> {
    let mut groups: BTreeMap<String, BrandGroup> = BTreeMap::new();

    for product in products.iter().filter(|p| p.kind == kind && p.is_in_stock()) {
        let mut product = product.clone();
        product.flavors.retain(|f| f.quantity > 0);

        groups
            .entry(product.brand.trim().to_lowercase())
            .or_insert_with(|| BrandGroup {
                brand: product.brand.trim().to_string(),
                products: Vec::new(),
            })
            .products
            .push(product);
    }

    groups.into_values().collect()
}

// =============================================================================
// Unit Tests
// =============================================================================
