//! # Cart
//!
//! A seller's cart and the payment split rules of checkout.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Seller Action            Endpoint                 Cart Change          │
//! │  ─────────────            ────────                 ───────────          │
//! │                                                                         │
//! │  Tap flavor ────────────► POST /api/cart/items ──► add_item()           │
//! │  Change quantity ───────► PUT /api/cart/items ───► update_quantity()    │
//! │  Tap remove ────────────► DELETE /api/cart/items ► remove_item()        │
//! │  Clear ─────────────────► DELETE /api/cart ──────► clear()              │
//! │  Pay ───────────────────► POST /api/cart/checkout                       │
//! │                              │                                          │
//! │                              ├── PaymentRequest::resolve(total)         │
//! │                              └── stock guard + ledger delta (vape-db)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Lines are unique by `(product_id, flavor)`. Prices are frozen when the line
//! is added so the total does not move under the seller's feet.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Product, ProductKind};
use crate::validation::{validate_cart_size, validate_payment_amount, validate_quantity};
use crate::MAX_ITEM_QUANTITY;

// =============================================================================
// Cart Line
// =============================================================================

/// One product (and flavor) in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartLine {
    pub product_id: String,
    pub kind: ProductKind,
    /// Unit label, e.g. `"Elf 30 ml Mint"` (frozen).
    pub label: String,
    pub flavor: Option<String>,
    /// Sale price at time of adding (frozen).
    pub unit_price: Money,
    pub purchase_price: Money,
    pub seller_amount: Money,
    pub quantity: i64,
    #[ts(as = "String")]
    pub added_at: DateTime<Utc>,
}

impl CartLine {
    /// Creates a line from a product, freezing its prices.
    pub fn from_product(product: &Product, flavor: Option<&str>, quantity: i64) -> Self {
        let flavor = if product.kind.has_flavors() {
            flavor.map(str::to_string)
        } else {
            None
        };

        CartLine {
            product_id: product.id.clone(),
            kind: product.kind,
            label: product.unit_label(flavor.as_deref()),
            flavor,
            unit_price: product.sale_price(),
            purchase_price: product.purchase_price(),
            seller_amount: product.seller_amount(),
            quantity,
            added_at: Utc::now(),
        }
    }

    pub fn line_total(&self) -> Money {
        self.unit_price * self.quantity
    }

    fn matches(&self, product_id: &str, flavor: Option<&str>) -> bool {
        self.product_id == product_id && self.flavor.as_deref() == flavor
    }
}

// =============================================================================
// Cart
// =============================================================================

/// A seller's cart.
///
/// ## Invariants
/// - Lines are unique by `(product_id, flavor)`
/// - Quantity is 1..=MAX_ITEM_QUANTITY (setting 0 removes the line)
/// - At most MAX_CART_ITEMS lines
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Cart {
    pub lines: Vec<CartLine>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Default for Cart {
    fn default() -> Self {
        Self::new()
    }
}

impl Cart {
    pub fn new() -> Self {
        Cart {
            lines: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Adds units of a product (flavor) or increases the existing line.
    ///
    /// The requested total is checked against the stock on hand at the time
    /// of adding; checkout re-checks it inside the transaction.
    ///
    /// ## Errors
    /// - `Validation` for a bad quantity or a full cart
    /// - `FlavorNotFound` for a liquid without a known flavor
    /// - `QuantityTooLarge` / `InsufficientStock` when the line would grow too big
    pub fn add_item(&mut self, product: &Product, flavor: Option<&str>, quantity: i64) -> CoreResult<()> {
        validate_quantity(quantity)?;

        let available = product.available(flavor)?;
        let flavor = if product.kind.has_flavors() { flavor } else { None };

        if let Some(line) = self.lines.iter_mut().find(|l| l.matches(&product.id, flavor)) {
            let new_qty = line.quantity + quantity;
            if new_qty > MAX_ITEM_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    requested: new_qty,
                    max: MAX_ITEM_QUANTITY,
                });
            }
            if new_qty > available {
                return Err(CoreError::InsufficientStock {
                    item: line.label.clone(),
                    available,
                    requested: new_qty,
                });
            }
            line.quantity = new_qty;
            return Ok(());
        }

        validate_cart_size(self.lines.len())?;

        if quantity > available {
            return Err(CoreError::InsufficientStock {
                item: product.unit_label(flavor),
                available,
                requested: quantity,
            });
        }

        self.lines.push(CartLine::from_product(product, flavor, quantity));
        Ok(())
    }

    /// Sets the quantity of a line; 0 removes it.
    pub fn update_quantity(&mut self, product_id: &str, flavor: Option<&str>, quantity: i64) -> CoreResult<()> {
        if quantity == 0 {
            return self.remove_item(product_id, flavor);
        }

        validate_quantity(quantity)?;

        let line = self
            .lines
            .iter_mut()
            .find(|l| l.matches(product_id, flavor))
            .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;
        line.quantity = quantity;
        Ok(())
    }

    /// Removes a line.
    pub fn remove_item(&mut self, product_id: &str, flavor: Option<&str>) -> CoreResult<()> {
        let initial_len = self.lines.len();
        self.lines.retain(|l| !l.matches(product_id, flavor));

        if self.lines.len() == initial_len {
            Err(CoreError::ProductNotFound(product_id.to_string()))
        } else {
            Ok(())
        }
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.created_at = Utc::now();
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn total(&self) -> Money {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Seller wages earned by this cart (`Σ sellerAmount × qty`).
    pub fn salary(&self) -> Money {
        self.lines.iter().map(|l| l.seller_amount * l.quantity).sum()
    }

    pub fn purchase_cost(&self) -> Money {
        self.lines.iter().map(|l| l.purchase_price * l.quantity).sum()
    }

    /// The kind shared by every line, if there is exactly one.
    pub fn single_kind(&self) -> Option<ProductKind> {
        let first = self.lines.first()?.kind;
        self.lines.iter().all(|l| l.kind == first).then_some(first)
    }

    /// One label per unit sold, in cart order.
    pub fn unit_labels(&self) -> Vec<String> {
        self.lines
            .iter()
            .flat_map(|l| std::iter::repeat(l.label.clone()).take(l.quantity.max(0) as usize))
            .collect()
    }
}

/// Cart totals summary for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartTotals {
    pub line_count: usize,
    pub total_quantity: i64,
    pub total: Money,
    pub salary: Money,
    pub purchase_cost: Money,
    /// Owner's share: total minus wages.
    pub mine: Money,
    /// Total minus purchase cost minus wages.
    pub profit: Money,
}

impl From<&Cart> for CartTotals {
    fn from(cart: &Cart) -> Self {
        let total = cart.total();
        let salary = cart.salary();
        let purchase_cost = cart.purchase_cost();

        CartTotals {
            line_count: cart.lines.len(),
            total_quantity: cart.lines.iter().map(|l| l.quantity).sum(),
            total,
            salary,
            purchase_cost,
            mine: total - salary,
            profit: total - purchase_cost - salary,
        }
    }
}

// =============================================================================
// Payment
// =============================================================================

/// How the customer pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum PaymentType {
    Cash,
    Card,
    /// Part cash, part card; the parts must add up to the total.
    Split,
}

/// Payment as chosen on the checkout screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PaymentRequest {
    pub payment_type: PaymentType,
    #[serde(default)]
    pub cash: Option<Money>,
    #[serde(default)]
    pub card: Option<Money>,
}

/// The resolved cash and card parts of a payment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PaymentSplit {
    pub cash: Money,
    pub card: Money,
}

impl PaymentRequest {
    pub fn cash() -> Self {
        PaymentRequest {
            payment_type: PaymentType::Cash,
            cash: None,
            card: None,
        }
    }

    pub fn card() -> Self {
        PaymentRequest {
            payment_type: PaymentType::Card,
            cash: None,
            card: None,
        }
    }

    pub fn split(cash: Money, card: Money) -> Self {
        PaymentRequest {
            payment_type: PaymentType::Split,
            cash: Some(cash),
            card: Some(card),
        }
    }

    /// Resolves the request against the cart total.
    ///
    /// ## Example
    /// ```rust
    /// use vape_core::{Money, PaymentRequest};
    ///
    /// let total = Money::from_hryvnias(150);
    /// let ok = PaymentRequest::split(Money::from_hryvnias(100), Money::from_hryvnias(50));
    /// assert!(ok.resolve(total).is_ok());
    ///
    /// let short = PaymentRequest::split(Money::from_hryvnias(100), Money::from_hryvnias(40));
    /// assert!(short.resolve(total).is_err());
    /// ```
    pub fn resolve(&self, total: Money) -> CoreResult<PaymentSplit> {
        match self.payment_type {
            PaymentType::Cash => Ok(PaymentSplit {
                cash: total,
                card: Money::zero(),
            }),
            PaymentType::Card => Ok(PaymentSplit {
                cash: Money::zero(),
                card: total,
            }),
            PaymentType::Split => {
                let (cash, card) = match (self.cash, self.card) {
                    (Some(cash), Some(card)) => (cash, card),
                    _ => {
                        return Err(CoreError::InvalidPaymentAmount {
                            reason: "split payment needs both cash and card amounts".to_string(),
                        })
                    }
                };

                validate_payment_amount("cash", cash)?;
                validate_payment_amount("card", card)?;

                if cash + card != total {
                    return Err(CoreError::PaymentMismatch { cash, card, total });
                }

                Ok(PaymentSplit { cash, card })
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::tests::{liquid, unit};
    use crate::MAX_CART_ITEMS;

    #[test]
    fn test_add_same_flavor_merges() {
        let elf = liquid("p1", "Elf", 100, &[("Mint", 5)]);
        let mut cart = Cart::new();

        cart.add_item(&elf, Some("Mint"), 1).unwrap();
        cart.add_item(&elf, Some("Mint"), 2).unwrap();

        assert_eq!(cart.lines.len(), 1);
        assert_eq!(cart.lines[0].quantity, 3);
        assert_eq!(cart.lines[0].label, "Elf 30 ml Mint");
        assert_eq!(cart.total(), Money::from_hryvnias(300));
    }

    #[test]
    fn test_different_flavors_are_separate_lines() {
        let elf = liquid("p1", "Elf", 100, &[("Mint", 5), ("Grape", 1)]);
        let mut cart = Cart::new();

        cart.add_item(&elf, Some("Mint"), 1).unwrap();
        cart.add_item(&elf, Some("Grape"), 1).unwrap();
        assert_eq!(cart.lines.len(), 2);

        assert!(matches!(
            cart.add_item(&elf, Some("Grape"), 1),
            Err(CoreError::InsufficientStock { available: 1, requested: 2, .. })
        ));
    }

    #[test]
    fn test_unknown_flavor_rejected() {
        let elf = liquid("p1", "Elf", 100, &[("Mint", 5)]);
        let mut cart = Cart::new();

        assert!(matches!(
            cart.add_item(&elf, Some("Cola"), 1),
            Err(CoreError::FlavorNotFound { .. })
        ));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_unit_product_ignores_flavor() {
        let xros = unit("p2", ProductKind::Cartridges, "XROS", 200, 3);
        let mut cart = Cart::new();

        cart.add_item(&xros, Some("ignored"), 2).unwrap();
        assert_eq!(cart.lines[0].flavor, None);
        cart.update_quantity("p2", None, 1).unwrap();
        assert_eq!(cart.lines[0].quantity, 1);
    }

    #[test]
    fn test_update_to_zero_removes() {
        let elf = liquid("p1", "Elf", 100, &[("Mint", 5)]);
        let mut cart = Cart::new();
        cart.add_item(&elf, Some("Mint"), 2).unwrap();

        cart.update_quantity("p1", Some("Mint"), 0).unwrap();
        assert!(cart.is_empty());
        assert!(cart.remove_item("p1", Some("Mint")).is_err());
    }

    #[test]
    fn test_cart_size_limit() {
        let mut cart = Cart::new();
        for i in 0..MAX_CART_ITEMS {
            let p = unit(&format!("p{}", i), ProductKind::Nicoboosters, "Booster", 50, 10);
            cart.add_item(&p, None, 1).unwrap();
        }

        let extra = unit("extra", ProductKind::Nicoboosters, "Booster", 50, 10);
        assert!(matches!(
            cart.add_item(&extra, None, 1),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn test_totals() {
        // Sale 100, purchase 50, seller 10 per unit.
        let elf = liquid("p1", "Elf", 100, &[("Mint", 5)]);
        let mut cart = Cart::new();
        cart.add_item(&elf, Some("Mint"), 2).unwrap();

        let totals = CartTotals::from(&cart);
        assert_eq!(totals.total, Money::from_hryvnias(200));
        assert_eq!(totals.salary, Money::from_hryvnias(20));
        assert_eq!(totals.mine, Money::from_hryvnias(180));
        assert_eq!(totals.profit, Money::from_hryvnias(80));
        assert_eq!(totals.total_quantity, 2);
    }

    #[test]
    fn test_single_kind_and_labels() {
        let elf = liquid("p1", "Elf", 100, &[("Mint", 5)]);
        let xros = unit("p2", ProductKind::Cartridges, "XROS", 200, 3);
        let mut cart = Cart::new();

        cart.add_item(&elf, Some("Mint"), 2).unwrap();
        assert_eq!(cart.single_kind(), Some(ProductKind::Liquids));
        assert_eq!(cart.unit_labels(), vec!["Elf 30 ml Mint", "Elf 30 ml Mint"]);

        cart.add_item(&xros, None, 1).unwrap();
        assert_eq!(cart.single_kind(), None);
    }

    #[test]
    fn test_payment_cash_and_card() {
        let total = Money::from_hryvnias(100);

        let cash = PaymentRequest::cash().resolve(total).unwrap();
        assert_eq!(cash, PaymentSplit { cash: total, card: Money::zero() });

        let card = PaymentRequest::card().resolve(total).unwrap();
        assert_eq!(card, PaymentSplit { cash: Money::zero(), card: total });
    }

    #[test]
    fn test_split_must_match_total() {
        let total = Money::from_hryvnias(150);

        let ok = PaymentRequest::split(Money::from_hryvnias(150), Money::zero());
        assert!(ok.resolve(total).is_ok());

        for (cash, card) in [(100, 40), (100, 60), (0, 0)] {
            let req = PaymentRequest::split(Money::from_hryvnias(cash), Money::from_hryvnias(card));
            assert!(matches!(req.resolve(total), Err(CoreError::PaymentMismatch { .. })));
        }
    }

    #[test]
    fn test_split_rejects_negative_and_missing_parts() {
        let total = Money::from_hryvnias(100);

        let negative = PaymentRequest::split(Money::from_hryvnias(150), Money::from_hryvnias(-50));
        assert!(matches!(negative.resolve(total), Err(CoreError::Validation(_))));

        let missing = PaymentRequest {
            payment_type: PaymentType::Split,
            cash: Some(total),
            card: None,
        };
        assert!(matches!(
            missing.resolve(total),
            Err(CoreError::InvalidPaymentAmount { .. })
        ));
    }

    #[test]
    fn test_payment_request_deserializes() {
        let req: PaymentRequest =
            serde_json::from_str(r#"{"paymentType":"split","cash":10000,"card":5000}"#).unwrap();
        assert_eq!(req, PaymentRequest::split(Money::from_kopecks(10000), Money::from_kopecks(5000)));

        let req: PaymentRequest = serde_json::from_str(r#"{"paymentType":"card"}"#).unwrap();
        assert_eq!(req, PaymentRequest::card());
    }
}
