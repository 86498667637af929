//! # Domain Types
//!
//! Core domain types used throughout Vape POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Sale       │   │   DailySales    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  date (key)     │       │
//! │  │  kind           │   │  seller_email   │   │  total_sum      │       │
//! │  │  brand          │   │  cash / card    │   │  profit         │       │
//! │  │  prices         │   │  items[]        │   │  sales_count    │       │
//! │  │  flavors[] / qty│   └─────────────────┘   └─────────────────┘       │
//! │  └─────────────────┘                                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  ProductKind    │   │ DepletionMarker │   │      Role       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  Liquids        │   │  id (det. key)  │   │  Admin          │       │
//! │  │  Cartridges     │   │  label          │   │  Seller         │       │
//! │  │  Nicoboosters   │   │  depleted_at    │   └─────────────────┘       │
//! │  └─────────────────┘   └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Stock Shapes
//! Liquids carry a list of flavors, each with its own quantity. Cartridges
//! and nicoboosters carry one `quantity`. [`ProductSpec`] encodes that split
//! in [`StockSpec`] so validated forms can't mix the two.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::ledger::Ledger;
use crate::money::Money;

// =============================================================================
// Product Kind
// =============================================================================

/// The three product collections the shop sells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum ProductKind {
    /// Bottled e-liquid, stocked per flavor.
    Liquids,
    /// Pod cartridges, one stock count.
    Cartridges,
    /// Nicotine boosters, one stock count.
    Nicoboosters,
}

impl ProductKind {
    /// Every kind, in the order the seller picker shows them.
    pub const ALL: [ProductKind; 3] = [
        ProductKind::Liquids,
        ProductKind::Cartridges,
        ProductKind::Nicoboosters,
    ];

    /// Storage and URL name of the kind.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ProductKind::Liquids => "liquids",
            ProductKind::Cartridges => "cartridges",
            ProductKind::Nicoboosters => "nicoboosters",
        }
    }

    /// Whether stock is tracked per flavor.
    pub const fn has_flavors(&self) -> bool {
        matches!(self, ProductKind::Liquids)
    }

    /// Genitive noun used in the sale summary header ("Продаж рідини:").
    pub const fn sale_noun(&self) -> &'static str {
        match self {
            ProductKind::Liquids => "рідини",
            ProductKind::Cartridges => "катриджа",
            ProductKind::Nicoboosters => "товару",
        }
    }
}

impl fmt::Display for ProductKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "liquids" => Ok(ProductKind::Liquids),
            "cartridges" => Ok(ProductKind::Cartridges),
            "nicoboosters" => Ok(ProductKind::Nicoboosters),
            _ => Err(ValidationError::NotAllowed {
                field: "kind".to_string(),
                allowed: ProductKind::ALL.iter().map(|k| k.to_string()).collect(),
            }),
        }
    }
}

// =============================================================================
// Flavor
// =============================================================================

/// A named sub-variant of a liquid with its own quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Flavor {
    pub name: String,
    pub quantity: i64,
}

impl Flavor {
    pub fn new(name: impl Into<String>, quantity: i64) -> Self {
        Flavor {
            name: name.into(),
            quantity,
        }
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product on the shelf.
///
/// Prices are stored in kopecks; use the accessors to get [`Money`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    pub kind: ProductKind,

    pub brand: String,

    /// What the shop paid per unit.
    pub purchase_price_kopecks: i64,

    /// Shelf price per unit.
    pub sale_price_kopecks: i64,

    /// Seller's commission per unit sold.
    pub seller_amount_kopecks: i64,

    pub image_url: String,

    /// Bottle size in ml (liquids only).
    pub volume_ml: Option<i64>,

    /// Units on hand (cartridges and nicoboosters only).
    pub quantity: Option<i64>,

    /// Per-flavor stock (liquids only).
    pub flavors: Vec<Flavor>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    #[inline]
    pub fn sale_price(&self) -> Money {
        Money::from_kopecks(self.sale_price_kopecks)
    }

    #[inline]
    pub fn purchase_price(&self) -> Money {
        Money::from_kopecks(self.purchase_price_kopecks)
    }

    #[inline]
    pub fn seller_amount(&self) -> Money {
        Money::from_kopecks(self.seller_amount_kopecks)
    }

    /// Looks up a flavor by exact name.
    pub fn flavor(&self, name: &str) -> Option<&Flavor> {
        self.flavors.iter().find(|f| f.name == name)
    }

    /// Total units on hand across all flavors (or the single quantity).
    pub fn units_in_stock(&self) -> i64 {
        if self.kind.has_flavors() {
            self.flavors.iter().fold(0i64, |acc, f| acc.saturating_add(f.quantity.max(0)))
        } else {
            self.quantity.unwrap_or(0).max(0)
        }
    }

    /// Whether anything of this product can still be sold.
    pub fn is_in_stock(&self) -> bool {
        self.units_in_stock() > 0
    }

    /// Sale value of the stock on hand (`units × sale price`); `None` on
    /// overflow.
    pub fn stock_value(&self) -> Option<Money> {
        self.sale_price().checked_mul(self.units_in_stock())
    }

    /// Human-readable name without flavor: `"Elf 30 ml"` or `"Vaporesso XROS"`.
    pub fn display_name(&self) -> String {
        match (self.kind.has_flavors(), self.volume_ml) {
            (true, Some(volume)) => format!("{} {} ml", self.brand, volume),
            _ => self.brand.clone(),
        }
    }

    /// Label of one sellable unit: `"Elf 30 ml Mint"` for liquids, the brand otherwise.
    pub fn unit_label(&self, flavor: Option<&str>) -> String {
        match (self.kind.has_flavors(), flavor) {
            (true, Some(name)) => format!("{} {}", self.display_name(), name),
            _ => self.display_name(),
        }
    }

    /// Units available for a given flavor (liquids) or of the product itself.
    ///
    /// ## Errors
    /// - `FlavorNotFound` when a liquid is addressed without a known flavor
    pub fn available(&self, flavor: Option<&str>) -> CoreResult<i64> {
        if !self.kind.has_flavors() {
            return Ok(self.quantity.unwrap_or(0));
        }

        let name = flavor.unwrap_or_default();
        self.flavor(name)
            .map(|f| f.quantity)
            .ok_or_else(|| CoreError::FlavorNotFound {
                brand: self.display_name(),
                flavor: name.to_string(),
            })
    }
}

// =============================================================================
// Product Forms
// =============================================================================

/// Raw product form as submitted by the arrival and edit screens.
///
/// Every field is optional so that validation can report exactly which one
/// is missing. Turn it into a [`ProductSpec`] with
/// [`crate::validation::validate_product_draft`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProductDraft {
    pub kind: Option<ProductKind>,
    #[serde(default)]
    pub brand: String,
    pub purchase_price_kopecks: Option<i64>,
    pub sale_price_kopecks: Option<i64>,
    pub seller_amount_kopecks: Option<i64>,
    pub image_url: Option<String>,
    pub volume_ml: Option<i64>,
    pub quantity: Option<i64>,
    #[serde(default)]
    pub flavors: Vec<Flavor>,
}

/// How a validated product holds its stock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StockSpec {
    /// Liquid: bottle size plus per-flavor quantities.
    Flavors { volume_ml: i64, flavors: Vec<Flavor> },
    /// Cartridge or nicobooster: one quantity.
    Units(i64),
}

/// A validated product form, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductSpec {
    pub kind: ProductKind,
    pub brand: String,
    pub purchase_price: Money,
    pub sale_price: Money,
    pub seller_amount: Money,
    pub image_url: String,
    pub stock: StockSpec,
}

impl ProductSpec {
    pub fn volume_ml(&self) -> Option<i64> {
        match &self.stock {
            StockSpec::Flavors { volume_ml, .. } => Some(*volume_ml),
            StockSpec::Units(_) => None,
        }
    }

    pub fn quantity(&self) -> Option<i64> {
        match &self.stock {
            StockSpec::Flavors { .. } => None,
            StockSpec::Units(qty) => Some(*qty),
        }
    }

    pub fn flavors(&self) -> &[Flavor] {
        match &self.stock {
            StockSpec::Flavors { flavors, .. } => flavors,
            StockSpec::Units(_) => &[],
        }
    }
}

/// Whether an arrival created a product or merged into an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum ArrivalKind {
    Added,
    Updated,
}

/// Result of an arrival write.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ArrivalOutcome {
    pub kind: ArrivalKind,
    pub product: Product,
}

/// Products of one brand, as shown in the seller's brand picker.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct BrandGroup {
    pub brand: String,
    pub products: Vec<Product>,
}

// =============================================================================
// Depletion Marker
// =============================================================================

/// Persisted flag that an item was already announced as sold out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DepletionMarker {
    /// Deterministic key, see [`crate::inventory::depletion_key`].
    pub id: String,
    /// Text used in the chat alert.
    pub label: String,
    #[ts(as = "String")]
    pub depleted_at: DateTime<Utc>,
}

// =============================================================================
// Sales
// =============================================================================

/// A completed checkout.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Sale {
    pub id: String,
    pub seller_email: String,
    pub total_kopecks: i64,
    pub cash_kopecks: i64,
    pub card_kopecks: i64,
    pub salary_kopecks: i64,
    pub profit_kopecks: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    pub items: Vec<SaleItem>,
}

impl Sale {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_kopecks(self.total_kopecks)
    }
}

/// A line of a completed checkout, with product data frozen at sale time.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SaleItem {
    pub id: String,
    pub sale_id: String,
    pub product_id: String,
    pub kind: ProductKind,
    pub label: String,
    pub flavor: Option<String>,
    pub unit_price_kopecks: i64,
    pub quantity: i64,
}

/// Everything the checkout produced, returned to the seller screen.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CheckoutSummary {
    pub sale: Sale,
    /// Items announced as sold out for the first time by this sale.
    pub depleted: Vec<DepletionMarker>,
    /// Ledger after the sale was applied.
    pub ledger: Ledger,
}

// =============================================================================
// Daily Sales
// =============================================================================

/// Per-day aggregate used by the stats chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DailySales {
    /// Shop-local date, `YYYY-MM-DD`.
    pub date: String,
    pub total_sum_kopecks: i64,
    pub profit_kopecks: i64,
    pub sales_count: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl DailySales {
    #[inline]
    pub fn total_sum(&self) -> Money {
        Money::from_kopecks(self.total_sum_kopecks)
    }

    #[inline]
    pub fn profit(&self) -> Money {
        Money::from_kopecks(self.profit_kopecks)
    }
}

// =============================================================================
// Cleanup
// =============================================================================

/// What the cleanup utility removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CleanupReport {
    /// Display names of products deleted outright.
    pub deleted: Vec<String>,
    /// Display names of liquids whose empty flavors were pruned.
    pub pruned: Vec<String>,
}

// =============================================================================
// Roles
// =============================================================================

/// Access level of a signed-in user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Role {
    Admin,
    Seller,
}

impl Role {
    /// Whether a user holding `self` may sign in as `requested`.
    ///
    /// Admins may open the seller screen; sellers never get admin.
    pub fn can_act_as(&self, requested: Role) -> bool {
        match (self, requested) {
            (Role::Admin, _) => true,
            (Role::Seller, Role::Seller) => true,
            (Role::Seller, Role::Admin) => false,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Seller => "seller",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
