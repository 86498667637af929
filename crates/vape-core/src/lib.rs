//! # vape-core: Pure Business Logic for Vape POS
//!
//! This crate is the **heart** of Vape POS. It contains all business logic
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Vape POS Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Web Frontend                                 │   │
//! │  │   Type ──► Brand ──► Flavor ──► Cart ──► Payment ──► Checkout  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTP / JSON                            │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    apps/server (axum)                           │   │
//! │  │    checkout, arrival, discard, ledger edit, telegram relay     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ vape-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │  ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐  │   │
//! │  │  │  types  │ │  money  │ │  cart   │ │ ledger  │ │ report  │  │   │
//! │  │  │ Product │ │  Money  │ │  Cart   │ │ Ledger  │ │ Telegram│  │   │
//! │  │  │ Flavor  │ │         │ │ Payment │ │ Patch   │ │ texts   │  │   │
//! │  │  └─────────┘ └─────────┘ └─────────┘ └─────────┘ └─────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    vape-db (Database Layer)                     │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Flavor, DailySales, etc.)
//! - [`money`] - Money type with integer arithmetic (kopecks, no floats)
//! - [`cart`] - Seller cart and payment split resolution
//! - [`inventory`] - Stock value, flavor merging, depletion keys, cleanup rules
//! - [`ledger`] - The shared running-balance record and its merge rules
//! - [`report`] - Chat message formatting
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Example Usage
//!
//! ```rust
//! use vape_core::money::Money;
//!
//! // Create money from kopecks (never from floats!)
//! let price = Money::from_kopecks(15_000); // 150 грн
//!
//! // Five bottles on the shelf
//! assert_eq!(price.multiply_quantity(5), Money::from_hryvnias(750));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod inventory;
pub mod ledger;
pub mod money;
pub mod report;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartLine, CartTotals, PaymentRequest, PaymentSplit, PaymentType};
pub use error::{CoreError, CoreResult, ValidationError};
pub use ledger::{Ledger, LedgerPatch};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct lines allowed in a single cart.
pub const MAX_CART_ITEMS: usize = 50;

/// Maximum quantity of a single line in a cart.
///
/// ## Business Reason
/// A seller taps once per bottle; anything above this is a typo.
pub const MAX_ITEM_QUANTITY: i64 = 99;

/// Highest price accepted on a product form: 100 000 грн.
pub const MAX_PRICE_KOPECKS: i64 = 10_000_000;

/// Highest stock count for one product or flavor.
///
/// Together with [`MAX_PRICE_KOPECKS`] this keeps the shelf value far inside
/// `i64` kopecks.
pub const MAX_STOCK_QUANTITY: i64 = 100_000;

/// Liquid bottle sizes the shop stocks, in millilitres.
pub const LIQUID_VOLUMES_ML: [i64; 3] = [10, 15, 30];

/// Identifier of the singleton ledger row.
pub const LEDGER_ID: &str = "current";
