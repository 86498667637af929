//! # vape-db: Database Layer for Vape POS
//!
//! This crate provides database access for the Vape POS server.
//! It uses SQLite for storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Vape POS Data Flow                               │
//! │                                                                         │
//! │  HTTP handler (POST /api/cart/checkout)                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     vape-db (THIS CRATE)                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ ProductRepo   │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ SaleRepo      │    │ 001_initial  │  │   │
//! │  │   │ WAL, FKs      │    │ LedgerRepo    │    │   _schema    │  │   │
//! │  │   │               │    │ DepletionRepo │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │   <data dir>/vape.db                                           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (product, sale, ledger, ...)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vape_db::{Database, DbConfig};
//!
//! // Opens the file and applies migrations
//! let db = Database::new(DbConfig::new("path/to/vape.db")).await?;
//!
//! // Use repositories
//! let liquids = db.products().list(Some(ProductKind::Liquids)).await?;
//! let ledger = db.ledger().get().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::daily_sales::DailySalesRepository;
pub use repository::depletion::DepletionRepository;
pub use repository::ledger::LedgerRepository;
pub use repository::product::{DiscardOutcome, ProductRepository};
pub use repository::sale::{CheckoutRequest, SaleRepository};
