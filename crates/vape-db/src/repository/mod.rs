//! # Repository Module
//!
//! Database repository implementations for Vape POS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  HTTP handler / service                                                │
//! │       │                                                                 │
//! │       │  db.sales().checkout(&request)                                  │
//! │       ▼                                                                 │
//! │  SaleRepository::checkout (one transaction)                            │
//! │  ├── product::take_stock      guarded decrement, prune at zero         │
//! │  ├── depletion::mark_once     INSERT OR IGNORE                         │
//! │  ├── ledger::apply_sale       cash = cash + ?, ...                     │
//! │  ├── daily_sales::record      upsert by date                           │
//! │  └── INSERT sales / sale_items                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each repository owns a pool handle. Steps that must share a transaction
//! are `pub(crate)` functions over `&mut SqliteConnection` so that several
//! repositories can work inside one `Transaction`.
//!
//! ## Available Repositories
//!
//! - [`product::ProductRepository`] - Products, flavors, arrivals, discards, cleanup
//! - [`ledger::LedgerRepository`] - The singleton running-balance row
//! - [`depletion::DepletionRepository`] - Sold-out markers
//! - [`daily_sales::DailySalesRepository`] - Per-day aggregates
//! - [`sale::SaleRepository`] - Checkout and sales history

use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::error::DbResult;

pub mod daily_sales;
pub mod depletion;
pub mod ledger;
pub mod product;
pub mod sale;

/// Begins a transaction that holds SQLite's write lock from the start.
///
/// A deferred transaction that reads first cannot wait for the lock once
/// another writer has committed in between, so the first statement is a
/// (no-op) write.
pub(crate) async fn begin_write(pool: &SqlitePool) -> DbResult<Transaction<'static, Sqlite>> {
    let mut tx = pool.begin().await?;
    sqlx::query("UPDATE ledger SET id = id WHERE 0")
        .execute(&mut *tx)
        .await?;
    Ok(tx)
}
