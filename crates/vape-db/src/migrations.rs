//! # Schema Migrations
//!
//! The schema lives in `migrations/sqlite/` and is compiled into the binary,
//! so a fresh shop database is created on first start.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Database::new                                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  MIGRATOR.run ── applies 001_initial_schema.sql (+ later files)         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  verify_schema ── every table the repositories touch must exist         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Applied files are checksummed by sqlx. Add a new `NNN_*.sql` file for every
//! schema change instead of editing one that already shipped.

use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Tables the repositories read and write.
pub const REQUIRED_TABLES: &[&str] = &[
    "products",
    "product_flavors",
    "ledger",
    "depletion_markers",
    "daily_sales",
    "sales",
    "sale_items",
];

/// Applies pending migrations, then checks the resulting schema.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    MIGRATOR.run(pool).await?;
    verify_schema(pool).await?;

    info!(migrations = MIGRATOR.migrations.len(), "Database schema is up to date");
    Ok(())
}

/// Fails with [`DbError::MigrationFailed`] naming the first missing table.
pub async fn verify_schema(pool: &SqlitePool) -> DbResult<()> {
    for table in REQUIRED_TABLES {
        let found: Option<String> =
            sqlx::query_scalar("SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?")
                .bind(*table)
                .fetch_optional(pool)
                .await?;

        if found.is_none() {
            return Err(DbError::MigrationFailed(format!("table '{}' is missing", table)));
        }
        debug!(table = *table, "Schema table present");
    }
    Ok(())
}

/// `(embedded, applied)` migration counts, for diagnostics.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<(usize, usize)> {
    let total = MIGRATOR.migrations.len();

    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = 1")
        .fetch_one(pool)
        .await?;

    Ok((total, applied as usize))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_fresh_database_has_full_schema() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        verify_schema(db.pool()).await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_table_is_reported() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        sqlx::query("DROP TABLE depletion_markers").execute(db.pool()).await.unwrap();

        let err = verify_schema(db.pool()).await.unwrap_err();
        assert!(matches!(err, DbError::MigrationFailed(ref msg) if msg.contains("depletion_markers")));
    }
}
