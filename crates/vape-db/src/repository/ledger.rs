//! # Ledger Repository
//!
//! Reads and writes the singleton `ledger` row (`id = 'current'`).
//!
//! ## Write Paths
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  apply_patch (manual edit, report refresh)                              │
//! │    begin_write → load products → total → read row → merge → upsert     │
//! │                                                                         │
//! │  apply_sale (checkout, inside the sale transaction)                     │
//! │    INSERT ... ON CONFLICT DO UPDATE SET cash = cash + excluded.cash     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A missing row reads as all zeros; the first write creates it.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use vape_core::inventory;
use vape_core::ledger::SaleDelta;
use vape_core::{Ledger, LedgerPatch, Money, LEDGER_ID};

use crate::error::DbResult;
use crate::repository::{begin_write, product};

#[derive(Debug, sqlx::FromRow)]
struct LedgerRow {
    total_kopecks: i64,
    cash_kopecks: i64,
    card_kopecks: i64,
    salary_kopecks: i64,
    mine_kopecks: i64,
}

impl From<LedgerRow> for Ledger {
    fn from(row: LedgerRow) -> Self {
        Ledger {
            total: Money::from_kopecks(row.total_kopecks),
            cash: Money::from_kopecks(row.cash_kopecks),
            card: Money::from_kopecks(row.card_kopecks),
            salary: Money::from_kopecks(row.salary_kopecks),
            mine: Money::from_kopecks(row.mine_kopecks),
        }
    }
}

pub(crate) async fn read(conn: &mut SqliteConnection) -> DbResult<Option<Ledger>> {
    let row: Option<LedgerRow> = sqlx::query_as(
        r#"
        SELECT total_kopecks, cash_kopecks, card_kopecks, salary_kopecks, mine_kopecks
        FROM ledger WHERE id = ?1
        "#,
    )
    .bind(LEDGER_ID)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(row.map(Ledger::from))
}

async fn write(conn: &mut SqliteConnection, ledger: &Ledger, now: DateTime<Utc>) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO ledger (id, total_kopecks, cash_kopecks, card_kopecks, salary_kopecks, mine_kopecks, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        ON CONFLICT (id) DO UPDATE SET
            total_kopecks = excluded.total_kopecks,
            cash_kopecks = excluded.cash_kopecks,
            card_kopecks = excluded.card_kopecks,
            salary_kopecks = excluded.salary_kopecks,
            mine_kopecks = excluded.mine_kopecks,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(LEDGER_ID)
    .bind(ledger.total.kopecks())
    .bind(ledger.cash.kopecks())
    .bind(ledger.card.kopecks())
    .bind(ledger.salary.kopecks())
    .bind(ledger.mine.kopecks())
    .bind(now)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Adds a checkout's delta and sets the new remaining total.
pub(crate) async fn apply_sale(
    conn: &mut SqliteConnection,
    delta: &SaleDelta,
    total: Money,
    now: DateTime<Utc>,
) -> DbResult<Ledger> {
    sqlx::query(
        r#"
        INSERT INTO ledger (id, total_kopecks, cash_kopecks, card_kopecks, salary_kopecks, mine_kopecks, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        ON CONFLICT (id) DO UPDATE SET
            total_kopecks = excluded.total_kopecks,
            cash_kopecks = cash_kopecks + excluded.cash_kopecks,
            card_kopecks = card_kopecks + excluded.card_kopecks,
            salary_kopecks = salary_kopecks + excluded.salary_kopecks,
            mine_kopecks = mine_kopecks + excluded.mine_kopecks,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(LEDGER_ID)
    .bind(total.kopecks())
    .bind(delta.cash.kopecks())
    .bind(delta.card.kopecks())
    .bind(delta.salary.kopecks())
    .bind(delta.mine.kopecks())
    .bind(now)
    .execute(&mut *conn)
    .await?;

    Ok(read(conn).await?.unwrap_or_default())
}

/// Recomputes the total and merges a patch, all on one connection.
pub(crate) async fn merge_patch(conn: &mut SqliteConnection, patch: &LedgerPatch, now: DateTime<Utc>) -> DbResult<Ledger> {
    let products = product::load_all(conn, None).await?;
    let total = inventory::remaining_total(&products)?;

    let stored = read(conn).await?.unwrap_or_default();
    let merged = stored.merge(patch, total);
    write(conn, &merged, now).await?;

    Ok(merged)
}

/// Repository for the ledger row.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    pool: SqlitePool,
}

impl LedgerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        LedgerRepository { pool }
    }

    /// Current balances (zeros when the row was never written).
    pub async fn get(&self) -> DbResult<Ledger> {
        let mut conn = self.pool.acquire().await?;
        Ok(read(&mut conn).await?.unwrap_or_default())
    }

    /// Whether the row has been written yet.
    pub async fn exists(&self) -> DbResult<bool> {
        let mut conn = self.pool.acquire().await?;
        Ok(read(&mut conn).await?.is_some())
    }

    /// Merges absolute values over the stored row and refreshes `total`.
    ///
    /// Applying the same patch twice stores the same row.
    pub async fn apply_patch(&self, patch: &LedgerPatch) -> DbResult<Ledger> {
        let mut tx = begin_write(&self.pool).await?;
        let ledger = merge_patch(&mut tx, patch, Utc::now()).await?;
        tx.commit().await?;

        if patch.is_empty() {
            debug!(total = %ledger.total, "Ledger total refreshed");
        } else {
            info!(
                total = %ledger.total,
                cash = %ledger.cash,
                card = %ledger.card,
                salary = %ledger.salary,
                mine = %ledger.mine,
                "Ledger updated"
            );
        }
        Ok(ledger)
    }

    /// Refreshes `total` only.
    pub async fn refresh_total(&self) -> DbResult<Ledger> {
        self.apply_patch(&LedgerPatch::default()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::product::tests::liquid_spec;

    #[tokio::test]
    async fn test_missing_row_reads_as_zeros() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        assert_eq!(db.ledger().get().await.unwrap(), Ledger::default());
        assert!(!db.ledger().exists().await.unwrap());
    }

    #[tokio::test]
    async fn test_patch_merges_and_recomputes_total() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.products().insert(&liquid_spec("Elf", 100, &[("Mint", 5)])).await.unwrap();

        let patch = LedgerPatch {
            cash: Some(Money::from_hryvnias(250)),
            ..LedgerPatch::default()
        };
        let ledger = db.ledger().apply_patch(&patch).await.unwrap();

        assert_eq!(ledger.total, Money::from_hryvnias(500));
        assert_eq!(ledger.cash, Money::from_hryvnias(250));
        assert_eq!(ledger.card, Money::zero());
        assert!(db.ledger().exists().await.unwrap());
    }

    #[tokio::test]
    async fn test_patch_is_idempotent() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let patch = LedgerPatch {
            salary: Some(Money::from_hryvnias(40)),
            mine: Some(Money::from_hryvnias(60)),
            ..LedgerPatch::default()
        };

        let once = db.ledger().apply_patch(&patch).await.unwrap();
        let twice = db.ledger().apply_patch(&patch).await.unwrap();
        assert_eq!(once, twice);
        assert_eq!(db.ledger().get().await.unwrap(), once);
    }

    #[tokio::test]
    async fn test_refresh_total_keeps_balances() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.ledger()
            .apply_patch(&LedgerPatch {
                card: Some(Money::from_hryvnias(70)),
                ..LedgerPatch::default()
            })
            .await
            .unwrap();

        db.products().insert(&liquid_spec("Elf", 100, &[("Mint", 2)])).await.unwrap();
        let ledger = db.ledger().refresh_total().await.unwrap();

        assert_eq!(ledger.total, Money::from_hryvnias(200));
        assert_eq!(ledger.card, Money::from_hryvnias(70));
    }
}
