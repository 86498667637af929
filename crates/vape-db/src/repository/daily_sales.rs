//! # Daily Sales Repository
//!
//! One row per shop-local date, bumped by every checkout and read by the
//! stats chart.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use vape_core::{DailySales, Money};

use crate::error::DbResult;

#[derive(Debug, sqlx::FromRow)]
struct DailySalesRow {
    date: String,
    total_sum_kopecks: i64,
    profit_kopecks: i64,
    sales_count: i64,
    created_at: DateTime<Utc>,
}

impl From<DailySalesRow> for DailySales {
    fn from(row: DailySalesRow) -> Self {
        DailySales {
            date: row.date,
            total_sum_kopecks: row.total_sum_kopecks,
            profit_kopecks: row.profit_kopecks,
            sales_count: row.sales_count,
            created_at: row.created_at,
        }
    }
}

/// Adds one checkout to the row of `date` (`YYYY-MM-DD`), creating it if needed.
pub(crate) async fn record(
    conn: &mut SqliteConnection,
    date: &str,
    total: Money,
    profit: Money,
    now: DateTime<Utc>,
) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO daily_sales (date, total_sum_kopecks, profit_kopecks, sales_count, created_at)
        VALUES (?1, ?2, ?3, 1, ?4)
        ON CONFLICT (date) DO UPDATE SET
            total_sum_kopecks = total_sum_kopecks + excluded.total_sum_kopecks,
            profit_kopecks = profit_kopecks + excluded.profit_kopecks,
            sales_count = sales_count + 1
        "#,
    )
    .bind(date)
    .bind(total.kopecks())
    .bind(profit.kopecks())
    .bind(now)
    .execute(&mut *conn)
    .await?;

    debug!(date = %date, total = %total, profit = %profit, "Daily sales recorded");
    Ok(())
}

/// Repository for daily aggregates.
#[derive(Debug, Clone)]
pub struct DailySalesRepository {
    pool: SqlitePool,
}

impl DailySalesRepository {
    pub fn new(pool: SqlitePool) -> Self {
        DailySalesRepository { pool }
    }

    /// All days, oldest first.
    pub async fn list(&self) -> DbResult<Vec<DailySales>> {
        let rows: Vec<DailySalesRow> = sqlx::query_as(
            "SELECT date, total_sum_kopecks, profit_kopecks, sales_count, created_at FROM daily_sales ORDER BY date",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(DailySales::from).collect())
    }

    /// One day, if anything was sold on it.
    pub async fn get(&self, date: &str) -> DbResult<Option<DailySales>> {
        let row: Option<DailySalesRow> = sqlx::query_as(
            "SELECT date, total_sum_kopecks, profit_kopecks, sales_count, created_at FROM daily_sales WHERE date = ?1",
        )
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(DailySales::from))
    }
}
