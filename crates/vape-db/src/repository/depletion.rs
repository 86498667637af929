//! # Depletion Marker Repository
//!
//! Remembers which items were already announced as sold out so that the
//! chat gets one alert per item, not one per sale.
//!
//! Markers survive restocking. An admin clears one explicitly to have the
//! item announced again.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use vape_core::DepletionMarker;

use crate::error::{DbError, DbResult};

#[derive(Debug, sqlx::FromRow)]
struct MarkerRow {
    id: String,
    label: String,
    depleted_at: DateTime<Utc>,
}

impl From<MarkerRow> for DepletionMarker {
    fn from(row: MarkerRow) -> Self {
        DepletionMarker {
            id: row.id,
            label: row.label,
            depleted_at: row.depleted_at,
        }
    }
}

/// Records a marker unless one with this id exists.
///
/// Returns the marker only when this call created it.
pub(crate) async fn mark_once(
    conn: &mut SqliteConnection,
    id: &str,
    label: &str,
    at: DateTime<Utc>,
) -> DbResult<Option<DepletionMarker>> {
    let result = sqlx::query("INSERT OR IGNORE INTO depletion_markers (id, label, depleted_at) VALUES (?1, ?2, ?3)")
        .bind(id)
        .bind(label)
        .bind(at)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        debug!(id = %id, "Depletion already announced");
        return Ok(None);
    }

    info!(id = %id, label = %label, "Item depleted");
    Ok(Some(DepletionMarker {
        id: id.to_string(),
        label: label.to_string(),
        depleted_at: at,
    }))
}

/// Repository for depletion markers.
#[derive(Debug, Clone)]
pub struct DepletionRepository {
    pool: SqlitePool,
}

impl DepletionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        DepletionRepository { pool }
    }

    /// All markers, newest first.
    pub async fn list(&self) -> DbResult<Vec<DepletionMarker>> {
        let rows: Vec<MarkerRow> =
            sqlx::query_as("SELECT id, label, depleted_at FROM depletion_markers ORDER BY depleted_at DESC, id")
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(DepletionMarker::from).collect())
    }

    /// Removes a marker so the item can be announced again.
    pub async fn clear(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM depletion_markers WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Depletion marker", id));
        }

        info!(id = %id, "Depletion marker cleared");
        Ok(())
    }
}
