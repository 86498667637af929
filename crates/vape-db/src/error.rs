//! # Database Errors
//!
//! ```text
//! sqlx::Error ─────┐
//!                  ├──► DbError ──► ApiError (apps/server) ──► JSON {code, message}
//! CoreError ───────┘    (stock guard or kind check failed mid-transaction)
//! ```
//!
//! SQLite reports constraint failures only as message text, so the
//! classification below matches on the message prefix.

use thiserror::Error;
use vape_core::CoreError;

#[derive(Debug, Error)]
pub enum DbError {
    /// Unknown product id, or a depletion marker that was already cleared.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A second flavor row with the same name on one product, and similar.
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Another writer held the lock past `busy_timeout`, or the pool had no
    /// free connection in time.
    #[error("Database busy: {0}")]
    Busy(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// SQL or CHECK-constraint failure (e.g. a negative quantity slipped past
    /// validation).
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// A business rule rejected the write; the transaction was rolled back.
    #[error(transparent)]
    Domain(#[from] CoreError),

    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Whether retrying the same request later could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, DbError::Busy(_))
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Record", "unknown"),

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();
                if let Some(column) = msg.strip_prefix("UNIQUE constraint failed: ") {
                    DbError::UniqueViolation {
                        field: column.to_string(),
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation { message: msg.to_string() }
                } else if msg.contains("database is locked") || msg.contains("database is busy") {
                    DbError::Busy(msg.to_string())
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::Busy("no free connection".to_string()),
            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),
            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

pub type DbResult<T> = Result<T, DbError>;
