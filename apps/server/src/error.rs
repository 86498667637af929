//! # API Errors
//!
//! Every handler returns [`ApiResult`]. Failures leave as a status code plus a
//! small JSON body the frontend can switch on:
//!
//! ```text
//! ValidationError ─┐
//! CoreError ───────┼──► ApiError { code, message } ──► 4xx / 5xx + JSON
//! DbError ─────────┤
//! ImageError ──────┘
//!
//! 409 {"code":"INSUFFICIENT_STOCK","message":"Not enough stock for Elf 30 ml Mint: ..."}
//! ```
//!
//! Storage failures are logged with their detail and answered with a generic
//! message; business-rule failures pass their text through unchanged.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use vape_core::{CoreError, ValidationError};
use vape_db::DbError;

use crate::images::ImageError;

#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    NotFound,
    ValidationError,
    DatabaseError,
    /// Another checkout held the write lock too long; safe to retry.
    DatabaseBusy,
    /// e.g. changing a product's kind through an edit.
    BusinessLogic,
    Internal,
    CartError,
    InsufficientStock,
    PaymentError,
    Unauthorized,
    Forbidden,
}

impl ErrorCode {
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::ValidationError | ErrorCode::CartError | ErrorCode::PaymentError => StatusCode::BAD_REQUEST,
            ErrorCode::BusinessLogic => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCode::InsufficientStock => StatusCode::CONFLICT,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ErrorCode::DatabaseBusy => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::DatabaseError | ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Unauthorized, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Forbidden, message)
    }

    pub fn status(&self) -> StatusCode {
        self.code.status()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        let storage_failure = |what: &str, detail: &str| {
            tracing::error!(detail, "{}", what);
            ApiError::new(ErrorCode::DatabaseError, what)
        };

        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, .. } => ApiError::validation(format!("{} already exists", field)),
            DbError::ForeignKeyViolation { message } => {
                tracing::error!(%message, "Foreign key violation");
                ApiError::validation("Invalid reference")
            }
            DbError::Domain(core) => ApiError::from(core),
            DbError::Busy(detail) => {
                tracing::warn!(%detail, "Database busy");
                ApiError::new(ErrorCode::DatabaseBusy, "Database is busy, try again")
            }
            DbError::ConnectionFailed(e) => storage_failure("Database connection failed", &e),
            DbError::MigrationFailed(e) => storage_failure("Database migration failed", &e),
            DbError::QueryFailed(e) | DbError::Internal(e) => storage_failure("Database operation failed", &e),
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        match err {
            CoreError::ProductNotFound(id) => ApiError::not_found("Product", &id),
            CoreError::FlavorNotFound { .. } => ApiError::new(ErrorCode::NotFound, message),
            CoreError::InsufficientStock { .. } => ApiError::new(ErrorCode::InsufficientStock, message),
            CoreError::EmptyCart | CoreError::CartTooLarge { .. } => ApiError::new(ErrorCode::CartError, message),
            CoreError::QuantityTooLarge { .. } => ApiError::validation(message),
            CoreError::PaymentMismatch { .. } | CoreError::InvalidPaymentAmount { .. } => {
                ApiError::new(ErrorCode::PaymentError, message)
            }
            CoreError::KindMismatch { .. } | CoreError::AmountOverflow { .. } => {
                ApiError::new(ErrorCode::BusinessLogic, message)
            }
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        tracing::debug!(field = err.field(), "Rejected input");
        ApiError::validation(err.to_string())
    }
}

impl From<ImageError> for ApiError {
    fn from(err: ImageError) -> Self {
        match err {
            ImageError::Empty => ApiError::validation(err.to_string()),
            ImageError::Io(ref e) => {
                tracing::error!(error = %e, "Image write failed");
                ApiError::internal("Failed to store image")
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

pub type ApiResult<T> = Result<T, ApiError>;
