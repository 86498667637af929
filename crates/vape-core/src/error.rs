//! # Domain Errors
//!
//! [`ValidationError`] rejects bad form input before anything is written.
//! [`CoreError`] covers business rules that can fail at any layer, including
//! inside a database transaction (stock guards, kind checks).
//!
//! ```text
//! ValidationError ──► CoreError::Validation ──► DbError::Domain ──► ApiError
//! ```

use thiserror::Error;

use crate::money::Money;

#[derive(Debug, Error)]
pub enum CoreError {
    /// Unknown id, or a product removed by cleanup while it sat in a cart.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    #[error("Flavor '{flavor}' not found for {brand}")]
    FlavorNotFound { brand: String, flavor: String },

    /// Two sellers raced for the last unit; the loser gets this at checkout.
    #[error("Insufficient stock for {item}: available {available}, requested {requested}")]
    InsufficientStock { item: String, available: i64, requested: i64 },

    #[error("Cart is empty")]
    EmptyCart,

    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// Split payment halves must sum to the cart total exactly.
    #[error("Payment split {cash} + {card} does not match total {total}")]
    PaymentMismatch { cash: Money, card: Money, total: Money },

    #[error("Invalid payment amount: {reason}")]
    InvalidPaymentAmount { reason: String },

    /// Shelf value no longer fits in `i64` kopecks.
    #[error("Amount overflow while computing {what}")]
    AmountOverflow { what: String },

    /// A product's kind is fixed at creation.
    #[error("Product {id} is {actual}, cannot be changed to {requested}")]
    KindMismatch { id: String, actual: String, requested: String },

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Stock ran out between adding to the cart and checking out.
    pub fn is_stock_conflict(&self) -> bool {
        matches!(self, CoreError::InsufficientStock { .. } | CoreError::FlavorNotFound { .. })
    }
}

/// Form input problems, one field at a time.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: String },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    #[error("{field} must be positive")]
    MustBePositive { field: String },

    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

impl ValidationError {
    /// Name of the offending form field.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::TooLong { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::MustBePositive { field }
            | ValidationError::InvalidFormat { field, .. }
            | ValidationError::NotAllowed { field, .. } => field,
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            item: "Elf 30 ml Mint".to_string(),
            available: 0,
            requested: 1,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Elf 30 ml Mint: available 0, requested 1"
        );
    }

    #[test]
    fn test_stock_conflicts() {
        let gone = CoreError::FlavorNotFound {
            brand: "Elf".to_string(),
            flavor: "Mint".to_string(),
        };
        assert!(gone.is_stock_conflict());
        assert!(!CoreError::EmptyCart.is_stock_conflict());
    }

    #[test]
    fn test_payment_mismatch_message() {
        let err = CoreError::PaymentMismatch {
            cash: Money::from_hryvnias(100),
            card: Money::from_hryvnias(40),
            total: Money::from_hryvnias(150),
        };
        assert_eq!(err.to_string(), "Payment split 100 + 40 does not match total 150");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "brand".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(ref e) if e.field() == "brand"));
        assert_eq!(core_err.to_string(), "Validation error: brand is required");
    }
}
