//! # Validation Module
//!
//! Input validation utilities for Vape POS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Web frontend                                                 │
//! │  ├── Required fields, number inputs                                    │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: HTTP handler (Rust)                                          │
//! │  ├── Type validation (JSON deserialization)                            │
//! │  └── THIS MODULE: Business rule validation                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK (quantity >= 0) constraints                      │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use vape_core::validation::{validate_brand, validate_quantity};
//!
//! assert_eq!(validate_brand("  Elf Liq ").unwrap(), "Elf Liq");
//! validate_quantity(5).unwrap();
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{Flavor, ProductDraft, ProductKind, ProductSpec, StockSpec};
use crate::{LIQUID_VOLUMES_ML, MAX_CART_ITEMS, MAX_ITEM_QUANTITY, MAX_PRICE_KOPECKS, MAX_STOCK_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Which screen a product form came from.
///
/// Arrivals must bring stock; edits may leave a liquid with no flavors left
/// (the cleanup utility removes it later).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftMode {
    Arrival,
    Edit,
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates a brand name and returns it trimmed.
///
/// ## Rules
/// - Must not be empty
/// - At most 100 characters
pub fn validate_brand(brand: &str) -> ValidationResult<String> {
    let brand = brand.trim();

    if brand.is_empty() {
        return Err(ValidationError::Required {
            field: "brand".to_string(),
        });
    }

    if brand.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: "brand".to_string(),
            max: 100,
        });
    }

    Ok(brand.to_string())
}

/// Validates a flavor name and returns it trimmed.
pub fn validate_flavor_name(name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "flavor".to_string(),
        });
    }

    if name.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: "flavor".to_string(),
            max: 100,
        });
    }

    Ok(name.to_string())
}

/// Validates a sign-in email.
///
/// Only the shape is checked: one `@`, something on both sides, no spaces.
pub fn validate_email(email: &str) -> ValidationResult<String> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::Required {
            field: "email".to_string(),
        });
    }

    if email.len() > 254 {
        return Err(ValidationError::TooLong {
            field: "email".to_string(),
            max: 254,
        });
    }

    let invalid = || ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: "must look like name@domain".to_string(),
    };

    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => {
            Ok(email.to_lowercase())
        }
        _ => Err(invalid()),
    }
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a cart line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY
///
/// ## User Workflow
/// ```text
/// Seller taps "+" on a flavor
///      │
///      ▼
/// validate_quantity(n) ← THIS FUNCTION
///      │
///      ├── n <= 0?  → Error: "quantity must be positive"
///      ├── n > 99?  → Error: "quantity must be between 1 and 99"
///      └── OK → Cart::add_item
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a stock quantity (zero allowed, at most [`MAX_STOCK_QUANTITY`]).
pub fn validate_stock_quantity(field: &str, qty: i64) -> ValidationResult<()> {
    if !(0..=MAX_STOCK_QUANTITY).contains(&qty) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_STOCK_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price in kopecks.
///
/// ## Example
/// ```rust
/// use vape_core::validation::validate_price_kopecks;
///
/// assert!(validate_price_kopecks("salePrice", 15000).is_ok());
/// assert!(validate_price_kopecks("salePrice", 0).is_ok());
/// assert!(validate_price_kopecks("salePrice", -100).is_err());
/// assert!(validate_price_kopecks("salePrice", 1_000_000_000_000_000).is_err());
/// ```
pub fn validate_price_kopecks(field: &str, kopecks: i64) -> ValidationResult<()> {
    if !(0..=MAX_PRICE_KOPECKS).contains(&kopecks) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_PRICE_KOPECKS,
        });
    }

    Ok(())
}

/// Validates a cash or card part of a payment (zero allowed in a split).
pub fn validate_payment_amount(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a liquid bottle size.
pub fn validate_volume(volume_ml: i64) -> ValidationResult<()> {
    if !LIQUID_VOLUMES_ML.contains(&volume_ml) {
        return Err(ValidationError::NotAllowed {
            field: "volume".to_string(),
            allowed: LIQUID_VOLUMES_ML.iter().map(|v| v.to_string()).collect(),
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates cart size before adding a new line.
pub fn validate_cart_size(current_items: usize) -> ValidationResult<()> {
    if current_items >= MAX_CART_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "cart items".to_string(),
            min: 0,
            max: MAX_CART_ITEMS as i64,
        });
    }

    Ok(())
}

/// Validates the flavor list of a liquid form.
///
/// Entries with an empty name are dropped. Every remaining entry needs a
/// quantity of at least 1. An arrival must keep at least one flavor.
pub fn validate_flavors(flavors: &[Flavor], mode: DraftMode) -> ValidationResult<Vec<Flavor>> {
    let mut kept = Vec::with_capacity(flavors.len());

    for flavor in flavors {
        if flavor.name.trim().is_empty() {
            continue;
        }
        let name = validate_flavor_name(&flavor.name)?;
        if flavor.quantity < 1 {
            return Err(ValidationError::MustBePositive {
                field: format!("quantity of {}", name),
            });
        }
        validate_stock_quantity(&format!("quantity of {}", name), flavor.quantity)?;
        kept.push(Flavor::new(name, flavor.quantity));
    }

    if mode == DraftMode::Arrival && kept.is_empty() {
        return Err(ValidationError::Required {
            field: "flavors".to_string(),
        });
    }

    Ok(kept)
}

// =============================================================================
// Product Form
// =============================================================================

fn required_price(field: &str, value: Option<i64>) -> ValidationResult<Money> {
    let kopecks = value.ok_or_else(|| ValidationError::Required {
        field: field.to_string(),
    })?;
    validate_price_kopecks(field, kopecks)?;
    Ok(Money::from_kopecks(kopecks))
}

/// Validates the arrival / edit product form.
///
/// ## Rules
/// - kind, brand, the three prices and the image are required
/// - prices are between 0 and 100 000 грн
/// - liquids need a volume of 10, 15 or 30 ml plus valid flavors
/// - cartridges and nicoboosters need a quantity >= 0
pub fn validate_product_draft(draft: &ProductDraft, mode: DraftMode) -> ValidationResult<ProductSpec> {
    let kind = draft.kind.ok_or_else(|| ValidationError::Required {
        field: "kind".to_string(),
    })?;
    let brand = validate_brand(&draft.brand)?;
    let purchase_price = required_price("purchasePrice", draft.purchase_price_kopecks)?;
    let sale_price = required_price("salePrice", draft.sale_price_kopecks)?;
    let seller_amount = required_price("sellerAmount", draft.seller_amount_kopecks)?;

    let image_url = draft
        .image_url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .ok_or_else(|| ValidationError::Required {
            field: "imageUrl".to_string(),
        })?
        .to_string();

    let stock = match kind {
        ProductKind::Liquids => {
            let volume_ml = draft.volume_ml.ok_or_else(|| ValidationError::Required {
                field: "volume".to_string(),
            })?;
            validate_volume(volume_ml)?;
            StockSpec::Flavors {
                volume_ml,
                flavors: validate_flavors(&draft.flavors, mode)?,
            }
        }
        ProductKind::Cartridges | ProductKind::Nicoboosters => {
            let qty = draft.quantity.ok_or_else(|| ValidationError::Required {
                field: "quantity".to_string(),
            })?;
            validate_stock_quantity("quantity", qty)?;
            StockSpec::Units(qty)
        }
    };

    Ok(ProductSpec {
        kind,
        brand,
        purchase_price,
        sale_price,
        seller_amount,
        image_url,
        stock,
    })
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string format.
///
/// ## Example
/// ```rust
/// use vape_core::validation::validate_uuid;
///
/// assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("not-a-uuid").is_err());
/// ```
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
