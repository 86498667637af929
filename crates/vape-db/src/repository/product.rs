//! # Product Repository
//!
//! Database operations for products and their flavors.
//!
//! ## Key Operations
//! - Catalog reads (all products, by kind, by id)
//! - Arrival: merge into an existing liquid or insert a new product
//! - Edit, delete, discard one unit
//! - Cleanup of sold-out stock
//!
//! ## Guarded Decrement
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │               Two sellers sell the last "Mint" at once                  │
//! │                                                                         │
//! │  Seller A (tx)                         Seller B (tx)                    │
//! │  UPDATE product_flavors                                                 │
//! │     SET quantity = quantity - 1                                         │
//! │   WHERE ... AND quantity >= 1   ──► 1 row                               │
//! │  COMMIT                                                                 │
//! │                                        UPDATE ... quantity >= 1 ──► 0   │
//! │                                        InsufficientStock, ROLLBACK      │
//! │                                                                         │
//! │  The check and the write are one statement, so no sale is lost and     │
//! │  stock never goes negative.                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};
use uuid::Uuid;

use vape_core::inventory::{self, CleanupAction};
use vape_core::validation::validate_stock_quantity;
use vape_core::{
    ArrivalKind, ArrivalOutcome, CleanupReport, CoreError, DepletionMarker, Flavor, Money, Product,
    ProductKind, ProductSpec,
};

use crate::error::{DbError, DbResult};
use crate::repository::{begin_write, depletion};

// =============================================================================
// Rows
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: String,
    kind: ProductKind,
    brand: String,
    purchase_price_kopecks: i64,
    sale_price_kopecks: i64,
    seller_amount_kopecks: i64,
    image_url: String,
    volume_ml: Option<i64>,
    quantity: Option<i64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProductRow {
    fn into_product(self, flavors: Vec<Flavor>) -> Product {
        Product {
            id: self.id,
            kind: self.kind,
            brand: self.brand,
            purchase_price_kopecks: self.purchase_price_kopecks,
            sale_price_kopecks: self.sale_price_kopecks,
            seller_amount_kopecks: self.seller_amount_kopecks,
            image_url: self.image_url,
            volume_ml: self.volume_ml,
            quantity: self.quantity,
            flavors,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct FlavorRow {
    product_id: String,
    name: String,
    quantity: i64,
}

const PRODUCT_COLUMNS: &str = "id, kind, brand, purchase_price_kopecks, sale_price_kopecks, \
     seller_amount_kopecks, image_url, volume_ml, quantity, created_at, updated_at";

/// One stock decrement inside a write transaction.
#[derive(Debug, Clone, Copy)]
pub(crate) struct StockTake<'a> {
    pub product_id: &'a str,
    pub kind: ProductKind,
    pub flavor: Option<&'a str>,
    pub label: &'a str,
    pub count: i64,
}

/// Result of discarding one unit.
#[derive(Debug, Clone)]
pub struct DiscardOutcome {
    /// Unit label, e.g. `"Elf 30 ml Mint"`.
    pub label: String,
    pub remaining: i64,
    /// Set when this discard emptied the item for the first time.
    pub newly_depleted: Option<DepletionMarker>,
}

// =============================================================================
// Connection-level helpers (usable inside a transaction)
// =============================================================================

/// Loads products (optionally of one kind) with their flavors.
pub(crate) async fn load_all(conn: &mut SqliteConnection, kind: Option<ProductKind>) -> DbResult<Vec<Product>> {
    let rows: Vec<ProductRow> = match kind {
        Some(kind) => {
            let sql = format!(
                "SELECT {} FROM products WHERE kind = ?1 ORDER BY brand COLLATE NOCASE, created_at",
                PRODUCT_COLUMNS
            );
            sqlx::query_as(&sql).bind(kind).fetch_all(&mut *conn).await?
        }
        None => {
            let sql = format!(
                "SELECT {} FROM products ORDER BY kind, brand COLLATE NOCASE, created_at",
                PRODUCT_COLUMNS
            );
            sqlx::query_as(&sql).fetch_all(&mut *conn).await?
        }
    };

    let flavor_rows: Vec<FlavorRow> = sqlx::query_as(
        "SELECT product_id, name, quantity FROM product_flavors ORDER BY product_id, position, name",
    )
    .fetch_all(&mut *conn)
    .await?;

    let mut flavors: HashMap<String, Vec<Flavor>> = HashMap::new();
    for row in flavor_rows {
        flavors
            .entry(row.product_id)
            .or_default()
            .push(Flavor::new(row.name, row.quantity));
    }

    Ok(rows
        .into_iter()
        .map(|row| {
            let own = flavors.remove(&row.id).unwrap_or_default();
            row.into_product(own)
        })
        .collect())
}

/// Loads one product with its flavors.
pub(crate) async fn fetch_one(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Product>> {
    let sql = format!("SELECT {} FROM products WHERE id = ?1", PRODUCT_COLUMNS);
    let row: Option<ProductRow> = sqlx::query_as(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let flavors: Vec<(String, i64)> = sqlx::query_as(
        "SELECT name, quantity FROM product_flavors WHERE product_id = ?1 ORDER BY position, name",
    )
    .bind(id)
    .fetch_all(&mut *conn)
    .await?;

    let flavors = flavors
        .into_iter()
        .map(|(name, quantity)| Flavor::new(name, quantity))
        .collect();

    Ok(Some(row.into_product(flavors)))
}

/// Finds a liquid with the same brand (ignoring case) and bottle size.
async fn find_liquid(conn: &mut SqliteConnection, brand: &str, volume_ml: i64) -> DbResult<Option<Product>> {
    let liquids = load_all(conn, Some(ProductKind::Liquids)).await?;
    Ok(liquids
        .into_iter()
        .find(|p| p.volume_ml == Some(volume_ml) && inventory::same_name(&p.brand, brand)))
}

/// Replaces the flavor rows of a product, keeping the given order.
async fn write_flavors(conn: &mut SqliteConnection, product_id: &str, flavors: &[Flavor]) -> DbResult<()> {
    sqlx::query("DELETE FROM product_flavors WHERE product_id = ?1")
        .bind(product_id)
        .execute(&mut *conn)
        .await?;

    for (position, flavor) in flavors.iter().enumerate() {
        sqlx::query(
            "INSERT INTO product_flavors (product_id, name, quantity, position) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(product_id)
        .bind(&flavor.name)
        .bind(flavor.quantity)
        .bind(position as i64)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

async fn insert_product(conn: &mut SqliteConnection, spec: &ProductSpec, now: DateTime<Utc>) -> DbResult<Product> {
    let id = Uuid::new_v4().to_string();

    debug!(id = %id, kind = %spec.kind, brand = %spec.brand, "Inserting product");

    sqlx::query(
        r#"
        INSERT INTO products (
            id, kind, brand,
            purchase_price_kopecks, sale_price_kopecks, seller_amount_kopecks,
            image_url, volume_ml, quantity, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)
        "#,
    )
    .bind(&id)
    .bind(spec.kind)
    .bind(&spec.brand)
    .bind(spec.purchase_price.kopecks())
    .bind(spec.sale_price.kopecks())
    .bind(spec.seller_amount.kopecks())
    .bind(&spec.image_url)
    .bind(spec.volume_ml())
    .bind(spec.quantity())
    .bind(now)
    .execute(&mut *conn)
    .await?;

    write_flavors(conn, &id, &inventory::merge_flavors(&[], spec.flavors())).await?;

    fetch_one(conn, &id)
        .await?
        .ok_or_else(|| DbError::not_found("Product", id))
}

async fn update_row(conn: &mut SqliteConnection, id: &str, spec: &ProductSpec, now: DateTime<Utc>) -> DbResult<()> {
    sqlx::query(
        r#"
        UPDATE products SET
            brand = ?2,
            purchase_price_kopecks = ?3,
            sale_price_kopecks = ?4,
            seller_amount_kopecks = ?5,
            image_url = ?6,
            volume_ml = ?7,
            quantity = ?8,
            updated_at = ?9
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .bind(&spec.brand)
    .bind(spec.purchase_price.kopecks())
    .bind(spec.sale_price.kopecks())
    .bind(spec.seller_amount.kopecks())
    .bind(&spec.image_url)
    .bind(spec.volume_ml())
    .bind(spec.quantity())
    .bind(now)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Takes `count` units in one guarded statement and returns what is left.
///
/// A liquid flavor that reaches zero is removed from the product.
///
/// ## Errors
/// - `ProductNotFound` when the product is gone
/// - `FlavorNotFound` / `InsufficientStock` when the guard rejects the write
pub(crate) async fn take_stock(conn: &mut SqliteConnection, take: StockTake<'_>, now: DateTime<Utc>) -> DbResult<i64> {
    let result = match (take.kind.has_flavors(), take.flavor) {
        (true, Some(flavor)) => {
            sqlx::query(
                r#"
                UPDATE product_flavors
                SET quantity = quantity - ?3
                WHERE product_id = ?1 AND name = ?2 AND quantity >= ?3
                "#,
            )
            .bind(take.product_id)
            .bind(flavor)
            .bind(take.count)
            .execute(&mut *conn)
            .await?
        }
        (true, None) => {
            return Err(CoreError::FlavorNotFound {
                brand: take.label.to_string(),
                flavor: String::new(),
            }
            .into())
        }
        (false, _) => {
            sqlx::query(
                r#"
                UPDATE products
                SET quantity = quantity - ?2, updated_at = ?3
                WHERE id = ?1 AND quantity >= ?2
                "#,
            )
            .bind(take.product_id)
            .bind(take.count)
            .bind(now)
            .execute(&mut *conn)
            .await?
        }
    };

    if result.rows_affected() == 0 {
        return Err(explain_rejected_take(conn, &take).await);
    }

    let remaining: i64 = match (take.kind.has_flavors(), take.flavor) {
        (true, Some(flavor)) => {
            let remaining: i64 = sqlx::query_scalar(
                "SELECT quantity FROM product_flavors WHERE product_id = ?1 AND name = ?2",
            )
            .bind(take.product_id)
            .bind(flavor)
            .fetch_one(&mut *conn)
            .await?;

            if remaining == 0 {
                sqlx::query("DELETE FROM product_flavors WHERE product_id = ?1 AND name = ?2 AND quantity = 0")
                    .bind(take.product_id)
                    .bind(flavor)
                    .execute(&mut *conn)
                    .await?;
            }

            sqlx::query("UPDATE products SET updated_at = ?2 WHERE id = ?1")
                .bind(take.product_id)
                .bind(now)
                .execute(&mut *conn)
                .await?;

            remaining
        }
        _ => {
            let remaining: Option<i64> = sqlx::query_scalar("SELECT quantity FROM products WHERE id = ?1")
                .bind(take.product_id)
                .fetch_one(&mut *conn)
                .await?;
            remaining.unwrap_or(0)
        }
    };

    debug!(
        product_id = %take.product_id,
        flavor = ?take.flavor,
        count = take.count,
        remaining,
        "Stock taken"
    );

    Ok(remaining)
}

/// Turns a guard miss into the most specific error.
async fn explain_rejected_take(conn: &mut SqliteConnection, take: &StockTake<'_>) -> DbError {
    match fetch_one(conn, take.product_id).await {
        Ok(None) => CoreError::ProductNotFound(take.product_id.to_string()).into(),
        Ok(Some(product)) => match product.available(take.flavor) {
            Ok(available) => CoreError::InsufficientStock {
                item: take.label.to_string(),
                available,
                requested: take.count,
            }
            .into(),
            Err(err) => err.into(),
        },
        Err(err) => err,
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
///
/// let liquids = repo.list(Some(ProductKind::Liquids)).await?;
/// let product = repo.get_by_id("uuid-here").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists products, optionally of one kind, sorted by brand.
    pub async fn list(&self, kind: Option<ProductKind>) -> DbResult<Vec<Product>> {
        let mut conn = self.pool.acquire().await?;
        let products = load_all(&mut conn, kind).await?;

        debug!(kind = ?kind, count = products.len(), "Listed products");
        Ok(products)
    }

    /// Gets a product by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let mut conn = self.pool.acquire().await?;
        fetch_one(&mut conn, id).await
    }

    /// Sale value of all stock on the shelf.
    pub async fn remaining_total(&self) -> DbResult<Money> {
        let products = self.list(None).await?;
        Ok(inventory::remaining_total(&products)?)
    }

    /// Whether a product of this kind and brand (ignoring case) is readable.
    pub async fn brand_visible(&self, kind: ProductKind, brand: &str) -> DbResult<bool> {
        let products = self.list(Some(kind)).await?;
        Ok(products.iter().any(|p| inventory::same_name(&p.brand, brand)))
    }

    /// Inserts a new product.
    pub async fn insert(&self, spec: &ProductSpec) -> DbResult<Product> {
        let mut tx = begin_write(&self.pool).await?;
        let product = insert_product(&mut tx, spec, Utc::now()).await?;
        tx.commit().await?;

        info!(id = %product.id, kind = %product.kind, brand = %product.brand, "Product created");
        Ok(product)
    }

    /// Records a stock arrival.
    ///
    /// ## Merge Rules
    /// - Liquid with the same brand (ignoring case) and volume exists:
    ///   flavors are summed by name (ignoring case), new flavors appended,
    ///   prices and image replaced by the form
    /// - Anything else: a new product
    pub async fn receive_arrival(&self, spec: &ProductSpec) -> DbResult<ArrivalOutcome> {
        let mut tx = begin_write(&self.pool).await?;
        let now = Utc::now();

        let existing = match (spec.kind.has_flavors(), spec.volume_ml()) {
            (true, Some(volume)) => find_liquid(&mut tx, &spec.brand, volume).await?,
            _ => None,
        };

        let outcome = match existing {
            Some(product) => {
                let flavors = inventory::merge_flavors(&product.flavors, spec.flavors());
                for flavor in &flavors {
                    validate_stock_quantity(&format!("quantity of {}", flavor.name), flavor.quantity)
                        .map_err(CoreError::from)?;
                }
                update_row(&mut tx, &product.id, spec, now).await?;
                write_flavors(&mut tx, &product.id, &flavors).await?;

                let product = fetch_one(&mut tx, &product.id)
                    .await?
                    .ok_or_else(|| DbError::not_found("Product", product.id.clone()))?;
                ArrivalOutcome {
                    kind: ArrivalKind::Updated,
                    product,
                }
            }
            None => ArrivalOutcome {
                kind: ArrivalKind::Added,
                product: insert_product(&mut tx, spec, now).await?,
            },
        };

        // The ledger total must stay computable after this commit.
        inventory::remaining_total(&load_all(&mut tx, None).await?)?;
        tx.commit().await?;

        info!(
            id = %outcome.product.id,
            brand = %outcome.product.brand,
            outcome = ?outcome.kind,
            "Arrival recorded"
        );
        Ok(outcome)
    }

    /// Replaces a product's fields (the kind cannot change).
    pub async fn update(&self, id: &str, spec: &ProductSpec) -> DbResult<Product> {
        let mut tx = begin_write(&self.pool).await?;

        let existing = fetch_one(&mut tx, id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))?;

        if existing.kind != spec.kind {
            return Err(CoreError::KindMismatch {
                id: id.to_string(),
                actual: existing.kind.to_string(),
                requested: spec.kind.to_string(),
            }
            .into());
        }

        update_row(&mut tx, id, spec, Utc::now()).await?;
        write_flavors(&mut tx, id, &inventory::merge_flavors(&[], spec.flavors())).await?;

        let product = fetch_one(&mut tx, id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))?;
        tx.commit().await?;

        info!(id = %id, brand = %product.brand, "Product updated");
        Ok(product)
    }

    /// Deletes a product (its flavors cascade).
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        info!(id = %id, "Product deleted");
        Ok(())
    }

    /// Writes off one unit of a flavor (liquids) or of the product.
    ///
    /// At zero the flavor is pruned and a depletion marker is recorded once.
    pub async fn discard_one(&self, id: &str, flavor: Option<&str>) -> DbResult<DiscardOutcome> {
        let mut tx = begin_write(&self.pool).await?;
        let now = Utc::now();

        let product = fetch_one(&mut tx, id)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(id.to_string()))?;
        let flavor = if product.kind.has_flavors() { flavor } else { None };

        inventory::take_units(&product, flavor, 1)?;

        let label = product.unit_label(flavor);
        let remaining = take_stock(
            &mut tx,
            StockTake {
                product_id: &product.id,
                kind: product.kind,
                flavor,
                label: &label,
                count: 1,
            },
            now,
        )
        .await?;

        let newly_depleted = if remaining == 0 {
            let key = inventory::depletion_key(product.kind, &product.id, flavor);
            depletion::mark_once(&mut tx, &key, &inventory::depletion_label(&product, flavor), now).await?
        } else {
            None
        };

        tx.commit().await?;

        info!(id = %id, label = %label, remaining, "Discarded one unit");
        Ok(DiscardOutcome {
            label,
            remaining,
            newly_depleted,
        })
    }

    /// Deletes sold-out products and prunes empty liquid flavors.
    pub async fn cleanup(&self) -> DbResult<CleanupReport> {
        let mut tx = begin_write(&self.pool).await?;
        let products = load_all(&mut tx, None).await?;
        let mut report = CleanupReport::default();

        for product in &products {
            match inventory::cleanup_action(product) {
                CleanupAction::Keep => {}
                CleanupAction::Prune(kept) => {
                    write_flavors(&mut tx, &product.id, &kept).await?;
                    report.pruned.push(product.display_name());
                }
                CleanupAction::Delete => {
                    sqlx::query("DELETE FROM products WHERE id = ?1")
                        .bind(&product.id)
                        .execute(&mut *tx)
                        .await?;
                    report.deleted.push(product.display_name());
                }
            }
        }

        tx.commit().await?;

        if report.deleted.is_empty() && report.pruned.is_empty() {
            debug!("Cleanup found nothing to remove");
        } else {
            warn!(
                deleted = report.deleted.len(),
                pruned = report.pruned.len(),
                "Cleanup removed sold-out stock"
            );
        }
        Ok(report)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use vape_core::StockSpec;

    pub(crate) fn liquid_spec(brand: &str, sale_hryvnias: i64, flavors: &[(&str, i64)]) -> ProductSpec {
        ProductSpec {
            kind: ProductKind::Liquids,
            brand: brand.to_string(),
            purchase_price: Money::from_hryvnias(sale_hryvnias / 2),
            sale_price: Money::from_hryvnias(sale_hryvnias),
            seller_amount: Money::from_hryvnias(sale_hryvnias / 10),
            image_url: "/images/products/1-elf.jpg".to_string(),
            stock: StockSpec::Flavors {
                volume_ml: 30,
                flavors: flavors.iter().map(|(n, q)| Flavor::new(*n, *q)).collect(),
            },
        }
    }

    pub(crate) fn unit_spec(kind: ProductKind, brand: &str, sale_hryvnias: i64, qty: i64) -> ProductSpec {
        ProductSpec {
            kind,
            brand: brand.to_string(),
            purchase_price: Money::from_hryvnias(sale_hryvnias / 2),
            sale_price: Money::from_hryvnias(sale_hryvnias),
            seller_amount: Money::from_hryvnias(sale_hryvnias / 10),
            image_url: "/images/products/2-xros.jpg".to_string(),
            stock: StockSpec::Units(qty),
        }
    }

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = test_db().await;
        let repo = db.products();

        let created = repo.insert(&liquid_spec("Elf", 100, &[("Mint", 5), ("Grape", 2)])).await.unwrap();
        let loaded = repo.get_by_id(&created.id).await.unwrap().unwrap();

        assert_eq!(loaded.brand, "Elf");
        assert_eq!(loaded.volume_ml, Some(30));
        assert_eq!(loaded.flavors, vec![Flavor::new("Mint", 5), Flavor::new("Grape", 2)]);
        assert!(repo.get_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_remaining_total() {
        let db = test_db().await;
        let repo = db.products();

        repo.insert(&liquid_spec("Elf", 100, &[("Mint", 5), ("Grape", 2)])).await.unwrap();
        repo.insert(&unit_spec(ProductKind::Cartridges, "XROS", 200, 3)).await.unwrap();

        assert_eq!(repo.remaining_total().await.unwrap(), Money::from_hryvnias(1300));
    }

    #[tokio::test]
    async fn test_arrival_that_overflows_shelf_value_is_rolled_back() {
        let db = test_db().await;
        let repo = db.products();
        repo.insert(&unit_spec(ProductKind::Cartridges, "XROS", 200, 3)).await.unwrap();

        let err = repo
            .receive_arrival(&unit_spec(ProductKind::Cartridges, "Big", 10_000_000_000_000_000, 10))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::AmountOverflow { .. })));

        assert_eq!(repo.list(None).await.unwrap().len(), 1);
        assert_eq!(repo.remaining_total().await.unwrap(), Money::from_hryvnias(600));
        assert_eq!(db.ledger().refresh_total().await.unwrap().total, Money::from_hryvnias(600));
    }

    #[tokio::test]
    async fn test_arrival_merge_cannot_exceed_stock_limit() {
        let db = test_db().await;
        let repo = db.products();
        repo.receive_arrival(&liquid_spec("Elf", 100, &[("Mint", vape_core::MAX_STOCK_QUANTITY)]))
            .await
            .unwrap();

        let err = repo.receive_arrival(&liquid_spec("Elf", 100, &[("mint", 1)])).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::Validation(_))));

        let stored = &repo.list(None).await.unwrap()[0];
        assert_eq!(stored.flavors, vec![Flavor::new("Mint", vape_core::MAX_STOCK_QUANTITY)]);
    }

    #[tokio::test]
    async fn test_arrival_merges_liquid_case_insensitively() {
        let db = test_db().await;
        let repo = db.products();

        let first = repo.receive_arrival(&liquid_spec("Elf", 100, &[("Mint", 2)])).await.unwrap();
        assert_eq!(first.kind, ArrivalKind::Added);

        let second = repo
            .receive_arrival(&liquid_spec("elf", 120, &[("MINT", 3), ("Cola", 1)]))
            .await
            .unwrap();
        assert_eq!(second.kind, ArrivalKind::Updated);
        assert_eq!(second.product.id, first.product.id);
        assert_eq!(
            second.product.flavors,
            vec![Flavor::new("Mint", 5), Flavor::new("Cola", 1)]
        );
        assert_eq!(second.product.sale_price(), Money::from_hryvnias(120));
        assert_eq!(repo.list(None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_arrival_of_cartridges_always_adds() {
        let db = test_db().await;
        let repo = db.products();

        repo.receive_arrival(&unit_spec(ProductKind::Cartridges, "XROS", 200, 3)).await.unwrap();
        let again = repo
            .receive_arrival(&unit_spec(ProductKind::Cartridges, "XROS", 200, 2))
            .await
            .unwrap();

        assert_eq!(again.kind, ArrivalKind::Added);
        assert_eq!(repo.list(Some(ProductKind::Cartridges)).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_update_rejects_kind_change() {
        let db = test_db().await;
        let repo = db.products();

        let created = repo.insert(&liquid_spec("Elf", 100, &[("Mint", 5)])).await.unwrap();
        let result = repo
            .update(&created.id, &unit_spec(ProductKind::Cartridges, "Elf", 100, 1))
            .await;
        assert!(matches!(result, Err(DbError::Domain(CoreError::KindMismatch { .. }))));

        let updated = repo
            .update(&created.id, &liquid_spec("Elf Bar", 90, &[("Grape", 4)]))
            .await
            .unwrap();
        assert_eq!(updated.brand, "Elf Bar");
        assert_eq!(updated.flavors, vec![Flavor::new("Grape", 4)]);
    }

    #[tokio::test]
    async fn test_delete() {
        let db = test_db().await;
        let repo = db.products();

        let created = repo.insert(&liquid_spec("Elf", 100, &[("Mint", 5)])).await.unwrap();
        repo.delete(&created.id).await.unwrap();

        assert!(repo.get_by_id(&created.id).await.unwrap().is_none());
        assert!(matches!(repo.delete(&created.id).await, Err(DbError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_discard_prunes_and_marks_once() {
        let db = test_db().await;
        let repo = db.products();

        let created = repo.insert(&liquid_spec("Elf", 100, &[("Mint", 1), ("Grape", 2)])).await.unwrap();

        let outcome = repo.discard_one(&created.id, Some("Mint")).await.unwrap();
        assert_eq!(outcome.remaining, 0);
        assert_eq!(outcome.label, "Elf 30 ml Mint");
        let marker = outcome.newly_depleted.unwrap();
        assert_eq!(marker.id, format!("liquids_{}_Mint", created.id));

        let product = repo.get_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(product.flavors, vec![Flavor::new("Grape", 2)]);

        let again = repo.discard_one(&created.id, Some("Mint")).await;
        assert!(matches!(again, Err(DbError::Domain(CoreError::FlavorNotFound { .. }))));
    }

    #[tokio::test]
    async fn test_discard_unit_product_to_zero() {
        let db = test_db().await;
        let repo = db.products();

        let created = repo.insert(&unit_spec(ProductKind::Nicoboosters, "Booster", 50, 1)).await.unwrap();

        let outcome = repo.discard_one(&created.id, None).await.unwrap();
        assert_eq!(outcome.remaining, 0);
        assert_eq!(outcome.newly_depleted.unwrap().label, "Booster (основний товар)");

        let again = repo.discard_one(&created.id, None).await;
        assert!(matches!(
            again,
            Err(DbError::Domain(CoreError::InsufficientStock { available: 0, .. }))
        ));
    }

    #[tokio::test]
    async fn test_cleanup() {
        let db = test_db().await;
        let repo = db.products();

        let keep = repo.insert(&liquid_spec("Elf", 100, &[("Mint", 1)])).await.unwrap();
        let sold_out = repo.insert(&unit_spec(ProductKind::Cartridges, "XROS", 200, 0)).await.unwrap();

        let report = repo.cleanup().await.unwrap();
        assert_eq!(report.deleted, vec!["XROS".to_string()]);
        assert!(report.pruned.is_empty());

        assert!(repo.get_by_id(&keep.id).await.unwrap().is_some());
        assert!(repo.get_by_id(&sold_out.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_brand_visible() {
        let db = test_db().await;
        let repo = db.products();

        repo.insert(&liquid_spec("Chaser", 150, &[("Cola", 1)])).await.unwrap();

        assert!(repo.brand_visible(ProductKind::Liquids, "chaser").await.unwrap());
        assert!(!repo.brand_visible(ProductKind::Cartridges, "Chaser").await.unwrap());
    }
}
