//! # Sale Repository
//!
//! Checkout and sales history.
//!
//! ## Checkout Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       checkout() - one transaction                      │
//! │                                                                         │
//! │  1. for each cart line                                                  │
//! │     └── take_stock (guarded)  ──► InsufficientStock? ROLLBACK           │
//! │         └── remaining == 0 ──► mark_once ──► newly depleted list        │
//! │                                                                         │
//! │  2. remaining_total over all products                                   │
//! │  3. ledger += { cash, card, salary, mine }, total = remaining           │
//! │  4. daily_sales[date] += { total, profit, 1 }                           │
//! │  5. INSERT sales + sale_items                                           │
//! │                                                                         │
//! │  COMMIT ──► caller sends the chat summary                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use vape_core::inventory;
use vape_core::ledger::SaleDelta;
use vape_core::{Cart, CartTotals, CheckoutSummary, CoreError, PaymentSplit, ProductKind, Sale, SaleItem};

use crate::error::DbResult;
use crate::repository::product::{self, StockTake};
use crate::repository::{begin_write, daily_sales, depletion, ledger};

/// Everything the checkout transaction needs.
#[derive(Debug, Clone)]
pub struct CheckoutRequest<'a> {
    pub seller_email: &'a str,
    pub cart: &'a Cart,
    /// Payment already resolved against the cart total.
    pub payment: PaymentSplit,
    /// Shop-local date of the sale, `YYYY-MM-DD`.
    pub local_date: String,
    pub at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct SaleRow {
    id: String,
    seller_email: String,
    total_kopecks: i64,
    cash_kopecks: i64,
    card_kopecks: i64,
    salary_kopecks: i64,
    profit_kopecks: i64,
    created_at: DateTime<Utc>,
}

impl SaleRow {
    fn into_sale(self, items: Vec<SaleItem>) -> Sale {
        Sale {
            id: self.id,
            seller_email: self.seller_email,
            total_kopecks: self.total_kopecks,
            cash_kopecks: self.cash_kopecks,
            card_kopecks: self.card_kopecks,
            salary_kopecks: self.salary_kopecks,
            profit_kopecks: self.profit_kopecks,
            created_at: self.created_at,
            items,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SaleItemRow {
    id: String,
    sale_id: String,
    product_id: String,
    kind: ProductKind,
    label: String,
    flavor: Option<String>,
    unit_price_kopecks: i64,
    quantity: i64,
}

impl From<SaleItemRow> for SaleItem {
    fn from(row: SaleItemRow) -> Self {
        SaleItem {
            id: row.id,
            sale_id: row.sale_id,
            product_id: row.product_id,
            kind: row.kind,
            label: row.label,
            flavor: row.flavor,
            unit_price_kopecks: row.unit_price_kopecks,
            quantity: row.quantity,
        }
    }
}

const SALE_COLUMNS: &str =
    "id, seller_email, total_kopecks, cash_kopecks, card_kopecks, salary_kopecks, profit_kopecks, created_at";

const ITEM_COLUMNS: &str = "id, sale_id, product_id, kind, label, flavor, unit_price_kopecks, quantity";

async fn insert_sale(
    conn: &mut SqliteConnection,
    request: &CheckoutRequest<'_>,
    totals: &CartTotals,
) -> DbResult<Sale> {
    let sale_id = Uuid::new_v4().to_string();

    sqlx::query(
        r#"
        INSERT INTO sales (
            id, seller_email, total_kopecks, cash_kopecks, card_kopecks,
            salary_kopecks, profit_kopecks, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
    )
    .bind(&sale_id)
    .bind(request.seller_email)
    .bind(totals.total.kopecks())
    .bind(request.payment.cash.kopecks())
    .bind(request.payment.card.kopecks())
    .bind(totals.salary.kopecks())
    .bind(totals.profit.kopecks())
    .bind(request.at)
    .execute(&mut *conn)
    .await?;

    let mut items = Vec::with_capacity(request.cart.lines.len());
    for line in &request.cart.lines {
        let item = SaleItem {
            id: Uuid::new_v4().to_string(),
            sale_id: sale_id.clone(),
            product_id: line.product_id.clone(),
            kind: line.kind,
            label: line.label.clone(),
            flavor: line.flavor.clone(),
            unit_price_kopecks: line.unit_price.kopecks(),
            quantity: line.quantity,
        };

        sqlx::query(
            r#"
            INSERT INTO sale_items (
                id, sale_id, product_id, kind, label, flavor, unit_price_kopecks, quantity
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&item.id)
        .bind(&item.sale_id)
        .bind(&item.product_id)
        .bind(item.kind)
        .bind(&item.label)
        .bind(&item.flavor)
        .bind(item.unit_price_kopecks)
        .bind(item.quantity)
        .execute(&mut *conn)
        .await?;

        items.push(item);
    }

    Ok(Sale {
        id: sale_id,
        seller_email: request.seller_email.to_string(),
        total_kopecks: totals.total.kopecks(),
        cash_kopecks: request.payment.cash.kopecks(),
        card_kopecks: request.payment.card.kopecks(),
        salary_kopecks: totals.salary.kopecks(),
        profit_kopecks: totals.profit.kopecks(),
        created_at: request.at,
        items,
    })
}

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Completes a sale atomically.
    ///
    /// ## Errors
    /// - `EmptyCart` when there is nothing to sell
    /// - `PaymentMismatch` when the payment does not cover the total exactly
    /// - `InsufficientStock` / `FlavorNotFound` / `ProductNotFound` when stock
    ///   moved since the line was added; nothing is written in that case
    pub async fn checkout(&self, request: &CheckoutRequest<'_>) -> DbResult<CheckoutSummary> {
        let cart = request.cart;
        if cart.is_empty() {
            return Err(CoreError::EmptyCart.into());
        }

        let totals = CartTotals::from(cart);
        if request.payment.cash + request.payment.card != totals.total {
            return Err(CoreError::PaymentMismatch {
                cash: request.payment.cash,
                card: request.payment.card,
                total: totals.total,
            }
            .into());
        }

        debug!(
            seller = %request.seller_email,
            lines = cart.lines.len(),
            total = %totals.total,
            "Starting checkout"
        );

        let mut tx = begin_write(&self.pool).await?;
        let mut depleted = Vec::new();

        for line in &cart.lines {
            let flavor = line.flavor.as_deref();
            let remaining = product::take_stock(
                &mut tx,
                StockTake {
                    product_id: &line.product_id,
                    kind: line.kind,
                    flavor,
                    label: &line.label,
                    count: line.quantity,
                },
                request.at,
            )
            .await?;

            if remaining > 0 {
                continue;
            }

            let sold_out = product::fetch_one(&mut tx, &line.product_id)
                .await?
                .ok_or_else(|| CoreError::ProductNotFound(line.product_id.clone()))?;
            let key = inventory::depletion_key(line.kind, &line.product_id, flavor);
            let label = inventory::depletion_label(&sold_out, flavor);
            if let Some(marker) = depletion::mark_once(&mut tx, &key, &label, request.at).await? {
                depleted.push(marker);
            }
        }

        let products = product::load_all(&mut tx, None).await?;
        let remaining_total = inventory::remaining_total(&products)?;

        let delta = SaleDelta::from_sale(&totals, &request.payment);
        let ledger = ledger::apply_sale(&mut tx, &delta, remaining_total, request.at).await?;

        daily_sales::record(&mut tx, &request.local_date, totals.total, totals.profit, request.at).await?;

        let sale = insert_sale(&mut tx, request, &totals).await?;

        tx.commit().await?;

        info!(
            sale_id = %sale.id,
            seller = %request.seller_email,
            total = %totals.total,
            cash = %request.payment.cash,
            card = %request.payment.card,
            depleted = depleted.len(),
            "Checkout completed"
        );

        Ok(CheckoutSummary {
            sale,
            depleted,
            ledger,
        })
    }

    /// Gets a sale with its items.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let sql = format!("SELECT {} FROM sales WHERE id = ?1", SALE_COLUMNS);
        let row: Option<SaleRow> = sqlx::query_as(&sql).bind(id).fetch_optional(&self.pool).await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let sql = format!("SELECT {} FROM sale_items WHERE sale_id = ?1 ORDER BY rowid", ITEM_COLUMNS);
        let items: Vec<SaleItemRow> = sqlx::query_as(&sql).bind(id).fetch_all(&self.pool).await?;

        Ok(Some(row.into_sale(items.into_iter().map(SaleItem::from).collect())))
    }

    /// Most recent sales first, with their items.
    pub async fn list_recent(&self, limit: u32) -> DbResult<Vec<Sale>> {
        let sql = format!(
            "SELECT {} FROM sales ORDER BY created_at DESC, rowid DESC LIMIT ?1",
            SALE_COLUMNS
        );
        let rows: Vec<SaleRow> = sqlx::query_as(&sql).bind(limit).fetch_all(&self.pool).await?;

        let sql = format!(
            r#"
            SELECT {} FROM sale_items
            WHERE sale_id IN (SELECT id FROM sales ORDER BY created_at DESC, rowid DESC LIMIT ?1)
            ORDER BY rowid
            "#,
            ITEM_COLUMNS
        );
        let item_rows: Vec<SaleItemRow> = sqlx::query_as(&sql).bind(limit).fetch_all(&self.pool).await?;

        let mut items: HashMap<String, Vec<SaleItem>> = HashMap::new();
        for row in item_rows {
            items.entry(row.sale_id.clone()).or_default().push(row.into());
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let own = items.remove(&row.id).unwrap_or_default();
                row.into_sale(own)
            })
            .collect())
    }
}

// =============================================================================
// Tests
// =============================================================================
