//! # Chat Reports
//!
//! Builds the HTML-flavored texts posted to the shop's Telegram channel.
//!
//! ## Messages per Operation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Operation            Messages (in send order)                          │
//! │  ─────────            ────────────────────────                          │
//! │  checkout             sale_summary                                      │
//! │  arrival / discard    ledger_summary → availability → depletion_alert?  │
//! │  manual ledger edit   ledger_summary → availability → depletion_alert?  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything typed by a user (brand, flavor, operation label) goes through
//! [`escape_html`] because the chat API parses the text as HTML.

use std::fmt::Write;

use chrono::{DateTime, FixedOffset};

use crate::cart::PaymentSplit;
use crate::ledger::Ledger;
use crate::money::Money;
use crate::types::{Product, ProductKind};

/// Escapes the characters the chat API treats as markup.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            other => out.push(other),
        }
    }
    out
}

/// The ledger summary sent after every balance-changing operation.
pub fn ledger_summary(operation: &str, ledger: &Ledger) -> String {
    format!(
        "🧾 <b>{}</b>\n\n\
         <b>Загальний товар (залишок):</b> {} грн\n\
         <b>Готівка:</b> {} грн\n\
         <b>Карта:</b> {} грн\n\
         <b>Загальна сума:</b> {} грн\n\
         <b>ЗП продавця:</b> {} грн\n\
         <b>Моє:</b> {} грн",
        escape_html(operation),
        ledger.total,
        ledger.cash,
        ledger.card,
        ledger.takings(),
        ledger.salary,
        ledger.mine,
    )
}

/// The liquid availability list.
///
/// Brands with the same name are merged; only flavors with stock are listed.
pub fn availability(products: &[Product]) -> String {
    let mut brands: Vec<(String, Vec<String>)> = Vec::new();

    for product in products.iter().filter(|p| p.kind == ProductKind::Liquids) {
        let lines: Vec<String> = product
            .flavors
            .iter()
            .filter(|f| f.quantity > 0)
            .map(|f| format!(" {}: {}шт", escape_html(&f.name), f.quantity))
            .collect();
        if lines.is_empty() {
            continue;
        }

        let brand = escape_html(product.brand.trim());
        match brands.iter_mut().find(|(b, _)| *b == brand) {
            Some((_, existing)) => existing.extend(lines),
            None => brands.push((brand, lines)),
        }
    }

    if brands.is_empty() {
        return "<b>УВАГА:</b> Усі рідини закінчились.".to_string();
    }

    let mut message = String::from("<b>📦 Актуальна наявність рідин:</b>\n");
    for (brand, lines) in brands {
        let _ = writeln!(message, "{}", brand);
        for line in lines {
            let _ = writeln!(message, "{}", line);
        }
    }
    message
}

/// The "sold out during sale" alert, if anything was newly depleted.
pub fn depletion_alert(labels: &[String]) -> Option<String> {
    if labels.is_empty() {
        return None;
    }

    let mut message = String::from("⚠️ <b>Вичерпано під час продажу:</b>\n");
    for label in labels {
        let _ = writeln!(message, "• {}", escape_html(label));
    }
    Some(message)
}

/// The three messages of an inventory report, in send order.
pub fn inventory_report(operation: &str, ledger: &Ledger, products: &[Product], depleted: &[String]) -> Vec<String> {
    let mut messages = vec![ledger_summary(operation, ledger), availability(products)];
    messages.extend(depletion_alert(depleted));
    messages
}

/// Input of the per-checkout sale summary.
#[derive(Debug, Clone)]
pub struct SaleSummary {
    /// Sale time in shop-local time.
    pub at: DateTime<FixedOffset>,
    /// Kind shared by all lines; `None` for mixed carts.
    pub kind: Option<ProductKind>,
    pub unit_labels: Vec<String>,
    pub payment: PaymentSplit,
    pub remaining_total: Money,
    pub depleted: Vec<String>,
}

/// The per-checkout sale summary.
///
/// ## Example Output
/// ```text
/// <b>17.10, 14:05</b>
/// Продаж рідини:
/// Elf 30 ml Mint
///
/// 0 грн карта
/// 100 грн готівка
///
/// Актуальна наявність: 1350 грн
/// ```
pub fn sale_summary(summary: &SaleSummary) -> String {
    let noun = summary
        .kind
        .map(|k| k.sale_noun())
        .unwrap_or(ProductKind::Nicoboosters.sale_noun());

    let mut message = format!(
        "<b>{}</b>\nПродаж {}:\n",
        summary.at.format("%d.%m, %H:%M"),
        noun
    );
    for label in &summary.unit_labels {
        let _ = writeln!(message, "{}", escape_html(label));
    }

    let _ = write!(
        message,
        "\n{} грн карта\n{} грн готівка\n\nАктуальна наявність: {} грн\n",
        summary.payment.card, summary.payment.cash, summary.remaining_total
    );

    if !summary.depleted.is_empty() {
        message.push_str("\n⚠️ <b>Вичерпано:</b>\n");
        for label in &summary.depleted {
            let _ = writeln!(message, "• {}", escape_html(label));
        }
    }

    message
}

// =============================================================================
// Unit Tests
// =============================================================================
