//! # Ledger
//!
//! The shop's single running-balance record.
//!
//! ## Fields
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  ledger/current                                              │
//! │                                                              │
//! │  total   remaining inventory value (recomputed, never typed) │
//! │  cash    cash takings                                        │
//! │  card    card takings                                        │
//! │  salary  seller wages owed                                   │
//! │  mine    owner's share                                       │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Two kinds of writes touch it:
//! - **Patches** (manual edit): absolute values for some fields, merged over
//!   the stored row. Applying the same patch twice gives the same row.
//! - **Sale deltas** (checkout): relative additions applied in SQL so that
//!   concurrent checkouts never overwrite each other.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::{CartTotals, PaymentSplit};
use crate::money::Money;

/// Snapshot of the ledger row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Ledger {
    pub total: Money,
    pub cash: Money,
    pub card: Money,
    pub salary: Money,
    pub mine: Money,
}

/// Absolute values for a subset of ledger fields.
///
/// `total` is deliberately absent: it is always recomputed from stock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LedgerPatch {
    pub cash: Option<Money>,
    pub card: Option<Money>,
    pub salary: Option<Money>,
    pub mine: Option<Money>,
}

/// Relative change produced by one checkout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaleDelta {
    pub cash: Money,
    pub card: Money,
    pub salary: Money,
    pub mine: Money,
}

impl Ledger {
    /// Cash plus card ("Загальна сума" in reports).
    pub fn takings(&self) -> Money {
        self.cash + self.card
    }

    /// Returns a copy with the patch merged over it and `total` replaced.
    ///
    /// ## Example
    /// ```rust
    /// use vape_core::{Ledger, LedgerPatch, Money};
    ///
    /// let stored = Ledger { cash: Money::from_hryvnias(500), ..Ledger::default() };
    /// let patch = LedgerPatch { card: Some(Money::from_hryvnias(200)), ..LedgerPatch::default() };
    ///
    /// let merged = stored.merge(&patch, Money::from_hryvnias(1000));
    /// assert_eq!(merged.cash, Money::from_hryvnias(500));
    /// assert_eq!(merged.card, Money::from_hryvnias(200));
    /// assert_eq!(merged.merge(&patch, merged.total), merged);
    /// ```
    pub fn merge(&self, patch: &LedgerPatch, total: Money) -> Ledger {
        Ledger {
            total,
            cash: patch.cash.unwrap_or(self.cash),
            card: patch.card.unwrap_or(self.card),
            salary: patch.salary.unwrap_or(self.salary),
            mine: patch.mine.unwrap_or(self.mine),
        }
    }
}

impl LedgerPatch {
    pub fn is_empty(&self) -> bool {
        self.cash.is_none() && self.card.is_none() && self.salary.is_none() && self.mine.is_none()
    }
}

impl SaleDelta {
    /// Builds the ledger delta of a checkout.
    ///
    /// `salary` is the sum of seller amounts; `mine` is what is left of the
    /// total after wages.
    pub fn from_sale(totals: &CartTotals, payment: &PaymentSplit) -> Self {
        SaleDelta {
            cash: payment.cash,
            card: payment.card,
            salary: totals.salary,
            mine: totals.total - totals.salary,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn stored() -> Ledger {
        Ledger {
            total: Money::from_hryvnias(5000),
            cash: Money::from_hryvnias(300),
            card: Money::from_hryvnias(200),
            salary: Money::from_hryvnias(50),
            mine: Money::from_hryvnias(450),
        }
    }

    #[test]
    fn test_merge_only_touches_given_fields() {
        let patch = LedgerPatch {
            salary: Some(Money::zero()),
            ..LedgerPatch::default()
        };

        let merged = stored().merge(&patch, Money::from_hryvnias(4900));
        assert_eq!(merged.salary, Money::zero());
        assert_eq!(merged.cash, Money::from_hryvnias(300));
        assert_eq!(merged.total, Money::from_hryvnias(4900));
    }

    #[test]
    fn test_merge_is_idempotent() {
        let patch = LedgerPatch {
            cash: Some(Money::from_hryvnias(1000)),
            mine: Some(Money::from_kopecks(12345)),
            ..LedgerPatch::default()
        };
        let total = Money::from_hryvnias(4000);

        let once = stored().merge(&patch, total);
        let twice = once.merge(&patch, total);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_sale_delta_from_split_payment() {
        let totals = CartTotals {
            line_count: 2,
            total_quantity: 3,
            total: Money::from_hryvnias(300),
            salary: Money::from_hryvnias(30),
            purchase_cost: Money::from_hryvnias(150),
            mine: Money::from_hryvnias(270),
            profit: Money::from_hryvnias(120),
        };
        let payment = PaymentSplit {
            cash: Money::from_hryvnias(100),
            card: Money::from_hryvnias(200),
        };

        let delta = SaleDelta::from_sale(&totals, &payment);
        assert_eq!(delta.cash, Money::from_hryvnias(100));
        assert_eq!(delta.card, Money::from_hryvnias(200));
        assert_eq!(delta.salary, Money::from_hryvnias(30));
        assert_eq!(delta.mine, Money::from_hryvnias(270));
        assert_eq!(stored().takings(), Money::from_hryvnias(500));
    }

    #[test]
    fn test_empty_patch() {
        assert!(LedgerPatch::default().is_empty());
        assert!(!LedgerPatch {
            card: Some(Money::zero()),
            ..LedgerPatch::default()
        }
        .is_empty());
    }
}
