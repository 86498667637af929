//! # Services
//!
//! Orchestration between the database, the carts and the chat. Handlers stay
//! thin and call into these.
//!
//! ## Write-then-Notify
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Operation             Write (vape-db)              Then dispatch        │
//! │  ─────────             ───────────────              ─────────────        │
//! │  checkout              SaleRepository::checkout     sale summary         │
//! │  arrival               receive_arrival + poll       inventory report     │
//! │  discard               discard_one                  inventory report     │
//! │  manual ledger edit    apply_patch                  inventory report     │
//! │  product edit/delete   update/delete + refresh      (nothing)            │
//! │  cleanup               cleanup + refresh            (nothing)            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! An inventory report is the ledger summary, the liquid availability list
//! and, when something ran out, the depletion alert.

pub mod checkout;
pub mod inventory;
pub mod ledger;

pub use checkout::checkout;
pub use inventory::{cleanup, delete_product, discard, edit_product, receive_arrival, ArrivalResponse, DiscardResponse};
pub use ledger::{edit_ledger, publish_inventory_report, update_ledger, MANUAL_EDIT_LABEL};
