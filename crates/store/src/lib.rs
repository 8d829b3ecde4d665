//! `netbill-store` — the shared row store and the purchase orchestrator.
//!
//! This crate stands in for the relational store: per-row mutexes provide
//! the row-level exclusive locks, and the orchestrator composes the ledger,
//! pool, and purchase log into one all-or-nothing operation.

pub mod orchestrator;
pub mod registry;
pub mod tables;


pub use orchestrator::PurchaseOrchestrator;
pub use registry::AccountRegistry;
pub use tables::{BillingStore, StoreError};
