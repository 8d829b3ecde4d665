//! `netbill-billing` — purchase records and the purchase contract.
//!
//! Pure types for the durable outcome of a purchase: the append-only
//! `PurchaseRecord`, the typed `PurchaseError` taxonomy, and the
//! request/receipt shapes the orchestrator exchanges with callers.

pub mod purchase;
pub mod record;

pub use purchase::{PurchaseError, PurchaseReceipt, PurchaseRequest};
pub use record::{PurchaseKind, PurchaseRecord, PurchaseStatus};
