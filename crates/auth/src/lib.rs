//! `netbill-auth` — the authorization gate in front of the billing core.
//!
//! This crate is intentionally decoupled from HTTP and storage. It holds the
//! closed role model and the pure per-row policy predicate; the purchase
//! orchestrator never evaluates policy itself — callers consult this gate
//! first, outside the atomic scope.

pub mod policy;
pub mod principal;
pub mod role;

pub use policy::{authorize, ensure_purchase_allowed, AuthzError, RowAction, RowScope};
pub use principal::Principal;
pub use role::Role;
