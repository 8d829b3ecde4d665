//! `netbill-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod duration;
pub mod error;
pub mod id;
pub mod money;
pub mod timestamps;

pub use duration::AccessDuration;
pub use error::{DomainError, DomainResult};
pub use id::{AccountId, CredentialId, LocationId, PlanId, PurchaseId};
pub use money::Money;
pub use timestamps::Timestamps;
