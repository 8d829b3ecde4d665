//! The purchase contract: request/receipt shapes and the typed error
//! taxonomy every failed attempt surfaces.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;

use netbill_accounts::LedgerError;
use netbill_core::{
    AccessDuration, AccountId, CredentialId, LocationId, Money, PlanId, PurchaseId,
};
use netbill_pool::{CredentialStatus, PoolError};

/// Inbound purchase operation (the core's only entry point).
///
/// The authorization gate has already confirmed the caller may spend from
/// `account_id`; nothing here re-derives caller identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseRequest {
    pub account_id: AccountId,
    pub plan_id: PlanId,
    pub location_id: LocationId,
    pub credential_id: CredentialId,
    pub amount: Money,
    pub duration: AccessDuration,
    pub requested_at: DateTime<Utc>,
    pub payment_ref: Option<String>,
    pub metadata: JsonValue,
}

/// Successful purchase result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseReceipt {
    pub transaction_id: PurchaseId,
    pub account_id: AccountId,
    pub plan_id: PlanId,
    pub location_id: LocationId,
    pub credential_id: CredentialId,
    pub amount: Money,
    pub expires_at: DateTime<Utc>,
}

/// Why a purchase attempt was rejected.
///
/// Every variant aborts the whole atomic operation; a failed attempt leaves
/// balance, credential status, and the purchase log exactly as they were.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PurchaseError {
    #[error("account not found: {account_id}")]
    AccountNotFound { account_id: AccountId },

    #[error("insufficient funds: required {required}, available {available}")]
    InsufficientFunds { required: Money, available: Money },

    #[error("credential unavailable (status: {status})")]
    CredentialUnavailable { status: CredentialStatus },

    #[error("referential integrity violation: {0}")]
    ReferentialIntegrity(String),

    #[error("concurrency conflict: {0}")]
    ConcurrencyConflict(String),

    #[error("validation failed: {0}")]
    Validation(String),
}

impl From<LedgerError> for PurchaseError {
    fn from(value: LedgerError) -> Self {
        match value {
            LedgerError::InsufficientFunds { required, available } => {
                PurchaseError::InsufficientFunds { required, available }
            }
            LedgerError::NonPositiveAmount => {
                PurchaseError::Validation("amount must be positive".to_string())
            }
            LedgerError::Overflow => {
                PurchaseError::ConcurrencyConflict("balance arithmetic overflow".to_string())
            }
        }
    }
}

impl From<PoolError> for PurchaseError {
    fn from(value: PoolError) -> Self {
        match value {
            PoolError::Unavailable { status } => PurchaseError::CredentialUnavailable { status },
            PoolError::Inconsistent(msg) => PurchaseError::ConcurrencyConflict(msg),
            PoolError::InvalidTransition { from, to } => PurchaseError::ConcurrencyConflict(
                format!("invalid credential transition {from} -> {to}"),
            ),
        }
    }
}
