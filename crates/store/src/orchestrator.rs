//! The purchase pipeline (application-level orchestration).
//!
//! `PurchaseOrchestrator` is the only entry point that spends a balance and
//! consumes a pool credential. One call is one atomic unit:
//!
//! ```text
//! PurchaseRequest
//!   ↓
//! 1. Validate the contract (positive amount/duration)
//!   ↓
//! 2. Resolve plan, location, account row, credential row
//!   ↓
//! 3. Lock rows in the fixed global order: account, then credential
//!   ↓
//! 4. Check balance sufficiency and credential availability (no mutation)
//!   ↓
//! 5. Apply debit + lease, append the purchase record
//!   ↓
//! 6. Release the locks — all three effects become visible together
//! ```
//!
//! Any failure after a mutation restores the row snapshots taken under the
//! locks before returning, so no other operation ever observes a partial
//! outcome. The orchestrator performs no internal retry; retry is the
//! caller's responsibility.

use std::sync::Arc;

use tracing::{info, warn};

use netbill_billing::{PurchaseError, PurchaseReceipt, PurchaseRecord, PurchaseRequest};
use netbill_core::{DomainError, PurchaseId};

use crate::tables::{lock_row, BillingStore, StoreError};

impl From<StoreError> for PurchaseError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::AccountNotFound(account_id) => PurchaseError::AccountNotFound { account_id },
            StoreError::PlanNotFound(id) => {
                PurchaseError::ReferentialIntegrity(format!("plan {id} does not exist"))
            }
            StoreError::LocationNotFound(id) => {
                PurchaseError::ReferentialIntegrity(format!("location {id} does not exist"))
            }
            StoreError::CredentialNotFound(id) => {
                PurchaseError::ReferentialIntegrity(format!("credential {id} does not exist"))
            }
            StoreError::Duplicate(msg) => PurchaseError::ConcurrencyConflict(msg),
            StoreError::Poisoned(msg) => PurchaseError::ConcurrencyConflict(msg),
            StoreError::Pool(e) => e.into(),
        }
    }
}

fn validation(err: DomainError) -> PurchaseError {
    PurchaseError::Validation(err.to_string())
}

/// Composes the account ledger, credential pool, and purchase log into one
/// all-or-nothing purchase operation.
///
/// Callers must pass the authorization gate first; the orchestrator runs
/// with elevated privileges and does not re-derive caller identity. There is
/// no idempotency key in the inbound contract, so a retried request after an
/// ambiguous response can charge twice.
#[derive(Debug, Clone)]
pub struct PurchaseOrchestrator {
    store: Arc<BillingStore>,
}

impl PurchaseOrchestrator {
    pub fn new(store: Arc<BillingStore>) -> Self {
        Self { store }
    }

    /// Execute one purchase attempt.
    ///
    /// On success: the balance is debited, the credential is leased to the
    /// account, and exactly one `plan_purchase` record with the computed
    /// expiry is in the log. On failure: none of the three.
    pub fn purchase(&self, req: &PurchaseRequest) -> Result<PurchaseReceipt, PurchaseError> {
        // 1) Contract validation (before any row is touched).
        req.amount.require_positive("amount").map_err(validation)?;
        req.duration.require_positive().map_err(validation)?;

        // 2) Resolve referenced rows. Catalog rows are read-only here; the
        //    account and credential are fetched as handles, not yet locked.
        self.store.plan(req.plan_id)?;
        self.store.location(req.location_id)?;
        let account_row = self.store.account_row(req.account_id)?;
        let credential_row = self.store.credential_row(req.credential_id)?;

        // 3) Exclusive holds, fixed global order: the account row is always
        //    locked before the credential row, so two purchases contending
        //    for the same pair can never wait on each other in a cycle.
        let mut account = lock_row(&account_row, "account").map_err(PurchaseError::from)?;
        if account.balance() < req.amount {
            return Err(PurchaseError::InsufficientFunds {
                required: req.amount,
                available: account.balance(),
            });
        }

        let mut credential = lock_row(&credential_row, "credential").map_err(PurchaseError::from)?;

        // 4) Pre-mutation checks on the credential. Failing here aborts
        //    before anything is applied.
        if credential.location_id != req.location_id || credential.plan_id != req.plan_id {
            return Err(PurchaseError::ReferentialIntegrity(format!(
                "credential {} does not belong to this location/plan pool",
                req.credential_id
            )));
        }
        if !credential.is_available() {
            return Err(PurchaseError::CredentialUnavailable {
                status: credential.status,
            });
        }

        // 5) Apply the paired mutations. Snapshots taken under the locks are
        //    the rollback points; they are restored on any later failure in
        //    this invocation, before either lock is released.
        let account_snapshot = account.clone();
        let credential_snapshot = credential.clone();

        account.debit(req.amount, req.requested_at)?;

        let lease = match credential.try_lease(req.account_id, req.requested_at) {
            Ok(lease) => lease,
            Err(e) => {
                *account = account_snapshot;
                warn!(
                    account_id = %req.account_id,
                    credential_id = %req.credential_id,
                    error = %e,
                    "lease failed after debit; rolled back"
                );
                return Err(e.into());
            }
        };

        // 6) Durable record with the exact computed expiry.
        let expires_at = req.duration.expiry_from(req.requested_at);
        let record = PurchaseRecord::plan_purchase(
            PurchaseId::new(),
            req.account_id,
            req.plan_id,
            req.location_id,
            &lease,
            req.amount,
            req.duration,
            req.requested_at,
            req.payment_ref.clone(),
            req.metadata.clone(),
        );
        let transaction_id = record.id;

        if let Err(e) = self.store.append_purchase(record) {
            *account = account_snapshot;
            *credential = credential_snapshot;
            warn!(
                account_id = %req.account_id,
                credential_id = %req.credential_id,
                error = %e,
                "record append failed; rolled back debit and lease"
            );
            return Err(e.into());
        }

        info!(
            transaction_id = %transaction_id,
            account_id = %req.account_id,
            credential_id = %req.credential_id,
            amount = %req.amount,
            expires_at = %expires_at,
            "purchase completed"
        );

        // 7) Commit: dropping the guards publishes all three effects at once.
        Ok(PurchaseReceipt {
            transaction_id,
            account_id: req.account_id,
            plan_id: req.plan_id,
            location_id: req.location_id,
            credential_id: req.credential_id,
            amount: req.amount,
            expires_at,
        })
    }
}
