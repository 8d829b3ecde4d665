//! Account provisioning and wallet funding hooks.
//!
//! The external identity system owns signup; after it registers a user it
//! invokes `provision` synchronously so a zero-balance account row exists
//! before the first purchase. Wallet funding credits a balance and appends
//! a funding record; it never touches the credential pool.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use netbill_accounts::Account;
use netbill_auth::Role;
use netbill_billing::{PurchaseError, PurchaseKind, PurchaseRecord};
use netbill_core::{AccountId, Money, PurchaseId};

use crate::tables::{lock_row, BillingStore, StoreError};

/// Synchronous hooks the external account registry calls into.
#[derive(Debug, Clone)]
pub struct AccountRegistry {
    store: Arc<BillingStore>,
}

impl AccountRegistry {
    pub fn new(store: Arc<BillingStore>) -> Self {
        Self { store }
    }

    /// Post-registration hook: open a zero-balance account.
    pub fn provision(
        &self,
        account_id: AccountId,
        role: Role,
        referred_by: Option<AccountId>,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        self.store
            .insert_account(Account::open(account_id, role, referred_by, now))?;
        info!(account_id = %account_id, role = %role, "account provisioned");
        Ok(())
    }

    /// Credit a wallet and record the funding event.
    ///
    /// `kind` must be one of the wallet kinds; `plan_purchase` records are
    /// written exclusively by the orchestrator.
    pub fn fund_wallet(
        &self,
        account_id: AccountId,
        amount: Money,
        kind: PurchaseKind,
        payment_ref: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<PurchaseRecord, PurchaseError> {
        if kind == PurchaseKind::PlanPurchase {
            return Err(PurchaseError::Validation(
                "plan_purchase is not a wallet funding kind".to_string(),
            ));
        }
        amount
            .require_positive("amount")
            .map_err(|e| PurchaseError::Validation(e.to_string()))?;

        let account_row = self.store.account_row(account_id)?;
        let mut account = lock_row(&account_row, "account").map_err(PurchaseError::from)?;

        let account_snapshot = account.clone();
        account.credit(amount, now)?;

        let record =
            PurchaseRecord::wallet_credit(PurchaseId::new(), account_id, amount, kind, now, payment_ref);
        if let Err(e) = self.store.append_purchase(record.clone()) {
            *account = account_snapshot;
            return Err(e.into());
        }

        info!(account_id = %account_id, amount = %amount, "wallet funded");
        Ok(record)
    }
}
