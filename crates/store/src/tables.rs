//! In-process row store.
//!
//! Accounts and credentials live behind per-row mutexes, the stand-in for
//! relational row locks: whoever holds a row's mutex holds its exclusive
//! lock, and nothing outside that lock can observe a half-applied mutation.
//! Plans and locations are read-mostly catalog rows; the purchase log is an
//! append-only vector with a single-writer convention (orchestrator and
//! registry only).
//!
//! Lock discipline: any operation touching more than one row acquires locks
//! in the fixed global order {account, then credential}. Table-level
//! `RwLock`s are only held long enough to fetch a row handle, never across
//! a row lock acquisition.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use chrono::{DateTime, Utc};
use thiserror::Error;

use netbill_accounts::Account;
use netbill_billing::PurchaseRecord;
use netbill_catalog::{Location, Plan};
use netbill_core::{AccountId, CredentialId, LocationId, Money, PlanId, PurchaseId};
use netbill_pool::{Credential, CredentialStatus, PoolError};

/// A row handle: cloning shares the same lock and the same row.
pub(crate) type Row<T> = Arc<Mutex<T>>;

/// Store operation error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("account not found: {0}")]
    AccountNotFound(AccountId),

    #[error("plan not found: {0}")]
    PlanNotFound(PlanId),

    #[error("location not found: {0}")]
    LocationNotFound(LocationId),

    #[error("credential not found: {0}")]
    CredentialNotFound(CredentialId),

    #[error("duplicate row: {0}")]
    Duplicate(String),

    #[error("lock poisoned: {0}")]
    Poisoned(String),

    #[error(transparent)]
    Pool(#[from] PoolError),
}

pub(crate) fn lock_row<'a, T>(row: &'a Row<T>, what: &str) -> Result<MutexGuard<'a, T>, StoreError> {
    row.lock()
        .map_err(|_| StoreError::Poisoned(format!("{what} row lock")))
}

/// The shared billing store.
#[derive(Debug, Default)]
pub struct BillingStore {
    accounts: RwLock<HashMap<AccountId, Row<Account>>>,
    credentials: RwLock<HashMap<CredentialId, Row<Credential>>>,
    plans: RwLock<HashMap<PlanId, Plan>>,
    locations: RwLock<HashMap<LocationId, Location>>,
    purchases: Mutex<Vec<PurchaseRecord>>,
}

impl BillingStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ── catalog rows ─────────────────────────────────────────────────────

    pub fn insert_plan(&self, plan: Plan) -> Result<(), StoreError> {
        let mut plans = self
            .plans
            .write()
            .map_err(|_| StoreError::Poisoned("plans table".to_string()))?;
        if plans.contains_key(&plan.id) {
            return Err(StoreError::Duplicate(format!("plan {}", plan.id)));
        }
        plans.insert(plan.id, plan);
        Ok(())
    }

    pub fn insert_location(&self, location: Location) -> Result<(), StoreError> {
        let mut locations = self
            .locations
            .write()
            .map_err(|_| StoreError::Poisoned("locations table".to_string()))?;
        if locations.contains_key(&location.id) {
            return Err(StoreError::Duplicate(format!("location {}", location.id)));
        }
        locations.insert(location.id, location);
        Ok(())
    }

    pub fn plan(&self, id: PlanId) -> Result<Plan, StoreError> {
        self.plans
            .read()
            .map_err(|_| StoreError::Poisoned("plans table".to_string()))?
            .get(&id)
            .cloned()
            .ok_or(StoreError::PlanNotFound(id))
    }

    pub fn location(&self, id: LocationId) -> Result<Location, StoreError> {
        self.locations
            .read()
            .map_err(|_| StoreError::Poisoned("locations table".to_string()))?
            .get(&id)
            .cloned()
            .ok_or(StoreError::LocationNotFound(id))
    }

    // ── account rows ─────────────────────────────────────────────────────

    pub fn insert_account(&self, account: Account) -> Result<(), StoreError> {
        let mut accounts = self
            .accounts
            .write()
            .map_err(|_| StoreError::Poisoned("accounts table".to_string()))?;
        if accounts.contains_key(&account.id) {
            return Err(StoreError::Duplicate(format!("account {}", account.id)));
        }
        accounts.insert(account.id, Arc::new(Mutex::new(account)));
        Ok(())
    }

    pub(crate) fn account_row(&self, id: AccountId) -> Result<Row<Account>, StoreError> {
        self.accounts
            .read()
            .map_err(|_| StoreError::Poisoned("accounts table".to_string()))?
            .get(&id)
            .cloned()
            .ok_or(StoreError::AccountNotFound(id))
    }

    pub fn balance_of(&self, id: AccountId) -> Result<Money, StoreError> {
        let row = self.account_row(id)?;
        let account = lock_row(&row, "account")?;
        Ok(account.balance())
    }

    pub fn account_snapshot(&self, id: AccountId) -> Result<Account, StoreError> {
        let row = self.account_row(id)?;
        let account = lock_row(&row, "account")?;
        Ok(account.clone())
    }

    // ── credential rows ──────────────────────────────────────────────────

    /// Insert a provisioned credential.
    ///
    /// Enforces referential integrity against the catalog and uniqueness of
    /// (location, plan, username) across the pool.
    pub fn insert_credential(&self, credential: Credential) -> Result<(), StoreError> {
        self.plan(credential.plan_id)?;
        self.location(credential.location_id)?;

        let mut credentials = self
            .credentials
            .write()
            .map_err(|_| StoreError::Poisoned("credentials table".to_string()))?;
        if credentials.contains_key(&credential.id) {
            return Err(StoreError::Duplicate(format!("credential {}", credential.id)));
        }
        for row in credentials.values() {
            let existing = lock_row(row, "credential")?;
            if existing.location_id == credential.location_id
                && existing.plan_id == credential.plan_id
                && existing.username == credential.username
            {
                return Err(StoreError::Duplicate(format!(
                    "credential username '{}' for this location/plan",
                    credential.username
                )));
            }
        }
        credentials.insert(credential.id, Arc::new(Mutex::new(credential)));
        Ok(())
    }

    pub(crate) fn credential_row(&self, id: CredentialId) -> Result<Row<Credential>, StoreError> {
        self.credentials
            .read()
            .map_err(|_| StoreError::Poisoned("credentials table".to_string()))?
            .get(&id)
            .cloned()
            .ok_or(StoreError::CredentialNotFound(id))
    }

    pub fn credential_status(&self, id: CredentialId) -> Result<CredentialStatus, StoreError> {
        let row = self.credential_row(id)?;
        let credential = lock_row(&row, "credential")?;
        Ok(credential.status)
    }

    pub fn credential_snapshot(&self, id: CredentialId) -> Result<Credential, StoreError> {
        let row = self.credential_row(id)?;
        let credential = lock_row(&row, "credential")?;
        Ok(credential.clone())
    }

    /// Administrative reclamation (out-of-band; not on the purchase path).
    pub fn release_credential(&self, id: CredentialId, now: DateTime<Utc>) -> Result<(), StoreError> {
        let row = self.credential_row(id)?;
        let mut credential = lock_row(&row, "credential")?;
        credential.release(now)?;
        Ok(())
    }

    pub fn disable_credential(&self, id: CredentialId, now: DateTime<Utc>) -> Result<(), StoreError> {
        let row = self.credential_row(id)?;
        let mut credential = lock_row(&row, "credential")?;
        credential.disable(now)?;
        Ok(())
    }

    pub fn enable_credential(&self, id: CredentialId, now: DateTime<Utc>) -> Result<(), StoreError> {
        let row = self.credential_row(id)?;
        let mut credential = lock_row(&row, "credential")?;
        credential.enable(now)?;
        Ok(())
    }

    // ── purchase log ─────────────────────────────────────────────────────

    /// Append one record to the purchase log.
    ///
    /// Single-writer convention: only the orchestrator (plan purchases) and
    /// the registry funding hook (wallet credits) call this.
    pub(crate) fn append_purchase(&self, record: PurchaseRecord) -> Result<(), StoreError> {
        let mut purchases = self
            .purchases
            .lock()
            .map_err(|_| StoreError::Poisoned("purchase log".to_string()))?;
        if purchases.iter().any(|r| r.id == record.id) {
            return Err(StoreError::Duplicate(format!("purchase {}", record.id)));
        }
        purchases.push(record);
        Ok(())
    }

    pub fn purchase(&self, id: PurchaseId) -> Result<Option<PurchaseRecord>, StoreError> {
        let purchases = self
            .purchases
            .lock()
            .map_err(|_| StoreError::Poisoned("purchase log".to_string()))?;
        Ok(purchases.iter().find(|r| r.id == id).cloned())
    }

    pub fn purchases_for_account(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<PurchaseRecord>, StoreError> {
        let purchases = self
            .purchases
            .lock()
            .map_err(|_| StoreError::Poisoned("purchase log".to_string()))?;
        Ok(purchases
            .iter()
            .filter(|r| r.account_id == account_id)
            .cloned()
            .collect())
    }

    pub fn purchase_count(&self) -> Result<usize, StoreError> {
        let purchases = self
            .purchases
            .lock()
            .map_err(|_| StoreError::Poisoned("purchase log".to_string()))?;
        Ok(purchases.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netbill_auth::Role;
    use netbill_core::AccessDuration;

    fn seeded_catalog(store: &BillingStore) -> (PlanId, LocationId) {
        let now = Utc::now();
        let plan = Plan::new(
            PlanId::new(),
            "Day Pass",
            Money::from_major(3),
            AccessDuration::from_hours(24),
            now,
        )
        .unwrap();
        let location = Location::new(LocationId::new(), "Harbor Cafe", now).unwrap();
        let ids = (plan.id, location.id);
        store.insert_plan(plan).unwrap();
        store.insert_location(location).unwrap();
        ids
    }

    #[test]
    fn duplicate_account_insert_is_rejected() {
        let store = BillingStore::new();
        let account = Account::open(AccountId::new(), Role::User, None, Utc::now());
        store.insert_account(account.clone()).unwrap();

        let err = store.insert_account(account).unwrap_err();
        match err {
            StoreError::Duplicate(_) => {}
            _ => panic!("Expected Duplicate"),
        }
    }

    #[test]
    fn credential_insert_requires_catalog_rows() {
        let store = BillingStore::new();
        let credential = Credential::provision(
            CredentialId::new(),
            LocationId::new(),
            PlanId::new(),
            "guest-001",
            "pw",
            Utc::now(),
        )
        .unwrap();

        let err = store.insert_credential(credential).unwrap_err();
        match err {
            StoreError::PlanNotFound(_) => {}
            _ => panic!("Expected PlanNotFound"),
        }
    }

    #[test]
    fn credential_username_must_be_unique_per_location_plan() {
        let store = BillingStore::new();
        let (plan_id, location_id) = seeded_catalog(&store);

        let first = Credential::provision(
            CredentialId::new(),
            location_id,
            plan_id,
            "guest-001",
            "pw",
            Utc::now(),
        )
        .unwrap();
        store.insert_credential(first).unwrap();

        let duplicate = Credential::provision(
            CredentialId::new(),
            location_id,
            plan_id,
            "guest-001",
            "other",
            Utc::now(),
        )
        .unwrap();
        let err = store.insert_credential(duplicate).unwrap_err();
        match err {
            StoreError::Duplicate(msg) => assert!(msg.contains("guest-001")),
            _ => panic!("Expected Duplicate"),
        }
    }

    #[test]
    fn admin_disable_enable_round_trip() {
        let store = BillingStore::new();
        let (plan_id, location_id) = seeded_catalog(&store);
        let credential = Credential::provision(
            CredentialId::new(),
            location_id,
            plan_id,
            "guest-001",
            "pw",
            Utc::now(),
        )
        .unwrap();
        let id = credential.id;
        store.insert_credential(credential).unwrap();

        store.disable_credential(id, Utc::now()).unwrap();
        assert_eq!(store.credential_status(id).unwrap(), CredentialStatus::Disabled);

        store.enable_credential(id, Utc::now()).unwrap();
        assert_eq!(store.credential_status(id).unwrap(), CredentialStatus::Available);
    }
}
