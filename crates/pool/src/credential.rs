use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use netbill_core::{AccountId, CredentialId, DomainError, DomainResult, LocationId, PlanId, Timestamps};

/// Credential lifecycle status.
///
/// Purchase drives `Available -> Leased`; administration drives
/// `Available <-> Disabled` and `Leased -> Available` (explicit reclamation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialStatus {
    Available,
    Leased,
    Disabled,
}

impl core::fmt::Display for CredentialStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            CredentialStatus::Available => "available",
            CredentialStatus::Leased => "leased",
            CredentialStatus::Disabled => "disabled",
        };
        f.write_str(s)
    }
}

/// Lease failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PoolError {
    #[error("credential is not available (status: {status})")]
    Unavailable { status: CredentialStatus },

    #[error("credential row is inconsistent: {0}")]
    Inconsistent(String),

    #[error("invalid status transition: {from} -> {to}")]
    InvalidTransition {
        from: CredentialStatus,
        to: CredentialStatus,
    },
}

/// What a successful lease hands back to the purchase: the credential
/// snapshot the buyer will use, plus the lease timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaseConfirmation {
    pub credential_id: CredentialId,
    pub username: String,
    pub password: String,
    pub leased_at: DateTime<Utc>,
}

/// One leasable credential row.
///
/// Invariants: at most one concurrent owner; `assigned_to`/`assigned_at` are
/// set exactly when status is `Leased`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub id: CredentialId,
    pub location_id: LocationId,
    pub plan_id: PlanId,
    pub username: String,
    pub password: String,
    pub status: CredentialStatus,
    pub assigned_to: Option<AccountId>,
    pub assigned_at: Option<DateTime<Utc>>,
    pub timestamps: Timestamps,
}

impl Credential {
    /// Provision a fresh `Available` credential (pool management path).
    pub fn provision(
        id: CredentialId,
        location_id: LocationId,
        plan_id: PlanId,
        username: impl Into<String>,
        password: impl Into<String>,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let username = username.into();
        let password = password.into();
        if username.trim().is_empty() {
            return Err(DomainError::validation("credential username cannot be empty"));
        }
        if password.is_empty() {
            return Err(DomainError::validation("credential password cannot be empty"));
        }

        Ok(Self {
            id,
            location_id,
            plan_id,
            username,
            password,
            status: CredentialStatus::Available,
            assigned_to: None,
            assigned_at: None,
            timestamps: Timestamps::at(now),
        })
    }

    pub fn is_available(&self) -> bool {
        self.status == CredentialStatus::Available
    }

    /// Exclusive lease acquisition: `Available -> Leased`.
    ///
    /// The caller must hold this row's lock; under it, the first caller to
    /// observe `Available` wins and every later caller observes `Leased`.
    pub fn try_lease(
        &mut self,
        owner: AccountId,
        at: DateTime<Utc>,
    ) -> Result<LeaseConfirmation, PoolError> {
        if self.status != CredentialStatus::Available {
            return Err(PoolError::Unavailable { status: self.status });
        }
        if let Some(existing) = self.assigned_to {
            return Err(PoolError::Inconsistent(format!(
                "available credential already assigned to {existing}"
            )));
        }

        self.status = CredentialStatus::Leased;
        self.assigned_to = Some(owner);
        self.assigned_at = Some(at);
        self.timestamps.touch(at);

        Ok(LeaseConfirmation {
            credential_id: self.id,
            username: self.username.clone(),
            password: self.password.clone(),
            leased_at: at,
        })
    }

    /// Administrative reclamation: `Leased -> Available`.
    pub fn release(&mut self, now: DateTime<Utc>) -> Result<(), PoolError> {
        if self.status != CredentialStatus::Leased {
            return Err(PoolError::InvalidTransition {
                from: self.status,
                to: CredentialStatus::Available,
            });
        }
        self.status = CredentialStatus::Available;
        self.assigned_to = None;
        self.assigned_at = None;
        self.timestamps.touch(now);
        Ok(())
    }

    /// Administrative: `Available -> Disabled`. Leased units cannot be
    /// disabled out from under their owner.
    pub fn disable(&mut self, now: DateTime<Utc>) -> Result<(), PoolError> {
        if self.status != CredentialStatus::Available {
            return Err(PoolError::InvalidTransition {
                from: self.status,
                to: CredentialStatus::Disabled,
            });
        }
        self.status = CredentialStatus::Disabled;
        self.timestamps.touch(now);
        Ok(())
    }

    /// Administrative: `Disabled -> Available`.
    pub fn enable(&mut self, now: DateTime<Utc>) -> Result<(), PoolError> {
        if self.status != CredentialStatus::Disabled {
            return Err(PoolError::InvalidTransition {
                from: self.status,
                to: CredentialStatus::Available,
            });
        }
        self.status = CredentialStatus::Available;
        self.timestamps.touch(now);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_credential() -> Credential {
        Credential::provision(
            CredentialId::new(),
            LocationId::new(),
            PlanId::new(),
            "guest-001",
            "s3cret",
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn lease_moves_available_to_leased_with_owner_and_timestamp() {
        let mut credential = test_credential();
        let owner = AccountId::new();
        let at = Utc::now();

        let confirmation = credential.try_lease(owner, at).unwrap();

        assert_eq!(credential.status, CredentialStatus::Leased);
        assert_eq!(credential.assigned_to, Some(owner));
        assert_eq!(credential.assigned_at, Some(at));
        assert_eq!(confirmation.username, "guest-001");
        assert_eq!(confirmation.password, "s3cret");
        assert_eq!(confirmation.leased_at, at);
    }

    #[test]
    fn leased_credential_cannot_be_leased_again() {
        let mut credential = test_credential();
        credential.try_lease(AccountId::new(), Utc::now()).unwrap();

        let err = credential.try_lease(AccountId::new(), Utc::now()).unwrap_err();
        assert_eq!(
            err,
            PoolError::Unavailable {
                status: CredentialStatus::Leased
            }
        );
    }

    #[test]
    fn disabled_credential_cannot_be_leased() {
        let mut credential = test_credential();
        credential.disable(Utc::now()).unwrap();

        let err = credential.try_lease(AccountId::new(), Utc::now()).unwrap_err();
        assert_eq!(
            err,
            PoolError::Unavailable {
                status: CredentialStatus::Disabled
            }
        );
    }

    #[test]
    fn inconsistent_row_is_rejected_not_leased() {
        let mut credential = test_credential();
        credential.assigned_to = Some(AccountId::new());

        let err = credential.try_lease(AccountId::new(), Utc::now()).unwrap_err();
        match err {
            PoolError::Inconsistent(_) => {}
            _ => panic!("Expected Inconsistent"),
        }
        // Status untouched by the failed lease.
        assert_eq!(credential.status, CredentialStatus::Available);
    }

    #[test]
    fn release_returns_a_leased_unit_to_the_pool() {
        let mut credential = test_credential();
        credential.try_lease(AccountId::new(), Utc::now()).unwrap();

        credential.release(Utc::now()).unwrap();

        assert_eq!(credential.status, CredentialStatus::Available);
        assert_eq!(credential.assigned_to, None);
        assert_eq!(credential.assigned_at, None);
    }

    #[test]
    fn disable_is_only_valid_from_available() {
        let mut credential = test_credential();
        credential.try_lease(AccountId::new(), Utc::now()).unwrap();

        let err = credential.disable(Utc::now()).unwrap_err();
        assert_eq!(
            err,
            PoolError::InvalidTransition {
                from: CredentialStatus::Leased,
                to: CredentialStatus::Disabled,
            }
        );
    }

    #[test]
    fn enable_round_trips_disabled_back_to_available() {
        let mut credential = test_credential();
        credential.disable(Utc::now()).unwrap();
        credential.enable(Utc::now()).unwrap();
        assert!(credential.is_available());
    }

    #[test]
    fn provision_rejects_blank_username_or_password() {
        assert!(Credential::provision(
            CredentialId::new(),
            LocationId::new(),
            PlanId::new(),
            " ",
            "pw",
            Utc::now()
        )
        .is_err());
        assert!(Credential::provision(
            CredentialId::new(),
            LocationId::new(),
            PlanId::new(),
            "guest",
            "",
            Utc::now()
        )
        .is_err());
    }
}
