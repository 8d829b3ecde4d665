use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use netbill_core::{
    AccessDuration, AccountId, CredentialId, LocationId, Money, PlanId, PurchaseId,
};
use netbill_pool::LeaseConfirmation;

/// What kind of billing event a record captures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseKind {
    WalletTopup,
    PlanPurchase,
    WalletFunding,
}

/// Record lifecycle status.
///
/// `Completed` is the terminal state of a plan purchase; funding records use
/// `Success` (the distinction comes from the upstream schema and is kept so
/// readers of the log can tell the two flows apart).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PurchaseStatus {
    Pending,
    Completed,
    Failed,
    Success,
}

/// One row of the append-only purchase log.
///
/// Written exactly once by the orchestrator (plan purchases) or the registry
/// funding hook (wallet credits); immutable afterwards. Credential snapshot
/// fields are only set for plan purchases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseRecord {
    pub id: PurchaseId,
    pub account_id: AccountId,
    pub plan_id: Option<PlanId>,
    pub location_id: Option<LocationId>,
    pub credential_id: Option<CredentialId>,
    pub amount: Money,
    pub kind: PurchaseKind,
    pub status: PurchaseStatus,
    pub username: Option<String>,
    pub password: Option<String>,
    pub purchased_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub payment_ref: Option<String>,
    pub metadata: JsonValue,
}

impl PurchaseRecord {
    /// The record a successful plan purchase appends: completed, with the
    /// leased credential's snapshot and the exact computed expiry.
    #[allow(clippy::too_many_arguments)]
    pub fn plan_purchase(
        id: PurchaseId,
        account_id: AccountId,
        plan_id: PlanId,
        location_id: LocationId,
        lease: &LeaseConfirmation,
        amount: Money,
        duration: AccessDuration,
        purchased_at: DateTime<Utc>,
        payment_ref: Option<String>,
        metadata: JsonValue,
    ) -> Self {
        Self {
            id,
            account_id,
            plan_id: Some(plan_id),
            location_id: Some(location_id),
            credential_id: Some(lease.credential_id),
            amount,
            kind: PurchaseKind::PlanPurchase,
            status: PurchaseStatus::Completed,
            username: Some(lease.username.clone()),
            password: Some(lease.password.clone()),
            purchased_at,
            expires_at: Some(duration.expiry_from(purchased_at)),
            payment_ref,
            metadata,
        }
    }

    /// The record a wallet credit appends (no credential, no expiry).
    pub fn wallet_credit(
        id: PurchaseId,
        account_id: AccountId,
        amount: Money,
        kind: PurchaseKind,
        purchased_at: DateTime<Utc>,
        payment_ref: Option<String>,
    ) -> Self {
        Self {
            id,
            account_id,
            plan_id: None,
            location_id: None,
            credential_id: None,
            amount,
            kind,
            status: PurchaseStatus::Success,
            username: None,
            password: None,
            purchased_at,
            expires_at: None,
            payment_ref,
            metadata: JsonValue::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn test_lease() -> LeaseConfirmation {
        LeaseConfirmation {
            credential_id: CredentialId::new(),
            username: "guest-001".to_string(),
            password: "s3cret".to_string(),
            leased_at: Utc::now(),
        }
    }

    #[test]
    fn plan_purchase_record_snapshots_credential_and_computes_expiry() {
        let purchased_at = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let lease = test_lease();

        let record = PurchaseRecord::plan_purchase(
            PurchaseId::new(),
            AccountId::new(),
            PlanId::new(),
            LocationId::new(),
            &lease,
            Money::from_major(300),
            AccessDuration::from_hours(24),
            purchased_at,
            None,
            JsonValue::Null,
        );

        assert_eq!(record.kind, PurchaseKind::PlanPurchase);
        assert_eq!(record.status, PurchaseStatus::Completed);
        assert_eq!(record.username.as_deref(), Some("guest-001"));
        assert_eq!(record.password.as_deref(), Some("s3cret"));
        assert_eq!(
            record.expires_at,
            Some(Utc.with_ymd_and_hms(2025, 6, 2, 12, 0, 0).unwrap())
        );
    }

    #[test]
    fn fractional_hour_expiry_is_exact() {
        let purchased_at = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let record = PurchaseRecord::plan_purchase(
            PurchaseId::new(),
            AccountId::new(),
            PlanId::new(),
            LocationId::new(),
            &test_lease(),
            Money::from_major(2),
            AccessDuration::from_millihours(1_500),
            purchased_at,
            None,
            JsonValue::Null,
        );

        assert_eq!(
            record.expires_at,
            Some(Utc.with_ymd_and_hms(2025, 6, 1, 13, 30, 0).unwrap())
        );
    }

    #[test]
    fn wallet_credit_record_has_no_credential_or_expiry() {
        let record = PurchaseRecord::wallet_credit(
            PurchaseId::new(),
            AccountId::new(),
            Money::from_major(50),
            PurchaseKind::WalletTopup,
            Utc::now(),
            Some("gw-9912".to_string()),
        );

        assert_eq!(record.status, PurchaseStatus::Success);
        assert_eq!(record.credential_id, None);
        assert_eq!(record.expires_at, None);
        assert_eq!(record.payment_ref.as_deref(), Some("gw-9912"));
    }

    #[test]
    fn kind_serializes_with_snake_case_tags() {
        assert_eq!(
            serde_json::to_string(&PurchaseKind::PlanPurchase).unwrap(),
            "\"plan_purchase\""
        );
        assert_eq!(
            serde_json::to_string(&PurchaseKind::WalletTopup).unwrap(),
            "\"wallet_topup\""
        );
    }
}
