//! Per-row authorization policy.
//!
//! The policy is a pure predicate keyed by (role, operation kind, row scope):
//! admins manage everything, users read rows they own, and rows flagged as
//! openly readable (e.g. an `Available` pool credential) are visible to any
//! authenticated user. Evaluated before the purchase core runs; never inside
//! its atomic scope.

use thiserror::Error;

use netbill_core::AccountId;

use crate::Principal;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: {0}")]
    Forbidden(String),
}

/// Operation kind being evaluated against a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAction {
    Read,
    Manage,
}

/// The authorization-relevant shape of a row.
///
/// Rows do not carry policy themselves; callers derive a scope from the row
/// (who owns it, whether it is openly readable) and hand it to `authorize`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowScope {
    pub owner: Option<AccountId>,
    pub open_read: bool,
}

impl RowScope {
    /// A row owned by one account (account rows, purchase records).
    pub fn owned_by(owner: AccountId) -> Self {
        Self {
            owner: Some(owner),
            open_read: false,
        }
    }

    /// An unowned row readable by any authenticated user, e.g. an
    /// `Available` credential advertised in the pool.
    pub fn open() -> Self {
        Self {
            owner: None,
            open_read: true,
        }
    }

    /// An unowned row only administrators may see or manage.
    pub fn admin_only() -> Self {
        Self {
            owner: None,
            open_read: false,
        }
    }
}

/// Authorize one operation against one row.
///
/// - No IO
/// - No panics
/// - No business logic (pure policy check)
pub fn authorize(
    principal: &Principal,
    action: RowAction,
    scope: RowScope,
) -> Result<(), AuthzError> {
    if principal.is_admin() {
        return Ok(());
    }

    let owns = scope.owner == Some(principal.account_id);
    match action {
        RowAction::Read if owns || scope.open_read => Ok(()),
        RowAction::Manage if owns => Ok(()),
        RowAction::Read => Err(AuthzError::Forbidden(
            "row is not readable by this account".to_string(),
        )),
        RowAction::Manage => Err(AuthzError::Forbidden(
            "row is not managed by this account".to_string(),
        )),
    }
}

/// Purchases run with elevated privileges inside the orchestrator, so the
/// gate must confirm up front that the caller is the paying account's owner
/// (or an administrator acting on its behalf).
pub fn ensure_purchase_allowed(
    principal: &Principal,
    paying_account: AccountId,
) -> Result<(), AuthzError> {
    if principal.is_admin() || principal.account_id == paying_account {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(
            "only the account owner may purchase against this balance".to_string(),
        ))
    }
}
