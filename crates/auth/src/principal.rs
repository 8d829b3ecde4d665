use serde::{Deserialize, Serialize};

use netbill_core::AccountId;

use crate::Role;

/// A resolved caller identity for authorization decisions.
///
/// Construction is decoupled from transport: whatever authenticates the
/// caller (session, token) resolves to an account id plus its role tag
/// before the policy predicate runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub account_id: AccountId,
    pub role: Role,
}

impl Principal {
    pub fn new(account_id: AccountId, role: Role) -> Self {
        Self { account_id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}
