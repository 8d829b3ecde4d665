use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use netbill_auth::Role;
use netbill_core::{AccountId, Money, Timestamps};

/// Balance mutation failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("insufficient funds: required {required}, available {available}")]
    InsufficientFunds { required: Money, available: Money },

    #[error("amount must be positive")]
    NonPositiveAmount,

    #[error("balance arithmetic overflow")]
    Overflow,
}

/// A prepaid billing account.
///
/// Invariant: `balance` is never negative between transactions. The only
/// mutation paths are `debit` and `credit`; both `touch` the row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub balance: Money,
    pub referred_by: Option<AccountId>,
    pub role: Role,
    pub timestamps: Timestamps,
}

impl Account {
    /// Open a zero-balance account (invoked by the registry hook after
    /// identity registration).
    pub fn open(
        id: AccountId,
        role: Role,
        referred_by: Option<AccountId>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            balance: Money::ZERO,
            referred_by,
            role,
            timestamps: Timestamps::at(now),
        }
    }

    pub fn balance(&self) -> Money {
        self.balance
    }

    /// Debit with sufficiency check. Returns the new balance.
    ///
    /// Must only be called while the enclosing atomic scope holds this
    /// account's row lock.
    pub fn debit(&mut self, amount: Money, now: DateTime<Utc>) -> Result<Money, LedgerError> {
        if !amount.is_positive() {
            return Err(LedgerError::NonPositiveAmount);
        }
        if self.balance < amount {
            return Err(LedgerError::InsufficientFunds {
                required: amount,
                available: self.balance,
            });
        }
        self.balance = self
            .balance
            .checked_sub(amount)
            .ok_or(LedgerError::Overflow)?;
        self.timestamps.touch(now);
        Ok(self.balance)
    }

    /// Credit the balance (wallet funding, or a rollback of this
    /// invocation's own debit). Returns the new balance.
    pub fn credit(&mut self, amount: Money, now: DateTime<Utc>) -> Result<Money, LedgerError> {
        if !amount.is_positive() {
            return Err(LedgerError::NonPositiveAmount);
        }
        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        self.timestamps.touch(now);
        Ok(self.balance)
    }
}
