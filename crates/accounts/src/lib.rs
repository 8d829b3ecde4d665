//! `netbill-accounts` — prepaid account balances (the AccountLedger).
//!
//! Pure domain logic only: no IO, no locking, no persistence concerns. The
//! store layer is responsible for holding the row lock while `debit` and
//! `credit` run, so their effects commit or roll back together with the
//! paired lease.

pub mod account;

pub use account::{Account, LedgerError};
