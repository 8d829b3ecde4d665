//! `netbill-pool` — the finite pool of leasable access credentials.
//!
//! Each credential is a reusable (username, password) pair scoped to one
//! (location, plan). Pure domain logic: exclusivity comes from the store
//! layer holding the credential's row lock around `try_lease`.

pub mod credential;

pub use credential::{Credential, CredentialStatus, LeaseConfirmation, PoolError};
