use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use netbill_core::{DomainError, DomainResult, LocationId, Timestamps};

/// A service location a credential pool is scoped to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    pub name: String,
    pub timestamps: Timestamps,
}

impl Location {
    pub fn new(id: LocationId, name: impl Into<String>, now: DateTime<Utc>) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("location name cannot be empty"));
        }
        Ok(Self {
            id,
            name,
            timestamps: Timestamps::at(now),
        })
    }
}
