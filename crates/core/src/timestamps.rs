//! Created/updated timestamps with the touch-on-mutation convention.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Row bookkeeping timestamps.
///
/// Every entity mutation path calls `touch` so `updated_at` tracks the last
/// modification. Creation sets both fields to the same instant.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timestamps {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Timestamps {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}
