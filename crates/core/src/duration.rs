//! Access durations expressed in hours, with exact fractional arithmetic.
//!
//! Plans quote durations in hours, and fractional hours must never be
//! silently truncated when computing an expiry. Durations are therefore
//! stored as `i64` milli-hours: one milli-hour is exactly 3600 ms, so any
//! duration down to 0.001h converts to a `chrono::Duration` without loss.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

const MILLIS_PER_MILLIHOUR: i64 = 3_600;

/// A time-boxed access duration (milli-hours).
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct AccessDuration(i64);

impl AccessDuration {
    pub const fn from_hours(hours: i64) -> Self {
        Self(hours * 1_000)
    }

    /// Fractional durations, e.g. `from_millihours(1_500)` is 1.5 hours.
    pub const fn from_millihours(millihours: i64) -> Self {
        Self(millihours)
    }

    pub const fn as_millihours(self) -> i64 {
        self.0
    }

    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub fn require_positive(self) -> DomainResult<AccessDuration> {
        if self.is_positive() {
            Ok(self)
        } else {
            Err(DomainError::validation("duration must be positive"))
        }
    }

    /// Exact conversion; every milli-hour is a whole number of milliseconds.
    pub fn to_chrono(self) -> Duration {
        Duration::milliseconds(self.0 * MILLIS_PER_MILLIHOUR)
    }

    /// `start + self`, the expiry rule used by every purchase.
    pub fn expiry_from(self, start: DateTime<Utc>) -> DateTime<Utc> {
        start + self.to_chrono()
    }
}

impl core::fmt::Display for AccessDuration {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.0 % 1_000 == 0 {
            write!(f, "{}h", self.0 / 1_000)
        } else {
            write!(f, "{}.{:03}h", self.0 / 1_000, (self.0 % 1_000).unsigned_abs())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn whole_hours_convert_exactly() {
        assert_eq!(AccessDuration::from_hours(24).to_chrono(), Duration::hours(24));
    }

    #[test]
    fn fractional_hours_are_not_truncated() {
        // 1.5h = 90 minutes, 0.001h = 3.6 seconds.
        assert_eq!(
            AccessDuration::from_millihours(1_500).to_chrono(),
            Duration::minutes(90)
        );
        assert_eq!(
            AccessDuration::from_millihours(1).to_chrono(),
            Duration::milliseconds(3_600)
        );
    }

    #[test]
    fn expiry_is_start_plus_duration() {
        let start = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let expiry = AccessDuration::from_hours(24).expiry_from(start);
        assert_eq!(expiry, Utc.with_ymd_and_hms(2025, 6, 2, 12, 0, 0).unwrap());
    }

    #[test]
    fn display_formats_whole_and_fractional() {
        assert_eq!(AccessDuration::from_hours(24).to_string(), "24h");
        assert_eq!(AccessDuration::from_millihours(1_500).to_string(), "1.500h");
    }

    #[test]
    fn zero_duration_is_rejected() {
        assert!(AccessDuration::from_hours(0).require_positive().is_err());
    }
}
