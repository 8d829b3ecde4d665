use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use netbill_core::{AccessDuration, DomainError, DomainResult, Money, PlanId, Timestamps};

/// An access plan: what one purchase buys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub id: PlanId,
    pub name: String,
    pub price: Money,
    pub duration: AccessDuration,
    pub timestamps: Timestamps,
}

impl Plan {
    pub fn new(
        id: PlanId,
        name: impl Into<String>,
        price: Money,
        duration: AccessDuration,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("plan name cannot be empty"));
        }
        let price = price.require_positive("plan price")?;
        let duration = duration.require_positive()?;

        Ok(Self {
            id,
            name,
            price,
            duration,
            timestamps: Timestamps::at(now),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_requires_name_price_and_duration() {
        let now = Utc::now();
        assert!(Plan::new(
            PlanId::new(),
            "Day Pass",
            Money::from_major(3),
            AccessDuration::from_hours(24),
            now
        )
        .is_ok());

        assert!(Plan::new(PlanId::new(), "  ", Money::from_major(3), AccessDuration::from_hours(24), now).is_err());
        assert!(Plan::new(PlanId::new(), "Day Pass", Money::ZERO, AccessDuration::from_hours(24), now).is_err());
        assert!(Plan::new(PlanId::new(), "Day Pass", Money::from_major(3), AccessDuration::from_hours(0), now).is_err());
    }
}
