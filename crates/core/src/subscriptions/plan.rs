//! Subscription plans

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::errors::ParseEnumError;

/// Delivery cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubscriptionPlan {
    /// Every 7 days
    Weekly,
    /// Every 14 days
    BiWeekly,
    /// Every 30 days
    Monthly,
}

impl SubscriptionPlan {
    /// Every plan.
    pub const ALL: [Self; 3] = [Self::Weekly, Self::BiWeekly, Self::Monthly];

    /// Days between orders.
    #[must_use]
    pub const fn frequency_days(self) -> u32 {
        match self {
            Self::Weekly => 7,
            Self::BiWeekly => 14,
            Self::Monthly => 30,
        }
    }

    /// Kebab-case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::BiWeekly => "bi-weekly",
            Self::Monthly => "monthly",
        }
    }
}

impl fmt::Display for SubscriptionPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubscriptionPlan {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|plan| plan.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseEnumError::new("subscription plan", s))
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn frequencies() {
        assert_eq!(SubscriptionPlan::Weekly.frequency_days(), 7);
        assert_eq!(SubscriptionPlan::BiWeekly.frequency_days(), 14);
        assert_eq!(SubscriptionPlan::Monthly.frequency_days(), 30);
    }

    #[test]
    fn parses_names() -> TestResult {
        assert_eq!(
            "bi-weekly".parse::<SubscriptionPlan>()?,
            SubscriptionPlan::BiWeekly
        );
        assert!("fortnightly".parse::<SubscriptionPlan>().is_err());

        Ok(())
    }
}
