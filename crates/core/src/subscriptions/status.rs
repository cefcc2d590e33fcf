//! Subscription status

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::errors::ParseEnumError;

/// Lifecycle of a subscription. `Cancelled` and `Expired` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    /// Producing orders
    Active,
    /// Temporarily stopped by the owner
    Paused,
    /// Stopped by the owner
    Cancelled,
    /// Reached its order cap
    Expired,
}

impl SubscriptionStatus {
    /// Every status.
    pub const ALL: [Self; 4] = [Self::Active, Self::Paused, Self::Cancelled, Self::Expired];

    /// Statuses reachable from this one.
    #[must_use]
    pub const fn next_statuses(self) -> &'static [Self] {
        match self {
            Self::Active => &[Self::Paused, Self::Cancelled, Self::Expired],
            Self::Paused => &[Self::Active, Self::Cancelled],
            Self::Cancelled | Self::Expired => &[],
        }
    }

    /// Whether the table allows moving to `next`.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.next_statuses().contains(&next)
    }

    /// Whether no further transitions exist.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Cancelled | Self::Expired)
    }

    /// Lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Cancelled => "cancelled",
            Self::Expired => "expired",
        }
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubscriptionStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseEnumError::new("subscription status", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_statuses_have_no_exits() {
        for status in SubscriptionStatus::ALL {
            assert_eq!(
                status.next_statuses().is_empty(),
                status.is_terminal(),
                "{status}"
            );
        }
    }

    #[test]
    fn only_active_expires() {
        assert!(SubscriptionStatus::Active.can_transition_to(SubscriptionStatus::Expired));
        assert!(!SubscriptionStatus::Paused.can_transition_to(SubscriptionStatus::Expired));
    }

    #[test]
    fn paused_can_resume_or_cancel() {
        assert!(SubscriptionStatus::Paused.can_transition_to(SubscriptionStatus::Active));
        assert!(SubscriptionStatus::Paused.can_transition_to(SubscriptionStatus::Cancelled));
        assert!(!SubscriptionStatus::Cancelled.can_transition_to(SubscriptionStatus::Active));
    }
}
