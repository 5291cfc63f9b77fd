//! Subscription types for ignews billing.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{CustomerId, SubscriptionId, UserId};

/// The identifiers a webhook hands to persistence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionRef {
    /// Stripe subscription ID.
    pub subscription_id: SubscriptionId,
    /// Stripe customer ID.
    pub customer_id: CustomerId,
}

impl SubscriptionRef {
    /// Create a reference from already-validated IDs.
    #[must_use]
    pub const fn new(subscription_id: SubscriptionId, customer_id: CustomerId) -> Self {
        Self {
            subscription_id,
            customer_id,
        }
    }
}

/// A persisted subscription record, keyed by subscription ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    /// Stripe subscription ID.
    pub id: SubscriptionId,
    /// The user owning the Stripe customer.
    pub user_id: UserId,
    /// Stripe customer ID.
    pub customer_id: CustomerId,
    /// Last known status; `None` when it could not be fetched from Stripe.
    pub status: Option<SubscriptionStatus>,
    /// Price of the first subscription item.
    pub price_id: Option<String>,
    /// When this record was last written.
    pub updated_at: DateTime<Utc>,
}

impl Subscription {
    /// Build a record for `reference` owned by `user_id`, stamped now.
    #[must_use]
    pub fn new(reference: SubscriptionRef, user_id: UserId) -> Self {
        Self {
            id: reference.subscription_id,
            user_id,
            customer_id: reference.customer_id,
            status: None,
            price_id: None,
            updated_at: Utc::now(),
        }
    }

    /// Whether the subscription currently grants access.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status.is_some_and(|s| s.is_active())
    }
}

/// Status of a Stripe subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// Payment is collected and the subscription is in good standing.
    Active,
    /// In a trial period.
    Trialing,
    /// Latest payment failed; Stripe is retrying.
    PastDue,
    /// Retries exhausted without payment.
    Unpaid,
    /// Cancelled.
    Canceled,
    /// First payment has not succeeded yet.
    Incomplete,
    /// First payment never succeeded within the window.
    IncompleteExpired,
    /// Paused after a trial without a payment method.
    Paused,
    /// A status this service does not know about.
    #[serde(other)]
    Unknown,
}

impl SubscriptionStatus {
    /// Whether this status grants access to subscriber content.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Active | Self::Trialing)
    }

    /// Stripe's string for this status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Trialing => "trialing",
            Self::PastDue => "past_due",
            Self::Unpaid => "unpaid",
            Self::Canceled => "canceled",
            Self::Incomplete => "incomplete",
            Self::IncompleteExpired => "incomplete_expired",
            Self::Paused => "paused",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubscriptionStatus {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "active" => Self::Active,
            "trialing" => Self::Trialing,
            "past_due" => Self::PastDue,
            "unpaid" => Self::Unpaid,
            "canceled" => Self::Canceled,
            "incomplete" => Self::Incomplete,
            "incomplete_expired" => Self::IncompleteExpired,
            "paused" => Self::Paused,
            _ => Self::Unknown,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference() -> SubscriptionRef {
        SubscriptionRef::new(
            SubscriptionId::new("sub_1").unwrap(),
            CustomerId::new("cus_1").unwrap(),
        )
    }

    #[test]
    fn new_record_has_unknown_status() {
        let record = Subscription::new(reference(), UserId::generate());
        assert_eq!(record.id.as_str(), "sub_1");
        assert_eq!(record.customer_id.as_str(), "cus_1");
        assert!(record.status.is_none());
        assert!(!record.is_active());
    }

    #[test]
    fn active_statuses() {
        assert!(SubscriptionStatus::Active.is_active());
        assert!(SubscriptionStatus::Trialing.is_active());
        assert!(!SubscriptionStatus::PastDue.is_active());
        assert!(!SubscriptionStatus::Canceled.is_active());
    }

    #[test]
    fn status_string_matches_serde() {
        let json = serde_json::to_string(&SubscriptionStatus::IncompleteExpired).unwrap();
        assert_eq!(json, "\"incomplete_expired\"");
        assert_eq!(
            "incomplete_expired".parse::<SubscriptionStatus>().unwrap(),
            SubscriptionStatus::IncompleteExpired
        );
    }

    #[test]
    fn unknown_status_is_tolerated() {
        let status: SubscriptionStatus = serde_json::from_str("\"on_hold\"").unwrap();
        assert_eq!(status, SubscriptionStatus::Unknown);
    }
}
