//! Stripe webhook event envelope and the payloads this service reads.
//!
//! Only the fields needed to build a [`SubscriptionRef`] are modelled; the
//! rest of each Stripe object is ignored during deserialization.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::PayloadError;
use crate::ids::{CustomerId, SubscriptionId};
use crate::subscription::{SubscriptionRef, SubscriptionStatus};

/// The event kinds this service reacts to.
///
/// Every other Stripe event type is acknowledged without processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// `checkout.session.completed`
    CheckoutSessionCompleted,
    /// `customer.subscription.created`
    CustomerSubscriptionCreated,
    /// `customer.subscription.updated`
    CustomerSubscriptionUpdated,
    /// `customer.subscription.deleted`
    CustomerSubscriptionDeleted,
}

impl EventKind {
    /// All relevant kinds, in Stripe's naming order.
    pub const ALL: [Self; 4] = [
        Self::CheckoutSessionCompleted,
        Self::CustomerSubscriptionCreated,
        Self::CustomerSubscriptionUpdated,
        Self::CustomerSubscriptionDeleted,
    ];

    /// Map a Stripe event `type` string to a kind.
    ///
    /// Returns `None` for event types outside the allow-list.
    #[must_use]
    pub fn from_type(event_type: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == event_type)
    }

    /// The Stripe event `type` string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CheckoutSessionCompleted => "checkout.session.completed",
            Self::CustomerSubscriptionCreated => "customer.subscription.created",
            Self::CustomerSubscriptionUpdated => "customer.subscription.updated",
            Self::CustomerSubscriptionDeleted => "customer.subscription.deleted",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stripe webhook event.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Event {
    /// Event ID (`evt_...`).
    pub id: String,
    /// Event type (e.g., "checkout.session.completed").
    #[serde(rename = "type")]
    pub event_type: String,
    /// Created timestamp (Unix).
    #[serde(default)]
    pub created: i64,
    /// Whether the event was sent in live mode.
    #[serde(default)]
    pub livemode: bool,
    /// Event data.
    pub data: EventData,
}

/// Webhook event data container.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EventData {
    /// The event object; its shape depends on the event type.
    pub object: serde_json::Value,
}

impl Event {
    /// The relevant kind of this event, if it is one.
    #[must_use]
    pub fn kind(&self) -> Option<EventKind> {
        EventKind::from_type(&self.event_type)
    }

    /// Read `data.object` as a Checkout session.
    ///
    /// # Errors
    ///
    /// Returns `PayloadError::Malformed` if the object does not have the
    /// shape of a Checkout session.
    pub fn checkout_session(&self) -> Result<CheckoutSession, PayloadError> {
        CheckoutSession::deserialize(&self.data.object).map_err(|source| {
            PayloadError::Malformed {
                object: "checkout.session",
                source,
            }
        })
    }

    /// Read `data.object` as a subscription.
    ///
    /// # Errors
    ///
    /// Returns `PayloadError::Malformed` if the object does not have the
    /// shape of a subscription.
    pub fn subscription(&self) -> Result<StripeSubscription, PayloadError> {
        StripeSubscription::deserialize(&self.data.object).map_err(|source| {
            PayloadError::Malformed {
                object: "subscription",
                source,
            }
        })
    }
}

/// A Stripe field that is either an ID or, when expanded, the full object.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Expandable {
    /// Unexpanded reference.
    Id(String),
    /// Expanded object; only its `id` is kept.
    Object {
        /// ID of the expanded object.
        id: String,
    },
}

impl Expandable {
    /// The referenced object's ID.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Id(id) | Self::Object { id } => id,
        }
    }
}

/// Stripe Checkout session object.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CheckoutSession {
    /// Session ID.
    pub id: String,
    /// Subscription created by the session (subscription mode only).
    #[serde(default)]
    pub subscription: Option<Expandable>,
    /// Customer ID.
    #[serde(default)]
    pub customer: Option<Expandable>,
}

impl CheckoutSession {
    /// Extract the subscription and customer this session produced.
    ///
    /// # Errors
    ///
    /// Returns `PayloadError::MissingField` if either field is null, or
    /// `PayloadError::InvalidId` if one is blank.
    pub fn subscription_ref(&self) -> Result<SubscriptionRef, PayloadError> {
        let subscription = self
            .subscription
            .as_ref()
            .ok_or(PayloadError::MissingField("subscription"))?;
        let customer = self
            .customer
            .as_ref()
            .ok_or(PayloadError::MissingField("customer"))?;

        Ok(SubscriptionRef {
            subscription_id: parse_id(subscription.id(), "subscription")?,
            customer_id: parse_id(customer.id(), "customer")?,
        })
    }
}

/// Stripe subscription object.
///
/// Used both for webhook payloads and for `GET /v1/subscriptions/{id}`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeSubscription {
    /// Subscription ID.
    pub id: String,
    /// Customer owning the subscription.
    pub customer: Expandable,
    /// Current status.
    #[serde(default)]
    pub status: Option<SubscriptionStatus>,
    /// Subscription items.
    #[serde(default)]
    pub items: SubscriptionItems,
}

impl StripeSubscription {
    /// Extract the subscription and customer IDs.
    ///
    /// # Errors
    ///
    /// Returns `PayloadError::InvalidId` if either ID is blank.
    pub fn subscription_ref(&self) -> Result<SubscriptionRef, PayloadError> {
        Ok(SubscriptionRef {
            subscription_id: parse_id(&self.id, "id")?,
            customer_id: parse_id(self.customer.id(), "customer")?,
        })
    }

    /// Price of the first subscription item, if any.
    #[must_use]
    pub fn price_id(&self) -> Option<&str> {
        self.items
            .data
            .first()
            .and_then(|item| item.price.as_ref())
            .map(|price| price.id.as_str())
    }
}

/// List of subscription items.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SubscriptionItems {
    /// Items.
    #[serde(default)]
    pub data: Vec<SubscriptionItem>,
}

/// A single subscription item.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SubscriptionItem {
    /// Price of the item.
    #[serde(default)]
    pub price: Option<Price>,
}

/// Stripe price reference.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Price {
    /// Price ID (`price_...`).
    pub id: String,
}

fn parse_id<T>(value: &str, field: &'static str) -> Result<T, PayloadError>
where
    T: for<'a> TryFrom<&'a str, Error = crate::IdError>,
{
    T::try_from(value).map_err(|source| PayloadError::InvalidId { field, source })
}
