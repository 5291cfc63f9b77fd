//! Core types for ignews billing.
//!
//! This crate provides the types shared by the store and the webhook service:
//!
//! - **Identifiers**: `SubscriptionId`, `CustomerId`, `UserId`
//! - **Events**: `Event`, `EventKind`, and the Stripe payloads read from them
//! - **Subscriptions**: `SubscriptionRef`, `Subscription`, `SubscriptionStatus`

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod event;
pub mod ids;
pub mod subscription;

pub use error::PayloadError;
pub use event::{
    CheckoutSession, Event, EventData, EventKind, Expandable, Price, StripeSubscription,
    SubscriptionItem, SubscriptionItems,
};
pub use ids::{CustomerId, IdError, SubscriptionId, UserId};
pub use subscription::{Subscription, SubscriptionRef, SubscriptionStatus};
