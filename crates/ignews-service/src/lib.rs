//! ignews billing webhook service.
//!
//! Receives Stripe webhook deliveries, verifies their signatures, and keeps
//! the subscription records of ignews users in step with Stripe:
//!
//! - `checkout.session.completed` saves the subscription created at checkout
//! - `customer.subscription.updated` / `.deleted` refresh an existing one
//!
//! Every other event type is acknowledged and ignored.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are noisy for Axum handler functions
#![allow(clippy::missing_errors_doc)] // Axum handlers all return Result
#![allow(clippy::unused_async)] // Axum handlers must be async

pub mod config;
pub mod crypto;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;
pub mod stripe;
pub mod subscriptions;

pub use config::ServiceConfig;
pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
pub use stripe::{StripeClient, StripeError, WebhookVerifier};
pub use subscriptions::{SaveError, SubscriptionManager, SubscriptionWriter};
