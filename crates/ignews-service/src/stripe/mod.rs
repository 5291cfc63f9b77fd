//! Stripe integration.
//!
//! Stripe handles:
//! - Signing webhook deliveries (verified in [`webhook`])
//! - Serving the current state of subscriptions (fetched by [`client`])

pub mod client;
pub mod types;
pub mod webhook;

pub use client::{StripeClient, StripeError};
pub use webhook::{generate_test_header, SignatureError, WebhookVerifier, SIGNATURE_HEADER};
