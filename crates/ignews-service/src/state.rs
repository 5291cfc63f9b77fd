//! Application state.

use std::sync::Arc;

use ignews_store::SubscriptionStore;

use crate::config::ServiceConfig;
use crate::stripe::{StripeClient, WebhookVerifier};
use crate::subscriptions::{SubscriptionManager, SubscriptionWriter};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Service configuration.
    pub config: ServiceConfig,

    /// Verifier built from the configured signing secret.
    pub verifier: WebhookVerifier,

    /// Persistence for subscriptions named by webhooks.
    pub subscriptions: Arc<dyn SubscriptionWriter>,
}

impl AppState {
    /// Create a new application state around an explicit writer.
    #[must_use]
    pub fn new(config: ServiceConfig, subscriptions: Arc<dyn SubscriptionWriter>) -> Self {
        if config.stripe_webhook_secret.is_empty() {
            tracing::warn!(
                "STRIPE_WEBHOOK_SECRET not configured - every webhook will fail verification"
            );
        }

        let verifier = WebhookVerifier::new(
            config.stripe_webhook_secret.clone(),
            config.webhook_tolerance,
        );

        Self {
            config,
            verifier,
            subscriptions,
        }
    }

    /// Create application state backed by a store, wiring a Stripe client
    /// when an API key is configured.
    #[must_use]
    pub fn with_store(config: ServiceConfig, store: Arc<dyn SubscriptionStore>) -> Self {
        let stripe = config.stripe_api_key.as_ref().and_then(|key| {
            match StripeClient::new(key.as_str()) {
                Ok(client) => {
                    tracing::info!("Stripe integration enabled");
                    Some(Arc::new(client))
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to create Stripe client");
                    None
                }
            }
        });

        if stripe.is_none() {
            tracing::warn!("Stripe not configured - subscriptions saved without status");
        }

        let manager = SubscriptionManager::new(store, stripe);
        Self::new(config, Arc::new(manager))
    }
}
