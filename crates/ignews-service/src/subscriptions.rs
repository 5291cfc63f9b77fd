//! Subscription persistence.
//!
//! The webhook handler hands every Subscription Reference to a
//! [`SubscriptionWriter`]. The production writer is [`SubscriptionManager`],
//! which resolves the owning user, refreshes the subscription from Stripe
//! when an API key is configured, and upserts the record.

use std::sync::Arc;

use async_trait::async_trait;

use ignews_core::{CustomerId, Subscription, SubscriptionRef};
use ignews_store::{StoreError, SubscriptionStore};

use crate::stripe::{StripeClient, StripeError};

/// Errors raised while saving a subscription.
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    /// No user is linked to the Stripe customer.
    #[error("no user linked to Stripe customer {0}")]
    CustomerNotLinked(CustomerId),

    /// The store rejected the write.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The subscription could not be fetched from Stripe.
    #[error(transparent)]
    Stripe(#[from] StripeError),
}

/// Persists the subscription named by a webhook.
#[async_trait]
pub trait SubscriptionWriter: Send + Sync {
    /// Save (create or replace) the subscription identified by `reference`.
    async fn save_subscription(&self, reference: &SubscriptionRef) -> Result<(), SaveError>;
}

/// Store-backed [`SubscriptionWriter`].
pub struct SubscriptionManager {
    store: Arc<dyn SubscriptionStore>,
    stripe: Option<Arc<StripeClient>>,
}

impl SubscriptionManager {
    /// Create a manager. Without a Stripe client, records are saved with no
    /// status or price.
    #[must_use]
    pub fn new(store: Arc<dyn SubscriptionStore>, stripe: Option<Arc<StripeClient>>) -> Self {
        Self { store, stripe }
    }
}

#[async_trait]
impl SubscriptionWriter for SubscriptionManager {
    async fn save_subscription(&self, reference: &SubscriptionRef) -> Result<(), SaveError> {
        let user_id = self
            .store
            .find_user_by_customer(&reference.customer_id)
            .await?
            .ok_or_else(|| SaveError::CustomerNotLinked(reference.customer_id.clone()))?;

        let mut record = Subscription::new(reference.clone(), user_id);

        if let Some(stripe) = &self.stripe {
            let remote = stripe
                .retrieve_subscription(&reference.subscription_id)
                .await?;
            record.status = remote.status;
            record.price_id = remote.price_id().map(String::from);
        }

        self.store.upsert_subscription(&record).await?;

        tracing::info!(
            subscription_id = %record.id,
            customer_id = %record.customer_id,
            user_id = %record.user_id,
            status = ?record.status,
            price_id = ?record.price_id,
            "Subscription saved"
        );

        Ok(())
    }
}
