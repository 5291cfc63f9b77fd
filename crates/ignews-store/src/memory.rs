//! In-memory storage implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use ignews_core::{CustomerId, Subscription, SubscriptionId, UserId};

use crate::error::Result;
use crate::SubscriptionStore;

/// Process-local storage backed by hash maps.
///
/// Contents are lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    customers: RwLock<HashMap<CustomerId, UserId>>,
    subscriptions: RwLock<HashMap<SubscriptionId, Subscription>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SubscriptionStore for MemoryStore {
    async fn link_customer(&self, customer_id: &CustomerId, user_id: &UserId) -> Result<()> {
        self.customers
            .write()
            .await
            .insert(customer_id.clone(), *user_id);
        Ok(())
    }

    async fn find_user_by_customer(&self, customer_id: &CustomerId) -> Result<Option<UserId>> {
        Ok(self.customers.read().await.get(customer_id).copied())
    }

    async fn upsert_subscription(&self, subscription: &Subscription) -> Result<()> {
        self.subscriptions
            .write()
            .await
            .insert(subscription.id.clone(), subscription.clone());
        Ok(())
    }

    async fn get_subscription(&self, id: &SubscriptionId) -> Result<Option<Subscription>> {
        Ok(self.subscriptions.read().await.get(id).cloned())
    }

    async fn list_subscriptions_by_user(&self, user_id: &UserId) -> Result<Vec<Subscription>> {
        let mut subscriptions: Vec<_> = self
            .subscriptions
            .read()
            .await
            .values()
            .filter(|s| s.user_id == *user_id)
            .cloned()
            .collect();
        subscriptions.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(subscriptions)
    }
}
