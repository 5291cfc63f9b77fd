//! PostgreSQL storage implementation.
//!
//! This module provides the `PgStore` implementation of the `SubscriptionStore` trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;

use ignews_core::{CustomerId, Subscription, SubscriptionId, SubscriptionStatus, UserId};

use crate::error::{Result, StoreError};
use crate::schema;
use crate::SubscriptionStore;

/// Maximum pooled connections.
const MAX_CONNECTIONS: u32 = 5;

/// PostgreSQL-backed storage implementation.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect to the database at `url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection pool cannot be established.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect(url)
            .await?;
        Ok(Self { pool })
    }

    /// Wrap an existing pool.
    #[must_use]
    pub const fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create tables and indexes that do not exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error if any schema statement fails.
    pub async fn migrate(&self) -> Result<()> {
        for stmt in schema::all_statements() {
            sqlx::query(stmt).execute(&self.pool).await?;
        }
        tracing::info!("PostgreSQL schema up to date");
        Ok(())
    }

    /// Decode a subscription row.
    fn subscription_from_row(row: &PgRow) -> Result<Subscription> {
        let id: String = row.try_get("id")?;
        let user_id: uuid::Uuid = row.try_get("user_id")?;
        let customer_id: String = row.try_get("customer_id")?;
        let status: Option<String> = row.try_get("status")?;
        let price_id: Option<String> = row.try_get("price_id")?;
        let updated_at: DateTime<Utc> = row.try_get("updated_at")?;

        Ok(Subscription {
            id: SubscriptionId::new(id).map_err(|e| StoreError::Corrupt(e.to_string()))?,
            user_id: UserId::from_uuid(user_id),
            customer_id: CustomerId::new(customer_id)
                .map_err(|e| StoreError::Corrupt(e.to_string()))?,
            status: status.map(|s| s.parse().unwrap_or(SubscriptionStatus::Unknown)),
            price_id,
            updated_at,
        })
    }
}

#[async_trait]
impl SubscriptionStore for PgStore {
    async fn link_customer(&self, customer_id: &CustomerId, user_id: &UserId) -> Result<()> {
        sqlx::query(
            "INSERT INTO stripe_customers (customer_id, user_id) VALUES ($1, $2)
             ON CONFLICT (customer_id) DO UPDATE SET user_id = EXCLUDED.user_id",
        )
        .bind(customer_id.as_str())
        .bind(user_id.as_uuid())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_user_by_customer(&self, customer_id: &CustomerId) -> Result<Option<UserId>> {
        let user_id: Option<uuid::Uuid> =
            sqlx::query_scalar("SELECT user_id FROM stripe_customers WHERE customer_id = $1")
                .bind(customer_id.as_str())
                .fetch_optional(&self.pool)
                .await?;
        Ok(user_id.map(UserId::from_uuid))
    }

    async fn upsert_subscription(&self, subscription: &Subscription) -> Result<()> {
        sqlx::query(
            "INSERT INTO subscriptions (id, user_id, customer_id, status, price_id, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (id) DO UPDATE SET
                 user_id = EXCLUDED.user_id,
                 customer_id = EXCLUDED.customer_id,
                 status = EXCLUDED.status,
                 price_id = EXCLUDED.price_id,
                 updated_at = EXCLUDED.updated_at",
        )
        .bind(subscription.id.as_str())
        .bind(subscription.user_id.as_uuid())
        .bind(subscription.customer_id.as_str())
        .bind(subscription.status.map(SubscriptionStatus::as_str))
        .bind(subscription.price_id.as_deref())
        .bind(subscription.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_subscription(&self, id: &SubscriptionId) -> Result<Option<Subscription>> {
        let row = sqlx::query(
            "SELECT id, user_id, customer_id, status, price_id, updated_at
             FROM subscriptions WHERE id = $1",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::subscription_from_row).transpose()
    }

    async fn list_subscriptions_by_user(&self, user_id: &UserId) -> Result<Vec<Subscription>> {
        let rows = sqlx::query(
            "SELECT id, user_id, customer_id, status, price_id, updated_at
             FROM subscriptions WHERE user_id = $1 ORDER BY updated_at DESC",
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::subscription_from_row).collect()
    }
}
