//! Storage layer for ignews billing.
//!
//! This crate persists subscription records and the links between Stripe
//! customers and users.
//!
//! # Backends
//!
//! - [`MemoryStore`]: process-local maps, used in tests and when no database
//!   is configured
//! - [`PgStore`]: PostgreSQL via `sqlx` (feature `postgres`, on by default)
//!
//! # Example
//!
//! ```no_run
//! use ignews_core::{CustomerId, UserId};
//! use ignews_store::{MemoryStore, SubscriptionStore};
//!
//! # async fn example() -> ignews_store::Result<()> {
//! let store = MemoryStore::new();
//! let customer = CustomerId::new("cus_1").unwrap();
//! let user = UserId::generate();
//!
//! store.link_customer(&customer, &user).await?;
//! assert_eq!(store.find_user_by_customer(&customer).await?, Some(user));
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;
#[cfg(feature = "postgres")]
pub mod schema;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
#[cfg(feature = "postgres")]
pub use postgres::PgStore;

use async_trait::async_trait;
use ignews_core::{CustomerId, Subscription, SubscriptionId, UserId};

/// The storage trait defining all database operations.
///
/// This trait abstracts the storage layer, allowing for different
/// implementations (PostgreSQL, in-memory for testing).
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    // =========================================================================
    // Customer Operations
    // =========================================================================

    /// Link a Stripe customer to a user, replacing any previous link.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn link_customer(&self, customer_id: &CustomerId, user_id: &UserId) -> Result<()>;

    /// Find the user a Stripe customer belongs to.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn find_user_by_customer(&self, customer_id: &CustomerId) -> Result<Option<UserId>>;

    // =========================================================================
    // Subscription Operations
    // =========================================================================

    /// Insert a subscription record or replace the one with the same ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn upsert_subscription(&self, subscription: &Subscription) -> Result<()>;

    /// Get a subscription by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn get_subscription(&self, id: &SubscriptionId) -> Result<Option<Subscription>>;

    /// List a user's subscriptions, most recently updated first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn list_subscriptions_by_user(&self, user_id: &UserId) -> Result<Vec<Subscription>>;
}
