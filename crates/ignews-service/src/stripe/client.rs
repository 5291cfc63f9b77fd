//! Stripe API client implementation.

use std::time::Duration;

use reqwest::{Client, Url};

use ignews_core::{StripeSubscription, SubscriptionId};

use super::types::StripeErrorResponse;

/// Error type for Stripe operations.
#[derive(Debug, thiserror::Error)]
pub enum StripeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Stripe API returned an error.
    #[error("Stripe API error: {error_type} - {message}")]
    Api {
        /// Error type.
        error_type: String,
        /// Error message.
        message: String,
        /// Error code.
        code: Option<String>,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Stripe API client.
#[derive(Debug, Clone)]
pub struct StripeClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl StripeClient {
    /// Stripe API base URL.
    pub const BASE_URL: &'static str = "https://api.stripe.com/v1";

    /// Request timeout for Stripe API calls.
    const TIMEOUT: Duration = Duration::from_secs(30);

    /// Create a new Stripe client.
    ///
    /// # Arguments
    ///
    /// * `api_key` - Stripe secret API key (`sk_test_...` or `sk_live_...`)
    ///
    /// # Errors
    ///
    /// Returns `StripeError::Configuration` if the key is empty or the HTTP
    /// client cannot be built.
    pub fn new(api_key: impl Into<String>) -> Result<Self, StripeError> {
        Self::with_base_url(api_key, Self::BASE_URL)
    }

    /// Create a client against a different API host (e.g. a local mock).
    ///
    /// # Errors
    ///
    /// Returns `StripeError::Configuration` if the key is empty or the HTTP
    /// client cannot be built.
    pub fn with_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, StripeError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(StripeError::Configuration("API key is empty".into()));
        }

        let client = Client::builder()
            .timeout(Self::TIMEOUT)
            .build()
            .map_err(|e| StripeError::Configuration(e.to_string()))?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Retrieve a subscription by ID.
    pub async fn retrieve_subscription(
        &self,
        subscription_id: &SubscriptionId,
    ) -> Result<StripeSubscription, StripeError> {
        let url = self.endpoint(&["subscriptions", subscription_id.as_str()])?;
        let response = self
            .client
            .get(url)
            .basic_auth(&self.api_key, Option::<&str>::None)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Build an API URL, percent-encoding each segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, StripeError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| StripeError::Configuration(format!("invalid base URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| StripeError::Configuration("base URL cannot have a path".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Handle API response and convert errors.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, StripeError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response.json().await?);
        }

        // Try to parse error response
        let error_body: Result<StripeErrorResponse, _> = response.json().await;

        match error_body {
            Ok(stripe_error) => Err(StripeError::Api {
                error_type: stripe_error.error.error_type,
                message: stripe_error.error.message,
                code: stripe_error.error.code,
            }),
            Err(_) => Err(StripeError::Api {
                error_type: "unknown".to_string(),
                message: format!("HTTP {status}"),
                code: None,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_creation() {
        let client = StripeClient::new("sk_test_xxx").unwrap();
        assert_eq!(client.base_url, StripeClient::BASE_URL);
    }

    #[test]
    fn empty_key_is_rejected() {
        assert!(matches!(
            StripeClient::new("  "),
            Err(StripeError::Configuration(_))
        ));
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = StripeClient::with_base_url("sk_test_xxx", "http://127.0.0.1:9999/v1/").unwrap();
        assert_eq!(client.base_url, "http://127.0.0.1:9999/v1");
    }

    #[test]
    fn endpoint_encodes_each_segment() {
        let client = StripeClient::with_base_url("sk_test_xxx", "http://127.0.0.1:9999/v1").unwrap();
        let url = client.endpoint(&["subscriptions", "sub_1/x?y"]).unwrap();
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:9999/v1/subscriptions/sub_1%2Fx%3Fy"
        );
    }

    #[test]
    fn endpoint_rejects_invalid_base_url() {
        let client = StripeClient::with_base_url("sk_test_xxx", "not a url").unwrap();
        assert!(matches!(
            client.endpoint(&["subscriptions"]),
            Err(StripeError::Configuration(_))
        ));
    }
}
