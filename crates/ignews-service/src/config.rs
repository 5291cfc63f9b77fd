//! Service configuration.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::stripe::webhook::DEFAULT_TOLERANCE;

/// Service configuration loaded from environment variables.
///
/// Built once at startup and carried in `AppState`; handlers never read the
/// environment themselves.
#[derive(Clone)]
pub struct ServiceConfig {
    /// Address to listen on (default: "0.0.0.0:3000").
    pub listen_addr: String,

    /// PostgreSQL connection URL (optional; in-memory store when unset).
    pub database_url: Option<String>,

    /// Stripe API key (optional; enables subscription status lookups).
    pub stripe_api_key: Option<String>,

    /// Stripe webhook signing secret.
    ///
    /// Not validated at startup: an empty secret makes every delivery fail
    /// verification.
    pub stripe_webhook_secret: String,

    /// Maximum age of a signed webhook timestamp. Zero disables the check.
    pub webhook_tolerance: Duration,

    /// Answer processing failures with 500 instead of 200.
    pub failure_as_server_error: bool,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,

    /// Request timeout in seconds.
    pub request_timeout_seconds: u64,
}

impl std::fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("listen_addr", &self.listen_addr)
            .field("database_configured", &self.database_url.is_some())
            .field("stripe_api_key_configured", &self.stripe_api_key.is_some())
            .field(
                "stripe_webhook_secret_configured",
                &!self.stripe_webhook_secret.is_empty(),
            )
            .field("webhook_tolerance", &self.webhook_tolerance)
            .field("failure_as_server_error", &self.failure_as_server_error)
            .field("max_body_bytes", &self.max_body_bytes)
            .field("request_timeout_seconds", &self.request_timeout_seconds)
            .finish()
    }
}

/// Stripe secrets file structure.
#[derive(Debug, Deserialize)]
struct StripeSecrets {
    #[serde(default)]
    api_key: Option<String>,
    #[serde(default)]
    webhook_secret: Option<String>,
}

impl ServiceConfig {
    /// Load configuration from environment variables and secrets files.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();

        // Try to load Stripe secrets from file first, then fall back to env vars
        let (stripe_api_key, stripe_webhook_secret) = load_stripe_secrets();

        Self {
            listen_addr: std::env::var("LISTEN_ADDR").unwrap_or(defaults.listen_addr),
            database_url: std::env::var("DATABASE_URL")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            stripe_api_key,
            stripe_webhook_secret: stripe_webhook_secret.unwrap_or_default(),
            webhook_tolerance: env_parse("STRIPE_WEBHOOK_TOLERANCE_SECONDS")
                .map_or(defaults.webhook_tolerance, Duration::from_secs),
            failure_as_server_error: std::env::var("WEBHOOK_FAILURE_AS_SERVER_ERROR")
                .ok()
                .and_then(|s| parse_bool(&s))
                .unwrap_or(defaults.failure_as_server_error),
            max_body_bytes: env_parse("MAX_BODY_BYTES").unwrap_or(defaults.max_body_bytes),
            request_timeout_seconds: env_parse("REQUEST_TIMEOUT_SECONDS")
                .unwrap_or(defaults.request_timeout_seconds),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:3000".into(),
            database_url: None,
            stripe_api_key: None,
            stripe_webhook_secret: String::new(),
            webhook_tolerance: DEFAULT_TOLERANCE,
            failure_as_server_error: false,
            max_body_bytes: 1024 * 1024, // 1MB
            request_timeout_seconds: 30,
        }
    }
}

/// Parse an environment variable, ignoring unset or unparsable values.
fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    let parsed = raw.trim().parse().ok();
    if parsed.is_none() {
        tracing::warn!(env_var = name, value = %raw, "Invalid value, using default");
    }
    parsed
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Load Stripe secrets from file or environment.
///
/// Values present in the file win; missing ones fall back to
/// `STRIPE_API_KEY` and `STRIPE_WEBHOOK_SECRET`.
fn load_stripe_secrets() -> (Option<String>, Option<String>) {
    let secret_paths = [".secrets/stripe.json", "../.secrets/stripe.json"];

    let from_file = secret_paths.iter().find_map(|path| {
        let secrets = load_secrets_file::<StripeSecrets>(path).ok()?;
        tracing::info!(path = %path, "Loaded Stripe secrets from file");
        Some(secrets)
    });

    let (file_key, file_secret) = from_file.map_or((None, None), |s| (s.api_key, s.webhook_secret));

    (
        non_empty(file_key).or_else(|| non_empty(std::env::var("STRIPE_API_KEY").ok())),
        non_empty(file_secret).or_else(|| non_empty(std::env::var("STRIPE_WEBHOOK_SECRET").ok())),
    )
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Load secrets from a JSON file.
fn load_secrets_file<T: serde::de::DeserializeOwned>(path: &str) -> Result<T, std::io::Error> {
    let path = Path::new(path);
    if !path.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Secrets file not found",
        ));
    }
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}
