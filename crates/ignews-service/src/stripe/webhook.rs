//! Stripe webhook signature verification.
//!
//! Stripe signs each delivery with HMAC-SHA256 and sends the result in the
//! `Stripe-Signature` header:
//!
//! ```text
//! Stripe-Signature: t=1492774577,v1=5257a869e7ec...,v0=6ffbb59b2300...
//! ```
//!
//! The signed message is `"<t>." ++ raw body`, so the body must reach this
//! module exactly as received. Only `v1` signatures are checked; other
//! schemes are ignored.
//!
//! Reference: <https://docs.stripe.com/webhooks#verify-manually>

use std::time::Duration;

use ignews_core::Event;

use crate::crypto::{constant_time_eq, hmac_sha256_hex};

/// Name of the header carrying the signature.
pub const SIGNATURE_HEADER: &str = "stripe-signature";

/// Default maximum age of a signed timestamp.
pub const DEFAULT_TOLERANCE: Duration = Duration::from_secs(300);

/// The only signature scheme Stripe currently issues for live events.
const EXPECTED_SCHEME: &str = "v1";

/// Reasons a delivery is rejected before any processing.
///
/// The display strings are sent back to the caller after `Webhook error: `.
#[derive(Debug, thiserror::Error)]
pub enum SignatureError {
    /// The request had no usable `Stripe-Signature` header.
    #[error("No stripe-signature header value was provided.")]
    MissingHeader,

    /// No signing secret is configured.
    #[error("Webhook signing secret is not configured")]
    MissingSecret,

    /// The header has no parsable `t=` element.
    #[error("Unable to extract timestamp and signatures from header")]
    MalformedHeader,

    /// The header has a timestamp but no `v1` signature.
    #[error("No signatures found with expected scheme")]
    NoSignaturesWithScheme,

    /// None of the `v1` signatures match the payload.
    #[error(
        "No signatures found matching the expected signature for payload. \
         Are you passing the raw request body you received from Stripe?"
    )]
    NoMatchingSignature,

    /// The signature matches but the timestamp is too old.
    #[error("Timestamp outside the tolerance zone")]
    TimestampOutsideTolerance,

    /// The verified body is not a Stripe event.
    #[error("{0}")]
    InvalidPayload(#[from] serde_json::Error),
}

/// Parsed `Stripe-Signature` header.
#[derive(Debug, PartialEq, Eq)]
struct SignatureHeader<'a> {
    timestamp: i64,
    signatures: Vec<&'a str>,
}

impl<'a> SignatureHeader<'a> {
    fn parse(header: &'a str) -> Result<Self, SignatureError> {
        let mut timestamp = None;
        let mut signatures = Vec::new();

        for item in header.split(',') {
            let Some((key, value)) = item.trim().split_once('=') else {
                continue;
            };
            match key {
                "t" => timestamp = value.parse().ok(),
                EXPECTED_SCHEME => signatures.push(value),
                _ => {}
            }
        }

        let timestamp = timestamp.ok_or(SignatureError::MalformedHeader)?;
        if signatures.is_empty() {
            return Err(SignatureError::NoSignaturesWithScheme);
        }

        Ok(Self {
            timestamp,
            signatures,
        })
    }
}

/// Verifies webhook deliveries against a signing secret.
#[derive(Clone)]
pub struct WebhookVerifier {
    secret: String,
    tolerance: Duration,
}

impl std::fmt::Debug for WebhookVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookVerifier")
            .field("secret", &"<redacted>")
            .field("tolerance", &self.tolerance)
            .finish()
    }
}

impl WebhookVerifier {
    /// Create a verifier.
    ///
    /// A zero `tolerance` disables the timestamp age check.
    pub fn new(secret: impl Into<String>, tolerance: Duration) -> Self {
        Self {
            secret: secret.into(),
            tolerance,
        }
    }

    /// Verify `payload` against `header` and parse the event, using the current time.
    ///
    /// # Errors
    ///
    /// Returns a `SignatureError` describing the first check that failed.
    pub fn construct_event(
        &self,
        payload: &[u8],
        header: Option<&str>,
    ) -> Result<Event, SignatureError> {
        self.construct_event_at(payload, header, chrono::Utc::now().timestamp())
    }

    /// Verify `payload` against `header` as of `now` (Unix seconds) and parse the event.
    ///
    /// # Errors
    ///
    /// Returns a `SignatureError` describing the first check that failed.
    pub fn construct_event_at(
        &self,
        payload: &[u8],
        header: Option<&str>,
        now: i64,
    ) -> Result<Event, SignatureError> {
        self.verify_at(payload, header, now)?;
        Ok(serde_json::from_slice(payload)?)
    }

    fn verify_at(
        &self,
        payload: &[u8],
        header: Option<&str>,
        now: i64,
    ) -> Result<(), SignatureError> {
        let header = header
            .filter(|h| !h.trim().is_empty())
            .ok_or(SignatureError::MissingHeader)?;
        if self.secret.is_empty() {
            return Err(SignatureError::MissingSecret);
        }

        let parsed = SignatureHeader::parse(header)?;
        let expected = sign(&self.secret, parsed.timestamp, payload);

        let matched = parsed
            .signatures
            .iter()
            .any(|sig| constant_time_eq(expected.as_bytes(), sig.as_bytes()));
        if !matched {
            return Err(SignatureError::NoMatchingSignature);
        }

        let max_age = i64::try_from(self.tolerance.as_secs()).unwrap_or(i64::MAX);
        if max_age > 0 && now.saturating_sub(parsed.timestamp) > max_age {
            tracing::debug!(
                timestamp = parsed.timestamp,
                now,
                max_age,
                "Stripe signature timestamp too old"
            );
            return Err(SignatureError::TimestampOutsideTolerance);
        }

        Ok(())
    }
}

/// Build a valid `Stripe-Signature` header for `payload`.
///
/// Intended for tests and for replaying events against a local instance.
#[must_use]
pub fn generate_test_header(payload: &[u8], secret: &str, timestamp: i64) -> String {
    format!(
        "t={timestamp},{EXPECTED_SCHEME}={}",
        sign(secret, timestamp, payload)
    )
}

/// Compute the `v1` signature for `payload` signed at `timestamp`.
fn sign(secret: &str, timestamp: i64, payload: &[u8]) -> String {
    let prefix = format!("{timestamp}.");
    let mut signed_payload = Vec::with_capacity(prefix.len() + payload.len());
    signed_payload.extend_from_slice(prefix.as_bytes());
    signed_payload.extend_from_slice(payload);

    hmac_sha256_hex(secret.as_bytes(), &signed_payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test_secret";
    const NOW: i64 = 1_700_000_000;
    const PAYLOAD: &[u8] =
        br#"{"id":"evt_1","type":"invoice.paid","created":1700000000,"data":{"object":{}}}"#;

    fn verifier() -> WebhookVerifier {
        WebhookVerifier::new(SECRET, DEFAULT_TOLERANCE)
    }

    #[test]
    fn parse_header_collects_v1_only() {
        let header = SignatureHeader::parse("t=12,v1=aa,v0=bb,v1=cc").unwrap();
        assert_eq!(header.timestamp, 12);
        assert_eq!(header.signatures, ["aa", "cc"]);
    }

    #[test]
    fn parse_header_without_timestamp() {
        assert!(matches!(
            SignatureHeader::parse("v1=aa"),
            Err(SignatureError::MalformedHeader)
        ));
        assert!(matches!(
            SignatureHeader::parse("t=abc,v1=aa"),
            Err(SignatureError::MalformedHeader)
        ));
    }

    #[test]
    fn parse_header_without_v1() {
        assert!(matches!(
            SignatureHeader::parse("t=12,v0=aa"),
            Err(SignatureError::NoSignaturesWithScheme)
        ));
    }

    #[test]
    fn valid_signature_parses_event() {
        let header = generate_test_header(PAYLOAD, SECRET, NOW);
        let event = verifier()
            .construct_event_at(PAYLOAD, Some(&header), NOW)
            .unwrap();
        assert_eq!(event.id, "evt_1");
        assert_eq!(event.event_type, "invoice.paid");
    }

    #[test]
    fn any_matching_v1_is_accepted() {
        let valid = generate_test_header(PAYLOAD, SECRET, NOW);
        let sig = valid.split_once("v1=").unwrap().1;
        let header = format!("t={NOW},v1=deadbeef,v1={sig}");
        assert!(verifier()
            .construct_event_at(PAYLOAD, Some(&header), NOW)
            .is_ok());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let header = generate_test_header(PAYLOAD, "whsec_other", NOW);
        assert!(matches!(
            verifier().construct_event_at(PAYLOAD, Some(&header), NOW),
            Err(SignatureError::NoMatchingSignature)
        ));
    }

    #[test]
    fn tampered_body_is_rejected() {
        let header = generate_test_header(PAYLOAD, SECRET, NOW);
        let tampered = br#"{"id":"evt_2","type":"invoice.paid","created":1700000000,"data":{"object":{}}}"#;
        assert!(matches!(
            verifier().construct_event_at(tampered, Some(&header), NOW),
            Err(SignatureError::NoMatchingSignature)
        ));
    }

    #[test]
    fn missing_header_and_secret() {
        assert!(matches!(
            verifier().construct_event_at(PAYLOAD, None, NOW),
            Err(SignatureError::MissingHeader)
        ));

        let header = generate_test_header(PAYLOAD, SECRET, NOW);
        let unconfigured = WebhookVerifier::new("", DEFAULT_TOLERANCE);
        assert!(matches!(
            unconfigured.construct_event_at(PAYLOAD, Some(&header), NOW),
            Err(SignatureError::MissingSecret)
        ));
    }

    #[test]
    fn stale_timestamp_is_rejected() {
        let signed_at = NOW - 301;
        let header = generate_test_header(PAYLOAD, SECRET, signed_at);
        assert!(matches!(
            verifier().construct_event_at(PAYLOAD, Some(&header), NOW),
            Err(SignatureError::TimestampOutsideTolerance)
        ));
    }

    #[test]
    fn zero_tolerance_skips_age_check() {
        let header = generate_test_header(PAYLOAD, SECRET, 1);
        let lenient = WebhookVerifier::new(SECRET, Duration::ZERO);
        assert!(lenient.construct_event_at(PAYLOAD, Some(&header), NOW).is_ok());
    }

    #[test]
    fn signed_non_event_body_is_invalid_payload() {
        let body = b"[1,2,3]";
        let header = generate_test_header(body, SECRET, NOW);
        assert!(matches!(
            verifier().construct_event_at(body, Some(&header), NOW),
            Err(SignatureError::InvalidPayload(_))
        ));
    }

    #[test]
    fn debug_redacts_secret() {
        let rendered = format!("{:?}", verifier());
        assert!(!rendered.contains(SECRET));
    }
}
