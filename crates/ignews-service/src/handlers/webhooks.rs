//! Stripe webhook handler.
//!
//! A delivery goes through two steps:
//!
//! 1. **Verify**: the raw body, the `Stripe-Signature` header, and the
//!    signing secret must agree, otherwise `400 Webhook error: ...`.
//! 2. **Dispatch**: relevant event kinds are turned into a
//!    [`SubscriptionRef`] and saved. Failures here are logged and answered
//!    with `{"error": "Webhook handler failed."}` using the configured status.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::Serialize;

use ignews_core::{Event, EventKind, PayloadError, SubscriptionRef};

use crate::error::ApiError;
use crate::state::AppState;
use crate::stripe::SIGNATURE_HEADER;
use crate::subscriptions::SaveError;

/// Webhook response.
#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    /// Whether the webhook was accepted.
    pub received: bool,
}

/// Why a verified event could not be processed.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// The kind is allow-listed but has no handler.
    #[error("Unhandled event: {0}")]
    Unhandled(EventKind),

    /// The payload lacks usable identifiers.
    #[error(transparent)]
    Payload(#[from] PayloadError),

    /// Persistence failed.
    #[error(transparent)]
    Save(#[from] SaveError),
}

/// Handle Stripe webhooks.
///
/// The body is taken as raw bytes: signature verification needs exactly
/// what Stripe sent.
pub async fn stripe_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookResponse>, ApiError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());

    let event = state
        .verifier
        .construct_event(&body, signature)
        .map_err(|e| {
            tracing::warn!(error = %e, "Invalid Stripe webhook signature");
            ApiError::Webhook(e)
        })?;

    tracing::info!(
        event_type = %event.event_type,
        event_id = %event.id,
        "Received Stripe webhook"
    );

    let Some(kind) = event.kind() else {
        tracing::debug!(event_type = %event.event_type, "Ignoring irrelevant Stripe event");
        return Ok(Json(WebhookResponse { received: true }));
    };

    if let Err(e) = dispatch(&state, kind, &event).await {
        tracing::error!(
            error = %e,
            event_type = %kind,
            event_id = %event.id,
            "Stripe webhook handler failed"
        );
        let status = if state.config.failure_as_server_error {
            StatusCode::INTERNAL_SERVER_ERROR
        } else {
            StatusCode::OK
        };
        return Err(ApiError::HandlerFailed { status });
    }

    Ok(Json(WebhookResponse { received: true }))
}

/// Answer every non-POST request to the webhook route.
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

async fn dispatch(state: &AppState, kind: EventKind, event: &Event) -> Result<(), DispatchError> {
    let reference = subscription_ref(kind, event)?;

    tracing::debug!(
        subscription_id = %reference.subscription_id,
        customer_id = %reference.customer_id,
        event_type = %kind,
        "Saving subscription"
    );

    state.subscriptions.save_subscription(&reference).await?;
    Ok(())
}

/// Extract the subscription reference an event carries.
fn subscription_ref(kind: EventKind, event: &Event) -> Result<SubscriptionRef, DispatchError> {
    match kind {
        EventKind::CheckoutSessionCompleted => Ok(event.checkout_session()?.subscription_ref()?),
        EventKind::CustomerSubscriptionUpdated | EventKind::CustomerSubscriptionDeleted => {
            Ok(event.subscription()?.subscription_ref()?)
        }
        EventKind::CustomerSubscriptionCreated => Err(DispatchError::Unhandled(kind)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(event_type: &str, object: serde_json::Value) -> Event {
        serde_json::from_value(json!({
            "id": "evt_1",
            "type": event_type,
            "data": { "object": object }
        }))
        .unwrap()
    }

    #[test]
    fn checkout_uses_subscription_and_customer() {
        let event = event(
            "checkout.session.completed",
            json!({ "id": "cs_1", "subscription": "S1", "customer": "C1" }),
        );
        let reference = subscription_ref(EventKind::CheckoutSessionCompleted, &event).unwrap();
        assert_eq!(reference.subscription_id.as_str(), "S1");
        assert_eq!(reference.customer_id.as_str(), "C1");
    }

    #[test]
    fn subscription_events_use_id_and_customer() {
        for kind in [
            EventKind::CustomerSubscriptionUpdated,
            EventKind::CustomerSubscriptionDeleted,
        ] {
            let event = event(kind.as_str(), json!({ "id": "S2", "customer": "C2" }));
            let reference = subscription_ref(kind, &event).unwrap();
            assert_eq!(reference.subscription_id.as_str(), "S2");
            assert_eq!(reference.customer_id.as_str(), "C2");
        }
    }

    #[test]
    fn created_is_unhandled() {
        let event = event(
            "customer.subscription.created",
            json!({ "id": "S3", "customer": "C3" }),
        );
        let err = subscription_ref(EventKind::CustomerSubscriptionCreated, &event).unwrap_err();
        assert!(matches!(
            err,
            DispatchError::Unhandled(EventKind::CustomerSubscriptionCreated)
        ));
    }

    #[test]
    fn checkout_without_customer_fails() {
        let event = event(
            "checkout.session.completed",
            json!({ "id": "cs_1", "subscription": "S1", "customer": null }),
        );
        assert!(matches!(
            subscription_ref(EventKind::CheckoutSessionCompleted, &event),
            Err(DispatchError::Payload(PayloadError::MissingField("customer")))
        ));
    }
}
