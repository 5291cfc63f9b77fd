//! API error types and responses.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::stripe::SignatureError;

/// Message returned when a verified event could not be processed.
pub const HANDLER_FAILED_MESSAGE: &str = "Webhook handler failed.";

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The delivery could not be authenticated.
    #[error("Webhook error: {0}")]
    Webhook(#[from] SignatureError),

    /// A verified event failed during processing.
    ///
    /// Carries the status to answer with: `200 OK` keeps Stripe from
    /// retrying, `500` asks it to redeliver.
    #[error("Webhook handler failed.")]
    HandlerFailed {
        /// Response status.
        status: StatusCode,
    },

    /// The route only accepts POST.
    #[error("Method not allowed")]
    MethodNotAllowed,
}

/// JSON body for a failed handler.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: &'static str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Webhook(_) => (StatusCode::BAD_REQUEST, self.to_string()).into_response(),
            Self::HandlerFailed { status } => (
                status,
                Json(ErrorResponse {
                    error: HANDLER_FAILED_MESSAGE,
                }),
            )
                .into_response(),
            Self::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                [(header::ALLOW, "POST")],
                self.to_string(),
            )
                .into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn webhook_error_is_prefixed() {
        let err = ApiError::from(SignatureError::MissingHeader);
        assert_eq!(
            err.to_string(),
            "Webhook error: No stripe-signature header value was provided."
        );
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn handler_failed_keeps_configured_status() {
        let ok = ApiError::HandlerFailed {
            status: StatusCode::OK,
        };
        assert_eq!(ok.into_response().status(), StatusCode::OK);

        let loud = ApiError::HandlerFailed {
            status: StatusCode::INTERNAL_SERVER_ERROR,
        };
        assert_eq!(
            loud.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn method_not_allowed_sets_allow() {
        let response = ApiError::MethodNotAllowed.into_response();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[header::ALLOW], "POST");
    }
}
