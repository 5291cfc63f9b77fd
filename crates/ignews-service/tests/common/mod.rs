//! Shared test harness for webhook tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Bytes;
use axum::http::{header, HeaderName, HeaderValue};
use axum_test::{TestResponse, TestServer};
use serde_json::Value;

use ignews_core::{CustomerId, SubscriptionRef};
use ignews_service::stripe::{generate_test_header, SIGNATURE_HEADER};
use ignews_service::{create_router, AppState, SaveError, ServiceConfig, SubscriptionWriter};
use ignews_store::StoreError;

pub const SECRET: &str = "whsec_test_secret";
pub const WEBHOOK_PATH: &str = "/api/webhooks";

/// Writer that records every reference it is asked to save.
#[derive(Default)]
pub struct RecordingWriter {
    saved: Mutex<Vec<SubscriptionRef>>,
    fail: bool,
}

impl RecordingWriter {
    pub fn failing() -> Self {
        Self {
            saved: Mutex::default(),
            fail: true,
        }
    }

    pub fn saved(&self) -> Vec<SubscriptionRef> {
        self.saved.lock().unwrap().clone()
    }
}

#[async_trait]
impl SubscriptionWriter for RecordingWriter {
    async fn save_subscription(&self, reference: &SubscriptionRef) -> Result<(), SaveError> {
        self.saved.lock().unwrap().push(reference.clone());
        if self.fail {
            return Err(SaveError::Store(StoreError::Database(
                "connection refused".into(),
            )));
        }
        Ok(())
    }
}

pub struct TestHarness {
    pub server: TestServer,
    pub writer: Arc<RecordingWriter>,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with(ServiceConfig::default(), RecordingWriter::default())
    }

    pub fn with(config: ServiceConfig, writer: RecordingWriter) -> Self {
        let config = ServiceConfig {
            stripe_webhook_secret: SECRET.into(),
            ..config
        };
        let writer = Arc::new(writer);
        let state = AppState::new(config, writer.clone());
        let server = TestServer::new(create_router(state)).expect("Failed to create test server");
        Self { server, writer }
    }

    /// POST `event` signed with the test secret at the current time.
    pub async fn post_signed(&self, event: &Value) -> TestResponse {
        let payload = serde_json::to_vec(event).unwrap();
        let signature = generate_test_header(&payload, SECRET, chrono::Utc::now().timestamp());
        self.post_raw(payload, Some(&signature)).await
    }

    /// POST `payload` with an arbitrary signature header.
    pub async fn post_raw(&self, payload: Vec<u8>, signature: Option<&str>) -> TestResponse {
        let mut request = self.server.post(WEBHOOK_PATH).add_header(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        if let Some(signature) = signature {
            request = request.add_header(
                HeaderName::from_static(SIGNATURE_HEADER),
                HeaderValue::from_str(signature).unwrap(),
            );
        }
        request.bytes(Bytes::from(payload)).await
    }
}

pub fn event(event_type: &str, object: Value) -> Value {
    serde_json::json!({
        "id": "evt_test",
        "object": "event",
        "type": event_type,
        "created": 1_700_000_000,
        "livemode": false,
        "data": { "object": object }
    })
}

pub fn reference(subscription_id: &str, customer_id: &str) -> SubscriptionRef {
    SubscriptionRef::new(
        subscription_id.parse().unwrap(),
        CustomerId::new(customer_id).unwrap(),
    )
}
