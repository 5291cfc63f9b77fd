//! Health endpoint tests.

mod common;

use serde_json::Value;

use common::TestHarness;

#[tokio::test]
async fn health_reports_ok() {
    let harness = TestHarness::new();

    let response = harness.server.get("/health").await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "ignews-billing");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}
