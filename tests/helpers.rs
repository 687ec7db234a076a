// Shared test helpers for Hive mock servers and gowitness input fixtures.
//
// This module provides common utilities used across multiple test files to reduce duplication.

use std::path::Path;
use std::time::Duration;

use gowitness_hive::{HiveClient, RetryPolicy, SessionContext};
use wiremock::MockServer;

/// Session token the mocks expect in the `Cookie` header.
#[allow(dead_code)] // Used by other test files
pub const TEST_TOKEN: &str = "test-session-token";

/// Client with millisecond backoff so retry tests stay fast.
#[allow(dead_code)] // Used by other test files
pub fn fast_client() -> HiveClient {
    timeout_client(Duration::from_secs(5))
}

/// Same as [`fast_client`] with a custom request timeout.
#[allow(dead_code)] // Used by other test files
pub fn timeout_client(timeout: Duration) -> HiveClient {
    HiveClient::with_timeout(Some(timeout))
        .expect("Failed to build client")
        .with_retry_policy(RetryPolicy {
            max_attempts: 3,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
        })
}

/// Session pointing at the mock server.
#[allow(dead_code)] // Used by other test files
pub fn session_for(server: &MockServer) -> SessionContext {
    SessionContext::new(&server.uri(), TEST_TOKEN)
}

/// Writes a screenshot file with placeholder bytes.
#[allow(dead_code)] // Used by other test files
pub fn write_screenshot(dir: &Path, name: &str) {
    std::fs::write(dir.join(name), b"not really a jpeg")
        .expect("Failed to write screenshot");
}

/// One gowitness JSONL line.
#[allow(dead_code)] // Used by other test files
pub fn jsonl_line(url: &str, file_name: &str) -> String {
    serde_json::json!({
        "url": url,
        "final_url": url,
        "response_code": 200,
        "protocol": "HTTP/1.1",
        "file_name": file_name,
    })
    .to_string()
}
