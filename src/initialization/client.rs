//! HTTP client initialization.

use std::time::Duration;

use crate::config::Config;
use crate::error_handling::InitializationError;
use crate::hive::HiveClient;

/// Initializes the Hive client from the run configuration.
///
/// Uses the transport's default timeout unless `timeout_seconds` is set, and
/// the default retry policy.
///
/// # Errors
///
/// Returns `InitializationError::HttpClientError` if the TLS backend cannot
/// be set up.
pub fn init_client(config: &Config) -> Result<HiveClient, InitializationError> {
    let timeout = config.timeout_seconds.map(Duration::from_secs);
    Ok(HiveClient::with_timeout(timeout)?)
}
