//! Error categorization and retry strategy.
//!
//! Decides which directory failures are transient and builds the backoff
//! schedule used with `tokio_retry::RetryIf`.

use std::time::Duration;
use tokio_retry::strategy::ExponentialBackoff;

use super::types::HiveError;
use crate::config::{
    RETRY_INITIAL_DELAY_MS, RETRY_MAX_ATTEMPTS, RETRY_MAX_DELAY_SECS, TRANSIENT_STATUS_CODES,
};

/// Retry parameters applied to every directory call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, the first request included
    pub max_attempts: usize,
    /// Delay before the first retry; doubled for each later retry
    pub initial_delay: Duration,
    /// Upper bound for a single delay
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: RETRY_MAX_ATTEMPTS,
            initial_delay: Duration::from_millis(RETRY_INITIAL_DELAY_MS),
            max_delay: Duration::from_secs(RETRY_MAX_DELAY_SECS),
        }
    }
}

/// Creates an exponential backoff retry strategy.
///
/// The iterator yields one delay per retry, so it has `max_attempts - 1`
/// items. `ExponentialBackoff` yields `factor * base^n`; with base 2 and a
/// factor of half the initial delay the schedule is `initial, 2*initial, ...`.
pub fn get_retry_strategy(policy: &RetryPolicy) -> impl Iterator<Item = Duration> {
    // Saturating cast: delays beyond u64::MAX ms are meaningless anyway
    #[allow(clippy::cast_possible_truncation)]
    let initial_ms = policy.initial_delay.as_millis().min(u128::from(u64::MAX)) as u64;
    ExponentialBackoff::from_millis(2)
        .factor((initial_ms / 2).max(1))
        .max_delay(policy.max_delay)
        .take(policy.max_attempts.saturating_sub(1))
}

/// True for the server statuses the directory may recover from.
pub fn is_transient_status(status: u16) -> bool {
    TRANSIENT_STATUS_CODES.contains(&status)
}

/// Determines if a directory error should be retried.
///
/// Retriable: transient 5xx statuses and transport failures (connect,
/// timeout, request). Everything else, and 401 in particular, is returned to
/// the caller on the first occurrence.
pub fn is_retriable(error: &HiveError) -> bool {
    match error {
        HiveError::Status { status, .. } => is_transient_status(*status),
        HiveError::Transport { source, .. } => {
            source.is_connect() || source.is_timeout() || source.is_request()
        }
        HiveError::AuthenticationRequired
        | HiveError::UnexpectedResponse { .. }
        | HiveError::FileNotFound(_)
        | HiveError::Io { .. } => false,
    }
}

/// True when a failure while processing one record should only skip that
/// record.
///
/// Transient failures that survived every retry and local file problems are
/// record-scoped. Authentication, non-transient statuses and malformed
/// responses leave the run without a trustworthy project context and are
/// fatal.
pub fn is_record_scoped(error: &HiveError) -> bool {
    is_retriable(error) || matches!(error, HiveError::FileNotFound(_) | HiveError::Io { .. })
}
