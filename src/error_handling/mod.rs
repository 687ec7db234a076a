//! Error handling and retry policy.
//!
//! This module provides:
//! - Error type definitions (fatal and per-record)
//! - Retry strategy configuration
//! - Classification of directory errors into retriable, record-scoped and fatal

mod categorization;
mod types;

// Re-export public API
pub use categorization::{
    get_retry_strategy, is_record_scoped, is_retriable, is_transient_status, RetryPolicy,
};
pub use types::{HiveError, ImportError, InitializationError, RecordError, SessionError};
