//! Application configuration and constants.
//!
//! This module provides:
//! - Hive endpoint names, the note marker, and retry constants
//! - CLI option types and the library `Config`

mod constants;
mod types;

// Re-export all constants
pub use constants::*;
pub use types::{Config, ConfigValidationError, LogFormat, LogLevel, Opt, SessionMode};
