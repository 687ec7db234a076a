//! Main application modules.
//!
//! This module provides the interactive prompts and summary printing used by
//! `run_import`.

pub mod prompt;
pub mod statistics;

// Re-export public API
pub use prompt::{confirm_save_session, prompt_credentials, select_project};
pub use statistics::print_reconciliation_statistics;
