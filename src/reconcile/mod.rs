//! Reconciliation of screenshot records into the asset graph.
//!
//! This module provides:
//! - `reconcile()` - The per-batch engine
//! - Note matching and fragment rendering
//! - `ReconciliationReport` - Counters and per-record failures

mod engine;
mod note;
mod report;

pub use engine::reconcile;
pub use note::{append_fragment, is_note_for, matching_notes, render_fragment};
pub use report::{ReconciliationReport, RecordFailure};
