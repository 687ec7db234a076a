//! Outcome of a reconciliation pass.

use crate::error_handling::RecordError;

/// A record that was skipped, with the reason.
#[derive(Debug)]
pub struct RecordFailure {
    /// URL of the skipped record
    pub url: String,
    /// Why it was skipped
    pub error: RecordError,
}

/// Counters and per-record failures for one batch.
#[derive(Debug, Default)]
pub struct ReconciliationReport {
    /// Records handed to the engine
    pub records: usize,
    /// Asset nodes created
    pub nodes_created: usize,
    /// Existing asset nodes used
    pub nodes_reused: usize,
    /// New notes
    pub notes_created: usize,
    /// Fragments appended to existing notes
    pub notes_appended: usize,
    /// Records whose URL matched more than one existing note
    pub ambiguous_notes: usize,
    /// Skipped records, in input order
    pub failures: Vec<RecordFailure>,
}

impl ReconciliationReport {
    /// Records whose screenshot ended up in a note.
    pub fn succeeded(&self) -> usize {
        self.notes_created + self.notes_appended
    }

    /// Records skipped.
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub(crate) fn record_failure(&mut self, url: &str, error: RecordError) {
        self.failures.push(RecordFailure {
            url: url.to_string(),
            error,
        });
    }
}
