//! Run summary printing.

use std::collections::BTreeMap;

use log::{info, warn};

use crate::error_handling::RecordError;
use crate::reconcile::ReconciliationReport;

/// Short label used to group failures in the summary.
pub fn failure_kind(error: &RecordError) -> &'static str {
    match error {
        RecordError::Identity(_) => "unresolvable URL",
        RecordError::ScreenshotMissing(_) => "missing screenshot",
        RecordError::MissingHostnameEntity(_) => "asset without hostname entity",
        RecordError::Directory(_) => "directory unavailable",
    }
}

/// Logs the reconciliation counters and a per-kind failure breakdown.
pub fn print_reconciliation_statistics(report: &ReconciliationReport, malformed_lines: usize) {
    info!(
        "Reconciled {} records: {} notes created, {} notes appended, {} skipped",
        report.records,
        report.notes_created,
        report.notes_appended,
        report.failed()
    );
    info!(
        "Assets: {} created, {} reused",
        report.nodes_created, report.nodes_reused
    );

    if malformed_lines > 0 {
        warn!("{} malformed input lines were dropped", malformed_lines);
    }
    if report.ambiguous_notes > 0 {
        warn!(
            "{} records matched more than one existing note; the first match was used",
            report.ambiguous_notes
        );
    }

    let mut by_kind: BTreeMap<&'static str, usize> = BTreeMap::new();
    for failure in &report.failures {
        *by_kind.entry(failure_kind(&failure.error)).or_default() += 1;
    }
    for (kind, count) in by_kind {
        warn!("   {}: {}", kind, count);
    }
}
