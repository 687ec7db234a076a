//! Screenshot reconciliation.
//!
//! Converges the directory towards "one asset per identity, one note per
//! screenshot URL, fragments appended in input order", issuing the smallest
//! set of mutating calls per record.

use std::path::{Path, PathBuf};

use log::{debug, error, info, warn};

use super::note::{append_fragment, matching_notes, render_fragment};
use super::report::ReconciliationReport;
use crate::error_handling::{is_record_scoped, HiveError, RecordError};
use crate::hive::{AssetNode, Directory, EntityId};
use crate::identity::{resolve, Identity};
use crate::input::ScreenshotRecord;
use crate::session::SessionContext;

/// What happened to a record that was reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NoteAction {
    Created,
    Appended,
}

/// Reconciles a batch of screenshot records, one record at a time.
///
/// Per-record problems (missing screenshot, unusable identity, hostname asset
/// without a hostname entity, transient failures that outlived the retries)
/// are collected in the report and the batch continues.
///
/// # Errors
///
/// Returns the first fatal directory error: `AuthenticationRequired`, a
/// non-transient status or a malformed response. Records after it are not
/// processed.
pub async fn reconcile<D: Directory>(
    directory: &D,
    session: &SessionContext,
    project_id: &str,
    screenshots_dir: &Path,
    records: &[ScreenshotRecord],
) -> Result<ReconciliationReport, HiveError> {
    let mut report = ReconciliationReport {
        records: records.len(),
        ..Default::default()
    };

    for (index, record) in records.iter().enumerate() {
        debug!("[{}/{}] {}", index + 1, records.len(), record.url);
        match reconcile_record(
            directory,
            session,
            project_id,
            screenshots_dir,
            record,
            &mut report,
        )
        .await
        {
            Ok(NoteAction::Created) => report.notes_created += 1,
            Ok(NoteAction::Appended) => report.notes_appended += 1,
            Err(RecordError::Directory(e)) if !is_record_scoped(&e) => return Err(e),
            Err(e) => {
                error!("Skipping {}: {}", record.url, e);
                report.record_failure(&record.url, e);
            }
        }
    }

    Ok(report)
}

async fn reconcile_record<D: Directory>(
    directory: &D,
    session: &SessionContext,
    project_id: &str,
    screenshots_dir: &Path,
    record: &ScreenshotRecord,
    report: &mut ReconciliationReport,
) -> Result<NoteAction, RecordError> {
    let identity = resolve(&record.url)?;
    debug!("Resolved {} to {:?}", record.url, identity);

    // Checked before any directory call so a missing file never creates a node
    let screenshot = screenshot_path(screenshots_dir, &record.file_name).await?;

    let assets = directory
        .search_assets(session, project_id, &identity)
        .await
        .map_err(RecordError::Directory)?;

    let (node_id, existing_note) = match assets.into_iter().next() {
        None => {
            info!("Asset {} not found, creating it", identity);
            let asset = directory
                .create_asset(session, project_id, &identity)
                .await
                .map_err(RecordError::Directory)?;
            report.nodes_created += 1;
            (asset.id, None)
        }
        Some(asset) => {
            let node_id = working_node_id(&identity, &asset)?;
            report.nodes_reused += 1;

            let matches = matching_notes(&asset.notes, &record.url);
            if matches.len() > 1 {
                report.ambiguous_notes += 1;
                warn!(
                    "{} notes on asset {} match {}, appending to note {}",
                    matches.len(),
                    identity,
                    record.url,
                    matches[0].id
                );
            }
            (node_id, matches.first().map(|note| note.id.clone()))
        }
    };

    let attachment = directory
        .upload_attachment(session, project_id, &node_id, &screenshot)
        .await
        .map_err(RecordError::Directory)?;
    let fragment = render_fragment(record, project_id, &attachment);

    match existing_note {
        Some(note_id) => {
            let previous = directory
                .get_note_text(session, project_id, &note_id)
                .await
                .map_err(RecordError::Directory)?;
            directory
                .patch_note(
                    session,
                    project_id,
                    &note_id,
                    &append_fragment(&previous, &fragment),
                )
                .await
                .map_err(RecordError::Directory)?;
            info!("Appended screenshot of {} to note {}", record.url, note_id);
            Ok(NoteAction::Appended)
        }
        None => {
            directory
                .create_note(session, project_id, &node_id, &fragment)
                .await
                .map_err(RecordError::Directory)?;
            info!("Created note for {} on node {}", record.url, node_id);
            Ok(NoteAction::Created)
        }
    }
}

/// Node that notes and attachments hang off.
///
/// IP assets take the note themselves; hostname identities must resolve to
/// the asset's first hostname entity, never to the root.
fn working_node_id(identity: &Identity, asset: &AssetNode) -> Result<EntityId, RecordError> {
    match identity {
        Identity::Ip(_) => Ok(asset.id.clone()),
        Identity::Hostname(name) => asset
            .hostnames
            .first()
            .map(|hostname| hostname.id.clone())
            .ok_or_else(|| RecordError::MissingHostnameEntity(name.clone())),
    }
}

async fn screenshot_path(dir: &Path, file_name: &str) -> Result<PathBuf, RecordError> {
    let path = dir.join(file_name);
    let is_file = !file_name.is_empty()
        && tokio::fs::metadata(&path)
            .await
            .map(|meta| meta.is_file())
            .unwrap_or(false);
    if is_file {
        Ok(path)
    } else {
        Err(RecordError::ScreenshotMissing(path))
    }
}
