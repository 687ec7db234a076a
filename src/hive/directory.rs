//! The directory operations the importer depends on.

use std::path::Path;

use super::models::{AssetNode, AttachmentRef, EntityId, ProjectSummary};
use crate::error_handling::HiveError;
use crate::identity::Identity;
use crate::session::SessionContext;

/// Remote asset graph as seen by the reconciliation engine.
///
/// Every operation is one logical request and carries the session
/// explicitly. Implementations map a 401 to
/// `HiveError::AuthenticationRequired` and never re-login on their own.
#[allow(async_fn_in_trait)]
pub trait Directory {
    /// Projects the session may write to.
    async fn list_projects(&self, session: &SessionContext)
        -> Result<Vec<ProjectSummary>, HiveError>;

    /// Assets whose IP or hostname equals the identity.
    async fn search_assets(
        &self,
        session: &SessionContext,
        project_id: &str,
        identity: &Identity,
    ) -> Result<Vec<AssetNode>, HiveError>;

    /// Creates the asset for an identity that search did not find.
    async fn create_asset(
        &self,
        session: &SessionContext,
        project_id: &str,
        identity: &Identity,
    ) -> Result<AssetNode, HiveError>;

    /// Uploads a screenshot bound to `node_id`.
    ///
    /// Fails with `HiveError::FileNotFound` before any request when `path`
    /// does not exist.
    async fn upload_attachment(
        &self,
        session: &SessionContext,
        project_id: &str,
        node_id: &EntityId,
        path: &Path,
    ) -> Result<AttachmentRef, HiveError>;

    /// Creates a note with `text` under `node_id`.
    async fn create_note(
        &self,
        session: &SessionContext,
        project_id: &str,
        node_id: &EntityId,
        text: &str,
    ) -> Result<(), HiveError>;

    /// Current text of a note, empty when it has none.
    async fn get_note_text(
        &self,
        session: &SessionContext,
        project_id: &str,
        note_id: &EntityId,
    ) -> Result<String, HiveError>;

    /// Replaces the text of a note.
    async fn patch_note(
        &self,
        session: &SessionContext,
        project_id: &str,
        note_id: &EntityId,
        text: &str,
    ) -> Result<(), HiveError>;
}
