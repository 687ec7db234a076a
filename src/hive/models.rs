//! Hive wire models.
//!
//! Only the fields the importer reads are modeled; everything else in the
//! responses is ignored.

use serde::{Deserialize, Deserializer, Serialize};

/// Opaque id of a node, note or project.
///
/// Hive has returned ids both as integers and as strings. The representation
/// received is kept so ids are echoed back exactly as the server sent them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    /// Integer id
    Number(i64),
    /// String id
    Text(String),
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityId::Number(n) => write!(f, "{n}"),
            EntityId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for EntityId {
    fn from(n: i64) -> Self {
        EntityId::Number(n)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        EntityId::Text(s.to_string())
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Hostname child of an asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostnameEntity {
    /// Node id notes and files attach to
    pub id: EntityId,
    #[serde(default)]
    /// Host name
    pub hostname: Option<String>,
}

/// Note attached to an asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteEntity {
    /// Note node id
    pub id: EntityId,
    #[serde(default)]
    /// Note body, absent on empty notes
    pub text: Option<String>,
}

impl NoteEntity {
    /// Note body, empty when absent.
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or_default()
    }
}

/// Asset (root node) returned by search or creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetNode {
    /// Root node id
    pub id: EntityId,
    #[serde(default)]
    /// IP value for IP assets
    pub ip: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    /// Hostname children
    pub hostnames: Vec<HostnameEntity>,
    #[serde(default, deserialize_with = "null_as_empty")]
    /// Notes on the asset
    pub notes: Vec<NoteEntity>,
}

/// Project the session can edit.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProjectSummary {
    #[serde(rename = "projectId")]
    /// Project id
    pub project_id: EntityId,
    #[serde(rename = "projectName", default)]
    /// Display name
    pub project_name: String,
    #[serde(rename = "projectPath", default, deserialize_with = "null_as_empty")]
    /// Folder path, root first
    pub project_path: Vec<String>,
}

impl ProjectSummary {
    /// Human-readable location, e.g. `/ - team - Web audit`.
    ///
    /// Hive calls the root folder `default`; it is shown as `/`.
    pub fn display_path(&self) -> String {
        self.project_path
            .iter()
            .map(|part| if part == "default" { "/" } else { part.as_str() })
            .chain(std::iter::once(self.project_name.as_str()))
            .collect::<Vec<_>>()
            .join(" - ")
    }
}

/// Reference to an uploaded screenshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentRef(pub String);

impl AttachmentRef {
    /// Path under which the directory serves the file.
    pub fn image_path(&self, project_id: &str) -> String {
        format!("/api/project/{project_id}/graph/file/{}", self.0)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct UploadResponse {
    pub uuid: EntityId,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NoteBody {
    #[serde(default)]
    pub text: Option<String>,
}
