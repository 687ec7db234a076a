//! Configuration constants.
//!
//! Wire-level names used by the Hive directory API, the note marker, and the
//! retry parameters shared by every directory call.

/// Marker token that identifies a note as produced by this importer.
///
/// A note belongs to a screenshot URL when its text contains both this token
/// and the literal URL.
pub const NOTE_MARKER: &str = "Gowitness";

/// Name of the Hive session cookie.
pub const SESSION_COOKIE_NAME: &str = "BSESSIONID";

/// Default file holding a persisted session token.
pub const DEFAULT_SESSION_FILE: &str = "session.cookie";

// Hive endpoints (relative to the base address)
/// Login endpoint.
pub const SESSION_ENDPOINT: &str = "/api/session";
/// Projects the session may write to.
pub const EDITABLE_PROJECTS_ENDPOINT: &str = "/api/project/editable/";

/// Root of every project-scoped endpoint.
pub fn project_endpoint(project_id: &str) -> String {
    format!("/api/project/{project_id}/graph")
}

// Attachment upload form values
/// Name every screenshot is uploaded under.
pub const UPLOAD_FILE_NAME: &str = "image.jpeg";
/// Content type of uploaded screenshots.
pub const UPLOAD_MIME_TYPE: &str = "image/jpeg";
/// Caption of the file node.
pub const UPLOAD_CAPTION: &str = NOTE_MARKER;

// Retry strategy
/// Total attempts per directory call (initial request included)
pub const RETRY_MAX_ATTEMPTS: usize = 3;
/// Delay before the first retry in milliseconds; doubled for each later retry
pub const RETRY_INITIAL_DELAY_MS: u64 = 300;
/// Maximum delay between retries in seconds
pub const RETRY_MAX_DELAY_SECS: u64 = 5;

/// Server statuses treated as transient and retried.
pub const TRANSIENT_STATUS_CODES: &[u16] = &[500, 502, 503, 504];

/// Status the directory uses to demand a fresh login.
pub const HTTP_STATUS_UNAUTHORIZED: u16 = 401;
