//! Hive session acquisition and persistence.
//!
//! A [`SessionContext`] is either created by logging in or restored from the
//! token saved by an earlier login. It is never renewed automatically: an
//! expired token surfaces as `HiveError::AuthenticationRequired` on the next
//! directory call.

use std::path::Path;

use log::{debug, info};
use reqwest::header::{HeaderMap, SET_COOKIE};
use serde::Serialize;

use crate::config::{SESSION_COOKIE_NAME, SESSION_ENDPOINT};
use crate::error_handling::{HiveError, SessionError};
use crate::hive::HiveClient;

/// Authenticated handle passed to every directory call.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionContext {
    base_url: String,
    token: String,
}

impl SessionContext {
    /// `base_url` is stored without its trailing slash.
    pub fn new(base_url: &str, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    /// Base address without trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Session cookie value.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Value for the `Cookie` request header.
    pub fn cookie_header(&self) -> String {
        format!("{}={}", SESSION_COOKIE_NAME, self.token)
    }
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Login form sent to the session endpoint.
#[derive(Clone, Serialize)]
pub struct Credentials {
    #[serde(rename = "userLogin")]
    /// Account name
    pub login: String,
    #[serde(rename = "userPassword")]
    /// Account password
    pub password: String,
    /// Empty when the account has no MFA
    #[serde(rename = "mfaToken")]
    pub mfa_token: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("login", &self.login)
            .field("password", &"<redacted>")
            .field("mfa", &!self.mfa_token.is_empty())
            .finish()
    }
}

/// Logs in and returns a fresh session.
///
/// # Errors
///
/// - `SessionError::Rejected` for any non-success status (401 included)
/// - `SessionError::MissingCookie` when the response sets no session cookie
/// - `SessionError::Directory` when the request keeps failing after retries
pub async fn authenticate(
    client: &HiveClient,
    base_url: &str,
    credentials: &Credentials,
) -> Result<SessionContext, SessionError> {
    let base_url = base_url.trim_end_matches('/');
    let url = format!("{base_url}{SESSION_ENDPOINT}");
    debug!("Sending login for {} to {}", credentials.login, url);

    let response = client
        .send("login", || Ok(client.http().post(&url).json(credentials)))
        .await
        .map_err(|e| match e {
            HiveError::AuthenticationRequired => SessionError::Rejected { status: 401 },
            HiveError::Status { status, .. } => SessionError::Rejected { status },
            other => SessionError::Directory(other),
        })?;

    let token = session_cookie(response.headers()).ok_or(SessionError::MissingCookie {
        cookie: SESSION_COOKIE_NAME,
    })?;
    info!("Authenticated to {}", base_url);
    Ok(SessionContext::new(base_url, token))
}

/// Loads the token saved by an earlier `persist`.
///
/// # Errors
///
/// `SessionError::NoSavedSession` when the file is missing or empty; there
/// is no anonymous fallback.
pub async fn restore(base_url: &str, path: &Path) -> Result<SessionContext, SessionError> {
    let token = match tokio::fs::read_to_string(path).await {
        Ok(contents) => contents.trim().to_string(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(SessionError::NoSavedSession {
                path: path.to_path_buf(),
            })
        }
        Err(source) => {
            return Err(SessionError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    if token.is_empty() {
        return Err(SessionError::NoSavedSession {
            path: path.to_path_buf(),
        });
    }
    debug!("Restored session from {}", path.display());
    Ok(SessionContext::new(base_url, token))
}

/// Saves the session token so later runs can `restore` it.
pub async fn persist(session: &SessionContext, path: &Path) -> Result<(), SessionError> {
    tokio::fs::write(path, session.token())
        .await
        .map_err(|source| SessionError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    info!("Session saved to {}", path.display());
    Ok(())
}

/// Extracts the session cookie value from `Set-Cookie` headers.
fn session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(|cookie| {
            let pair = cookie.split(';').next()?;
            let (name, value) = pair.split_once('=')?;
            let value = value.trim();
            (name.trim() == SESSION_COOKIE_NAME && !value.is_empty()).then(|| value.to_string())
        })
}
