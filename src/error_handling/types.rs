//! Error type definitions.
//!
//! Fatal errors (`ImportError` and what it wraps) end the run; `RecordError`
//! is recorded against a single screenshot and the batch continues.

use std::path::PathBuf;

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use thiserror::Error;

use crate::config::ConfigValidationError;
use crate::identity::IdentityError;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),
}

/// Errors returned by the Hive directory client.
#[derive(Error, Debug)]
pub enum HiveError {
    /// The directory answered 401: the session is missing or expired.
    #[error("Hive requires authentication, run again with --login")]
    AuthenticationRequired,

    /// Any other non-success status.
    #[error("{operation} failed with HTTP {status}: {body}")]
    Status {
        /// Failed call
        operation: &'static str,
        /// HTTP status
        status: u16,
        /// Response body, for diagnostics
        body: String,
    },

    /// The request never produced a response (connect, timeout, body).
    #[error("{operation} failed: {source}")]
    Transport {
        /// Failed call
        operation: &'static str,
        /// Transport error
        #[source]
        source: ReqwestError,
    },

    /// A 200 response whose body did not have the expected shape.
    #[error("{operation} returned an unexpected response: {message}")]
    UnexpectedResponse {
        /// Failed call
        operation: &'static str,
        /// Decoding error
        message: String,
    },

    /// Local precondition of `upload_attachment`.
    #[error("Screenshot file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Reading a local file failed for another reason.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Errors from obtaining or persisting a session.
#[derive(Error, Debug)]
pub enum SessionError {
    /// Restore was requested but no token is stored.
    #[error("No saved session in {}. Run with --login to authenticate first", path.display())]
    NoSavedSession {
        /// Session file looked up
        path: PathBuf,
    },

    /// The login endpoint answered with a non-success status.
    #[error("Hive rejected the login (HTTP {status})")]
    Rejected {
        /// HTTP status of the login response
        status: u16,
    },

    /// The login succeeded but no session cookie came back.
    #[error("Hive accepted the login but did not return a {cookie} cookie")]
    MissingCookie {
        /// Expected cookie name
        cookie: &'static str,
    },

    /// Network failure after retries.
    #[error(transparent)]
    Directory(#[from] HiveError),

    /// The session file could not be read or written.
    #[error("Session file {}: {source}", path.display())]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Why a single screenshot record was skipped.
#[derive(Error, Debug)]
pub enum RecordError {
    /// No identity could be derived from the record URL.
    #[error(transparent)]
    Identity(#[from] IdentityError),

    /// The screenshot named by the record is not on disk.
    #[error("Screenshot file not found: {}", .0.display())]
    ScreenshotMissing(PathBuf),

    /// A hostname matched an asset that carries no hostname entity.
    #[error("Asset for hostname {0} has no hostname entity to attach to")]
    MissingHostnameEntity(String),

    /// A directory call kept failing after every retry.
    #[error(transparent)]
    Directory(HiveError),
}

/// Fatal errors that end an import run.
#[derive(Error, Debug)]
pub enum ImportError {
    /// The configuration failed validation.
    #[error(transparent)]
    Config(#[from] ConfigValidationError),

    /// Shared resources could not be set up.
    #[error(transparent)]
    Initialization(#[from] InitializationError),

    /// No usable session could be obtained.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A fatal directory error stopped the batch.
    #[error(transparent)]
    Directory(#[from] HiveError),

    /// The JSONL input could not be opened or read.
    #[error("Failed to read input file {}: {source}", path.display())]
    Input {
        /// File involved
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Interactive prompt failed (no terminal, I/O error).
    #[error("Prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),

    /// The session cannot edit any project.
    #[error("No editable projects available for this session")]
    NoProjects,

    /// The operator dismissed the project selection.
    #[error("No project selected")]
    NoProjectSelected,
}
