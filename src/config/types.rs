//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and configuration.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::constants::DEFAULT_SESSION_FILE;

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// Request and response details
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// How the run obtains its Hive session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionMode {
    /// Prompt for credentials and log in. `save` forces persisting the token;
    /// when `false` the operator is asked.
    Login {
        /// Persist without asking
        save: bool,
    },
    /// Reuse the token stored in the session file.
    Restore,
}

/// Command-line options.
///
/// Converted into the library [`Config`] by `main`.
///
/// # Examples
///
/// ```bash
/// # First run: log in and keep the session
/// gowitness_hive --hive http://127.0.0.1 --screenshots ./screenshots \
///     --jsonl gowitness.jsonl --login --save-session
///
/// # Later runs reuse session.cookie
/// gowitness_hive --hive http://127.0.0.1 --project-id 42 \
///     --screenshots ./screenshots --jsonl gowitness.jsonl
/// ```
#[derive(Debug, Parser)]
#[command(
    name = "gowitness_hive",
    about = "Attaches gowitness screenshots to Hive hosts as notes."
)]
pub struct Opt {
    /// Hive base address (e.g. http://127.0.0.1)
    #[arg(long = "hive", env = "HIVE_URL")]
    pub hive_url: String,

    /// Hive project ID; prompts for a project when omitted
    #[arg(long, env = "HIVE_PROJECT_ID")]
    pub project_id: Option<String>,

    /// Directory containing the gowitness screenshots
    #[arg(long, value_parser)]
    pub screenshots: PathBuf,

    /// gowitness JSONL output file
    #[arg(long, value_parser)]
    pub jsonl: PathBuf,

    /// Log in to Hive instead of restoring a saved session
    #[arg(long)]
    pub login: bool,

    /// Save the session token after logging in without asking
    #[arg(long, requires = "login")]
    pub save_session: bool,

    /// File holding the saved session token
    #[arg(long, value_parser, default_value = DEFAULT_SESSION_FILE)]
    pub session_file: PathBuf,

    /// HTTP timeout in seconds (transport default when omitted)
    #[arg(long)]
    pub timeout_seconds: Option<u64>,

    /// Enable debug messages (same as --log-level debug)
    #[arg(long)]
    pub debug: bool,

    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,
}

/// Library configuration (no CLI dependencies).
///
/// # Examples
///
/// ```no_run
/// use gowitness_hive::{Config, SessionMode};
/// use std::path::PathBuf;
///
/// let config = Config {
///     hive_url: "http://127.0.0.1".to_string(),
///     project_id: Some("42".to_string()),
///     screenshots: PathBuf::from("./screenshots"),
///     jsonl: PathBuf::from("gowitness.jsonl"),
///     session_mode: SessionMode::Restore,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Hive base address, without trailing slash
    pub hive_url: String,

    /// Explicit project, or `None` to choose interactively
    pub project_id: Option<String>,

    /// Screenshot directory
    pub screenshots: PathBuf,

    /// gowitness JSONL file
    pub jsonl: PathBuf,

    /// Login or restore
    pub session_mode: SessionMode,

    /// Session token file
    pub session_file: PathBuf,

    /// Optional HTTP timeout
    pub timeout_seconds: Option<u64>,

    /// Log level
    pub log_level: LogLevel,

    /// Log format
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hive_url: "http://127.0.0.1".to_string(),
            project_id: None,
            screenshots: PathBuf::from("screenshots"),
            jsonl: PathBuf::from("gowitness.jsonl"),
            session_mode: SessionMode::Restore,
            session_file: PathBuf::from(DEFAULT_SESSION_FILE),
            timeout_seconds: None,
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
        }
    }
}

/// A configuration field that failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigValidationError {
    /// Name of the offending field
    pub field: &'static str,
    /// What is wrong and what is expected
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid {}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigValidationError {}

impl Config {
    /// Checks values that clap cannot check on its own.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        match url::Url::parse(&self.hive_url) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
            Ok(parsed) => {
                return Err(ConfigValidationError {
                    field: "hive_url",
                    message: format!(
                        "scheme '{}' is not supported, expected http:// or https://",
                        parsed.scheme()
                    ),
                })
            }
            Err(e) => {
                return Err(ConfigValidationError {
                    field: "hive_url",
                    message: format!(
                        "'{}' is not a valid URL ({e}), expected e.g. http://127.0.0.1",
                        self.hive_url
                    ),
                })
            }
        }

        if let Some(project_id) = &self.project_id {
            if project_id.trim().is_empty() {
                return Err(ConfigValidationError {
                    field: "project_id",
                    message: "must not be empty; omit it to pick a project interactively"
                        .to_string(),
                });
            }
        }

        if self.timeout_seconds == Some(0) {
            return Err(ConfigValidationError {
                field: "timeout_seconds",
                message: "must be greater than 0".to_string(),
            });
        }

        Ok(())
    }
}

impl From<Opt> for Config {
    fn from(opt: Opt) -> Self {
        let session_mode = if opt.login {
            SessionMode::Login {
                save: opt.save_session,
            }
        } else {
            SessionMode::Restore
        };
        let log_level = if opt.debug {
            LogLevel::Debug
        } else {
            opt.log_level
        };

        Self {
            hive_url: opt.hive_url.trim_end_matches('/').to_string(),
            project_id: opt.project_id,
            screenshots: opt.screenshots,
            jsonl: opt.jsonl,
            session_mode,
            session_file: opt.session_file,
            timeout_seconds: opt.timeout_seconds,
            log_level,
            log_format: opt.log_format,
        }
    }
}
