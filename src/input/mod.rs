//! gowitness JSONL input parsing.
//!
//! Each non-blank line is one screenshot record. Lines are parsed
//! independently; a malformed line is logged and dropped.

use std::path::Path;

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, BufReader};

/// HTTP status recorded by the scanner.
///
/// gowitness has written it both as a number and as a string; the value is
/// kept as written and rendered verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseCode {
    /// Written as a JSON number
    Number(i64),
    /// Written as a JSON string
    Text(String),
}

impl Default for ResponseCode {
    fn default() -> Self {
        ResponseCode::Text(String::new())
    }
}

impl std::fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResponseCode::Number(n) => write!(f, "{n}"),
            ResponseCode::Text(s) => f.write_str(s),
        }
    }
}

/// One screenshot taken by gowitness.
///
/// Missing fields default to empty values; only `url` is required to be
/// non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct ScreenshotRecord {
    #[serde(default)]
    /// Screenshotted URL
    pub url: String,
    #[serde(default)]
    /// URL after redirects
    pub final_url: String,
    #[serde(default)]
    /// HTTP status of the final response
    pub response_code: ResponseCode,
    #[serde(default)]
    /// HTTP protocol version
    pub protocol: String,
    #[serde(default)]
    /// Screenshot file, relative to the screenshot directory
    pub file_name: String,
}

/// Why a line was dropped.
#[derive(Debug, thiserror::Error)]
pub enum LineError {
    /// Not a JSON object of the expected shape
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// `url` missing or empty
    #[error("record has no url")]
    MissingUrl,
}

/// Records parsed from a JSONL file, in file order.
#[derive(Debug, Default)]
pub struct InputBatch {
    /// Parsed records
    pub records: Vec<ScreenshotRecord>,
    /// Number of non-blank lines that were dropped
    pub malformed_lines: usize,
}

/// Parses a single JSONL line.
///
/// Returns `Ok(None)` for blank lines.
pub fn parse_line(line: &str) -> Result<Option<ScreenshotRecord>, LineError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let record: ScreenshotRecord = serde_json::from_str(trimmed)?;
    if record.url.trim().is_empty() {
        return Err(LineError::MissingUrl);
    }
    Ok(Some(record))
}

/// Reads every record from a gowitness JSONL file.
///
/// # Errors
///
/// Only I/O failures are returned; malformed lines are counted in
/// `InputBatch::malformed_lines`.
pub async fn read_records(path: &Path) -> std::io::Result<InputBatch> {
    let file = tokio::fs::File::open(path).await?;
    let mut lines = BufReader::new(file).lines();
    let mut batch = InputBatch::default();
    let mut line_number = 0usize;

    while let Some(line) = lines.next_line().await? {
        line_number += 1;
        match parse_line(&line) {
            Ok(Some(record)) => batch.records.push(record),
            Ok(None) => {}
            Err(e) => {
                warn!("Skipping line {} of {}: {}", line_number, path.display(), e);
                batch.malformed_lines += 1;
            }
        }
    }

    debug!(
        "Parsed {} records from {} ({} malformed lines)",
        batch.records.len(),
        path.display(),
        batch.malformed_lines
    );
    Ok(batch)
}
