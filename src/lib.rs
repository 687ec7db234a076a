//! gowitness_hive library: imports gowitness screenshots into a Hive asset graph
//!
//! Each screenshot record is attached to the asset node of its host (IP or
//! hostname) as a note. Nodes are created once per identity; notes for the
//! same URL are appended to rather than duplicated, so overlapping batches can
//! be imported repeatedly.
//!
//! # Example
//!
//! ```no_run
//! use gowitness_hive::{run_import, Config, SessionMode};
//! use std::path::PathBuf;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     hive_url: "http://127.0.0.1".to_string(),
//!     project_id: Some("42".to_string()),
//!     screenshots: PathBuf::from("screenshots"),
//!     jsonl: PathBuf::from("gowitness.jsonl"),
//!     session_mode: SessionMode::Restore,
//!     ..Default::default()
//! };
//!
//! let report = run_import(config).await?;
//! println!("{} notes written", report.reconciliation.succeeded());
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Records are processed strictly one
//! after another; no two directory requests are ever in flight together.

#![warn(missing_docs)]

mod app;
pub mod config;
pub mod error_handling;
pub mod hive;
pub mod identity;
pub mod initialization;
pub mod input;
pub mod reconcile;
pub mod session;

// Re-export public API
pub use config::{Config, LogFormat, LogLevel, SessionMode};
pub use error_handling::{HiveError, ImportError, RecordError, RetryPolicy, SessionError};
pub use hive::{Directory, HiveClient};
pub use identity::{resolve, Identity};
pub use input::ScreenshotRecord;
pub use reconcile::{reconcile, ReconciliationReport};
pub use run::{run_import, run_import_with, ImportReport};
pub use session::SessionContext;

// Internal run module (wires session, project, input and engine together)
mod run {
    use std::time::Instant;

    use log::info;

    use crate::app::{
        confirm_save_session, print_reconciliation_statistics, prompt_credentials,
        select_project,
    };
    use crate::config::{Config, SessionMode};
    use crate::error_handling::ImportError;
    use crate::hive::{Directory, HiveClient};
    use crate::initialization::init_client;
    use crate::input::read_records;
    use crate::reconcile::{reconcile, ReconciliationReport};
    use crate::session::{self, SessionContext};

    /// Results of an import run.
    #[derive(Debug)]
    pub struct ImportReport {
        /// Project the screenshots were imported into
        pub project_id: String,
        /// Engine counters and per-record failures
        pub reconciliation: ReconciliationReport,
        /// Input lines dropped as malformed
        pub malformed_lines: usize,
        /// Elapsed time in seconds
        pub elapsed_seconds: f64,
    }

    /// Runs an import with a client built from `config`.
    ///
    /// Reads the JSONL input, obtains a session (login or restore), picks the
    /// project and reconciles every record.
    ///
    /// # Errors
    ///
    /// Returns an `ImportError` for every fatal condition: invalid
    /// configuration, unreadable input, session failures, project selection
    /// failures and fatal directory errors. Per-record problems are reported
    /// in `ImportReport::reconciliation` instead.
    pub async fn run_import(config: Config) -> Result<ImportReport, ImportError> {
        let client = init_client(&config)?;
        run_import_with(config, &client).await
    }

    /// Same as [`run_import`] with a caller-provided client (custom retry
    /// policy, timeouts).
    pub async fn run_import_with(
        config: Config,
        client: &HiveClient,
    ) -> Result<ImportReport, ImportError> {
        config.validate()?;
        let start_time = Instant::now();

        let batch = read_records(&config.jsonl)
            .await
            .map_err(|source| ImportError::Input {
                path: config.jsonl.clone(),
                source,
            })?;
        info!(
            "Loaded {} screenshot records from {}",
            batch.records.len(),
            config.jsonl.display()
        );

        let session = open_session(client, &config).await?;

        let project_id = match &config.project_id {
            Some(project_id) => project_id.clone(),
            None => {
                let projects = client.list_projects(&session).await?;
                select_project(&projects)?
            }
        };
        info!("Importing into project {}", project_id);

        let reconciliation = reconcile(
            client,
            &session,
            &project_id,
            &config.screenshots,
            &batch.records,
        )
        .await?;
        print_reconciliation_statistics(&reconciliation, batch.malformed_lines);

        Ok(ImportReport {
            project_id,
            reconciliation,
            malformed_lines: batch.malformed_lines,
            elapsed_seconds: start_time.elapsed().as_secs_f64(),
        })
    }

    async fn open_session(
        client: &HiveClient,
        config: &Config,
    ) -> Result<SessionContext, ImportError> {
        match config.session_mode {
            SessionMode::Restore => {
                Ok(session::restore(&config.hive_url, &config.session_file).await?)
            }
            SessionMode::Login { save } => {
                let save = save || confirm_save_session()?;
                let credentials = prompt_credentials()?;
                let session =
                    session::authenticate(client, &config.hive_url, &credentials).await?;
                if save {
                    session::persist(&session, &config.session_file).await?;
                }
                Ok(session)
            }
        }
    }
}
