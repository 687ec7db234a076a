//! reqwest-backed Hive client.
//!
//! Every call goes through [`HiveClient::send`], which applies the retry
//! policy and maps statuses onto `HiveError`.

use std::path::Path;
use std::time::Duration;

use log::{debug, warn};
use reqwest::header::COOKIE;
use reqwest::multipart::{Form, Part};
use reqwest::{ClientBuilder, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::json;
use tokio_retry::RetryIf;

use super::directory::Directory;
use super::models::{
    AssetNode, AttachmentRef, EntityId, NoteBody, ProjectSummary, UploadResponse,
};
use crate::config::{
    project_endpoint, EDITABLE_PROJECTS_ENDPOINT, HTTP_STATUS_UNAUTHORIZED, UPLOAD_CAPTION,
    UPLOAD_FILE_NAME, UPLOAD_MIME_TYPE,
};
use crate::error_handling::{get_retry_strategy, is_retriable, HiveError, RetryPolicy};
use crate::identity::Identity;
use crate::session::SessionContext;

/// HTTP client for the Hive directory API.
///
/// Holds no session state: the base address and cookie come from the
/// `SessionContext` passed to each call.
#[derive(Debug, Clone)]
pub struct HiveClient {
    http: reqwest::Client,
    retry: RetryPolicy,
}

impl HiveClient {
    /// Wraps an existing `reqwest::Client` with the default retry policy.
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            retry: RetryPolicy::default(),
        }
    }

    /// Builds a client; `timeout` of `None` keeps the transport default.
    pub fn with_timeout(timeout: Option<Duration>) -> Result<Self, reqwest::Error> {
        let mut builder =
            ClientBuilder::new().user_agent(concat!("gowitness_hive/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self::new(builder.build()?))
    }

    /// Replaces the retry policy.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Retry policy applied to every call.
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Sends a request built by `make_request`, retrying transient failures.
    ///
    /// The builder runs once per attempt because request bodies are consumed
    /// on send. 401 becomes `AuthenticationRequired` and is never retried.
    pub(crate) async fn send<F>(
        &self,
        operation: &'static str,
        make_request: F,
    ) -> Result<Response, HiveError>
    where
        F: Fn() -> Result<RequestBuilder, HiveError>,
    {
        let strategy = get_retry_strategy(&self.retry);
        RetryIf::spawn(
            strategy,
            || {
                let request = make_request();
                async move { attempt(operation, request?).await }
            },
            |e: &HiveError| {
                let retry = is_retriable(e);
                if retry {
                    warn!("{} failed, retrying: {}", operation, e);
                }
                retry
            },
        )
        .await
    }

    async fn send_json<T, F>(&self, operation: &'static str, make_request: F) -> Result<T, HiveError>
    where
        T: DeserializeOwned,
        F: Fn() -> Result<RequestBuilder, HiveError>,
    {
        let response = self.send(operation, make_request).await?;
        let body = response
            .text()
            .await
            .map_err(|source| HiveError::Transport { operation, source })?;
        serde_json::from_str(&body).map_err(|e| HiveError::UnexpectedResponse {
            operation,
            message: e.to_string(),
        })
    }

    fn with_session(&self, request: RequestBuilder, session: &SessionContext) -> RequestBuilder {
        request.header(COOKIE, session.cookie_header())
    }
}

async fn attempt(operation: &'static str, request: RequestBuilder) -> Result<Response, HiveError> {
    let response = request
        .send()
        .await
        .map_err(|source| HiveError::Transport { operation, source })?;

    let status = response.status();
    debug!("{}: HTTP {} from {}", operation, status, response.url());

    if status.as_u16() == HTTP_STATUS_UNAUTHORIZED {
        return Err(HiveError::AuthenticationRequired);
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        debug!("{} error body: {}", operation, body);
        return Err(HiveError::Status {
            operation,
            status: status.as_u16(),
            body,
        });
    }
    Ok(response)
}

fn graph_url(session: &SessionContext, project_id: &str, suffix: &str) -> String {
    format!(
        "{}{}{}",
        session.base_url(),
        project_endpoint(project_id),
        suffix
    )
}

fn upload_form(bytes: Vec<u8>, node_id: &EntityId) -> Result<Form, reqwest::Error> {
    let part = Part::bytes(bytes)
        .file_name(UPLOAD_FILE_NAME)
        .mime_str(UPLOAD_MIME_TYPE)?;
    Ok(Form::new()
        .part("file", part)
        .text("caption", UPLOAD_CAPTION)
        .text("filename", UPLOAD_FILE_NAME)
        .text("nodeId", node_id.to_string()))
}

impl Directory for HiveClient {
    async fn list_projects(
        &self,
        session: &SessionContext,
    ) -> Result<Vec<ProjectSummary>, HiveError> {
        let url = format!("{}{}", session.base_url(), EDITABLE_PROJECTS_ENDPOINT);
        self.send_json("list projects", || {
            Ok(self.with_session(self.http.get(&url), session))
        })
        .await
    }

    async fn search_assets(
        &self,
        session: &SessionContext,
        project_id: &str,
        identity: &Identity,
    ) -> Result<Vec<AssetNode>, HiveError> {
        let url = graph_url(session, project_id, "/search");
        let body = json!({ "searchString": identity.search_expression() });
        debug!("Searching assets with {}", body);
        let assets: Option<Vec<AssetNode>> = self
            .send_json("search assets", || {
                Ok(self.with_session(self.http.post(&url).json(&body), session))
            })
            .await?;
        Ok(assets.unwrap_or_default())
    }

    async fn create_asset(
        &self,
        session: &SessionContext,
        project_id: &str,
        identity: &Identity,
    ) -> Result<AssetNode, HiveError> {
        let url = graph_url(session, project_id, "/nodes");
        let body = json!([identity.creation_payload()]);
        debug!("Creating asset {}", body);
        let created: Vec<AssetNode> = self
            .send_json("create asset", || {
                Ok(self.with_session(self.http.post(&url).json(&body), session))
            })
            .await?;
        created
            .into_iter()
            .next()
            .ok_or(HiveError::UnexpectedResponse {
                operation: "create asset",
                message: "empty node list".to_string(),
            })
    }

    async fn upload_attachment(
        &self,
        session: &SessionContext,
        project_id: &str,
        node_id: &EntityId,
        path: &Path,
    ) -> Result<AttachmentRef, HiveError> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(HiveError::FileNotFound(path.to_path_buf()))
            }
            Err(source) => {
                return Err(HiveError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let url = graph_url(session, project_id, "/file_node");
        debug!(
            "Uploading {} ({} bytes) to node {}",
            path.display(),
            bytes.len(),
            node_id
        );
        let uploaded: UploadResponse = self
            .send_json("upload attachment", || {
                let form = upload_form(bytes.clone(), node_id).map_err(|source| {
                    HiveError::Transport {
                        operation: "upload attachment",
                        source,
                    }
                })?;
                Ok(self.with_session(self.http.post(&url).multipart(form), session))
            })
            .await?;
        Ok(AttachmentRef(uploaded.uuid.to_string()))
    }

    async fn create_note(
        &self,
        session: &SessionContext,
        project_id: &str,
        node_id: &EntityId,
        text: &str,
    ) -> Result<(), HiveError> {
        let url = graph_url(session, project_id, "/nodes");
        let body = json!([{ "nodeId": node_id, "text": text }]);
        debug!("Creating note on node {}: {}", node_id, text);
        self.send("create note", || {
            Ok(self.with_session(self.http.post(&url).json(&body), session))
        })
        .await?;
        Ok(())
    }

    async fn get_note_text(
        &self,
        session: &SessionContext,
        project_id: &str,
        note_id: &EntityId,
    ) -> Result<String, HiveError> {
        let url = graph_url(session, project_id, &format!("/nodes/{note_id}"));
        let note: NoteBody = self
            .send_json("get note", || {
                Ok(self.with_session(self.http.get(&url), session))
            })
            .await?;
        Ok(note.text.unwrap_or_default())
    }

    async fn patch_note(
        &self,
        session: &SessionContext,
        project_id: &str,
        note_id: &EntityId,
        text: &str,
    ) -> Result<(), HiveError> {
        let url = graph_url(session, project_id, &format!("/nodes/{note_id}"));
        let body = json!({ "text": text });
        debug!("Updating note {}: {}", note_id, text);
        self.send("patch note", || {
            Ok(self.with_session(self.http.patch(&url).json(&body), session))
        })
        .await?;
        Ok(())
    }
}
