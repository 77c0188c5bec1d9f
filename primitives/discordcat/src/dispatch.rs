//! Webhook delivery.
//!
//! Each send is a single POST with no retry. The two endpoints report
//! success differently: a JSON message is accepted with `204 No Content`,
//! a multipart upload with `200 OK`. Any other status, including the other
//! endpoint's success code, is a rejection.

use std::path::{Path, PathBuf};

use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Author name used when `--username` is not given.
pub const DEFAULT_USERNAME: &str = "bot";

/// Body of a text message POST.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessagePayload {
    pub content: String,
    pub username: String,
}

/// One delivery for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchRequest {
    Message { content: String, username: String },
    File { filepath: PathBuf, filename: String },
}

impl DispatchRequest {
    /// Text message, with an empty or absent username replaced by [`DEFAULT_USERNAME`].
    pub fn message(content: impl Into<String>, username: Option<&str>) -> Self {
        let username = username
            .filter(|u| !u.is_empty())
            .unwrap_or(DEFAULT_USERNAME);
        Self::Message {
            content: content.into(),
            username: username.to_string(),
        }
    }

    /// File upload, reported under `filename` or, if that is absent or
    /// empty, under the path as given.
    pub fn file(filepath: impl Into<PathBuf>, filename: Option<&str>) -> Self {
        let filepath = filepath.into();
        let filename = match filename.filter(|f| !f.is_empty()) {
            Some(name) => name.to_string(),
            None => filepath.to_string_lossy().into_owned(),
        };
        Self::File { filepath, filename }
    }
}

/// Result of a delivery that reached the remote service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Delivered,
    Rejected { status: StatusCode },
}

impl Outcome {
    fn from_status(status: StatusCode, success: StatusCode) -> Self {
        if status == success {
            Outcome::Delivered
        } else {
            Outcome::Rejected { status }
        }
    }

    pub fn is_delivered(&self) -> bool {
        matches!(self, Outcome::Delivered)
    }
}

/// Posts messages and files to webhook URLs.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    client: Client,
}

impl Dispatcher {
    /// # Errors
    ///
    /// [`Error::Network`] if the HTTP client cannot be initialised.
    pub fn new() -> Result<Self> {
        let client = Client::builder().build()?;
        Ok(Self { client })
    }

    pub async fn dispatch(&self, request: &DispatchRequest, webhook_url: &str) -> Result<Outcome> {
        match request {
            DispatchRequest::Message { content, username } => {
                self.send_message(content, username, webhook_url).await
            }
            DispatchRequest::File { filepath, filename } => {
                self.send_file(filepath, filename, webhook_url).await
            }
        }
    }

    /// Posts `{content, username}` as JSON. Only `204` counts as delivered.
    ///
    /// # Errors
    ///
    /// [`Error::Network`] for transport failures. Non-success statuses are
    /// returned as [`Outcome::Rejected`], not as errors.
    pub async fn send_message(
        &self,
        content: &str,
        username: &str,
        webhook_url: &str,
    ) -> Result<Outcome> {
        let payload = MessagePayload {
            content: content.to_string(),
            username: username.to_string(),
        };

        debug!(host = %host_of(webhook_url), bytes = content.len(), "Posting message");
        let response = self.client.post(webhook_url).json(&payload).send().await?;

        let status = response.status();
        info!(%status, "Message webhook responded");
        Ok(Outcome::from_status(status, StatusCode::NO_CONTENT))
    }

    /// Uploads the file at `filepath` as the multipart field `file`, named
    /// `filename` (or the path when `filename` is empty). Only `200` counts
    /// as delivered.
    ///
    /// # Errors
    ///
    /// [`Error::FileRead`] if the file cannot be read, [`Error::Network`]
    /// for transport failures.
    pub async fn send_file(
        &self,
        filepath: &Path,
        filename: &str,
        webhook_url: &str,
    ) -> Result<Outcome> {
        let bytes = tokio::fs::read(filepath)
            .await
            .map_err(|source| Error::FileRead {
                path: filepath.to_path_buf(),
                source,
            })?;

        let filename = if filename.is_empty() {
            filepath.to_string_lossy().into_owned()
        } else {
            filename.to_string()
        };

        debug!(
            host = %host_of(webhook_url),
            filename = %filename,
            bytes = bytes.len(),
            "Uploading file"
        );
        let form = Form::new().part("file", Part::bytes(bytes).file_name(filename));
        let response = self.client.post(webhook_url).multipart(form).send().await?;

        let status = response.status();
        info!(%status, "File webhook responded");
        Ok(Outcome::from_status(status, StatusCode::OK))
    }
}

/// Host part of a webhook URL, for logs. Webhook paths carry the secret token.
fn host_of(url: &str) -> String {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| "<invalid url>".to_string())
}
