//! Drive v3 upload client

use std::path::Path;
use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{CONTENT_TYPE, LOCATION};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::auth::TokenProvider;
use crate::credentials::Credentials;
use crate::error::{DriveError, Result};
use crate::retry::{CancellationToken, RetryPolicy};

/// Default Drive upload endpoint
pub const DEFAULT_UPLOAD_URL: &str = "https://www.googleapis.com/upload/drive/v3";

/// Default Drive metadata endpoint
pub const DEFAULT_API_URL: &str = "https://www.googleapis.com/drive/v3";

/// MIME type of uploaded documents
pub const DOCX_MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Browser link for a file shared with "anyone with the link"
pub fn public_view_url(file_id: &str) -> String {
    format!("https://drive.google.com/file/d/{}/view", file_id)
}

#[derive(Debug, Serialize)]
struct FileMetadata<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parents: Option<[&'a str; 1]>,
}

#[derive(Debug, Serialize)]
struct Permission {
    role: &'static str,
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct UploadedFile {
    id: String,
}

/// Uploads documents to Google Drive
#[derive(Debug)]
pub struct DriveUploader {
    tokens: TokenProvider,
    client: Client,
    upload_url: String,
    api_url: String,
    timeout: Duration,
    retry: RetryPolicy,
}

impl DriveUploader {
    /// Create an uploader from a credentials file
    pub fn new<P: AsRef<Path>>(credentials_path: P) -> Result<Self> {
        Self::from_credentials(Credentials::from_file(credentials_path)?)
    }

    /// Create an uploader from already parsed credentials
    pub fn from_credentials(credentials: Credentials) -> Result<Self> {
        let timeout = Duration::from_secs(30);
        let client = Client::builder().timeout(timeout).build()?;
        debug!(kind = credentials.kind(), "Loaded Drive credentials");

        Ok(Self {
            tokens: TokenProvider::new(credentials, client.clone())?.with_timeout(timeout),
            client,
            upload_url: DEFAULT_UPLOAD_URL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            timeout,
            retry: RetryPolicy::default(),
        })
    }

    /// Set the per-request timeout, token requests included
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self.tokens = self.tokens.with_timeout(timeout);
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Point the client at other Drive-compatible endpoints
    pub fn with_endpoints(mut self, upload_url: impl Into<String>, api_url: impl Into<String>) -> Self {
        self.upload_url = upload_url.into().trim_end_matches('/').to_string();
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    pub fn credentials(&self) -> &Credentials {
        self.tokens.credentials()
    }

    /// Upload a file and return its Drive file id
    ///
    /// Without `folder_id` (or with an empty one) the file lands in the
    /// root of the account's Drive.
    pub fn upload_file<P: AsRef<Path>>(&self, path: P, folder_id: Option<&str>) -> Result<String> {
        self.upload_file_with_cancel(path, folder_id, &CancellationToken::new())
    }

    /// Like [`DriveUploader::upload_file`], stopping early once `cancel` is set
    pub fn upload_file_with_cancel<P: AsRef<Path>>(
        &self,
        path: P,
        folder_id: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<String> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(DriveError::FileNotFound(path.to_path_buf()));
        }
        cancel.check()?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document.docx".to_string());
        let content = std::fs::read(path)?;
        let metadata = FileMetadata {
            name: &name,
            parents: folder_id.filter(|id| !id.is_empty()).map(|id| [id]),
        };

        let session_url = format!("{}/files?uploadType=resumable&fields=id", self.upload_url);
        let location = self.retry.run(cancel, |_| {
            let response = self.send_authorized(|token| {
                self.client
                    .post(&session_url)
                    .bearer_auth(token)
                    .timeout(self.timeout)
                    .header("X-Upload-Content-Type", DOCX_MIME_TYPE)
                    .header("X-Upload-Content-Length", content.len().to_string())
                    .json(&metadata)
            })?;
            response
                .headers()
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
                .ok_or(DriveError::MissingUploadLocation)
        })?;
        debug!(file = %name, bytes = content.len(), "Opened resumable upload session");

        let uploaded: UploadedFile = self.retry.run(cancel, |_| {
            let response = self.send_authorized(|token| {
                self.client
                    .put(&location)
                    .bearer_auth(token)
                    .timeout(self.timeout)
                    .header(CONTENT_TYPE, DOCX_MIME_TYPE)
                    .body(content.clone())
            })?;
            Ok(response.json()?)
        })?;

        info!(file = %name, id = %uploaded.id, "Uploaded file to Drive");
        Ok(uploaded.id)
    }

    /// Let anyone with the link view the file
    pub fn make_public(&self, file_id: &str) -> Result<()> {
        let url = format!("{}/files/{}/permissions", self.api_url, file_id);
        let permission = Permission {
            role: "reader",
            kind: "anyone",
        };
        self.retry.run(&CancellationToken::new(), |_| {
            self.send_authorized(|token| {
                self.client
                    .post(&url)
                    .bearer_auth(token)
                    .timeout(self.timeout)
                    .json(&permission)
            })
        })?;
        info!(id = %file_id, "Shared Drive file with anyone with the link");
        Ok(())
    }

    /// Send a request with a bearer token, refreshing the token once on 401
    fn send_authorized<F>(&self, build: F) -> Result<Response>
    where
        F: Fn(&str) -> RequestBuilder,
    {
        let token = self.tokens.access_token()?;
        let response = build(&token).send()?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return check_status(response);
        }

        debug!("Access token rejected, fetching a new one");
        self.tokens.invalidate();
        let token = self.tokens.access_token()?;
        check_status(build(&token).send()?)
    }
}

fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().unwrap_or_else(|_| "Unknown error".to_string());
    Err(DriveError::ServerError {
        status: status.as_u16(),
        message,
    })
}
