//! Error types for Drive uploads

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while authenticating with or uploading to Drive
#[derive(Error, Debug)]
pub enum DriveError {
    /// The credentials file does not exist
    #[error("Credentials file not found: {}", .0.display())]
    CredentialsNotFound(PathBuf),

    /// The credentials file is not valid JSON or lacks a required field
    #[error("Invalid credentials JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The credentials JSON is neither a service account key nor an
    /// authorized-user token
    #[error("Unrecognized credentials JSON format. Expected service account or OAuth token JSON.")]
    UnrecognizedCredentials,

    /// Authorized-user credentials without the client id/secret needed to refresh
    #[error("Credentials cannot be refreshed: {0}")]
    NotRefreshable(&'static str),

    /// Signing the service-account assertion failed
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    /// The token endpoint rejected the grant
    #[error("Token exchange failed ({status}): {message}")]
    TokenExchange { status: u16, message: String },

    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The local file to upload does not exist
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Drive returned an error
    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// The resumable session response carried no upload URL
    #[error("Upload session response has no Location header")]
    MissingUploadLocation,

    /// The caller cancelled the upload
    #[error("Upload cancelled")]
    Cancelled,
}

impl DriveError {
    /// Whether another attempt might succeed
    ///
    /// Transport failures, rate limiting and server-side errors are
    /// transient; everything else is not.
    pub fn is_retryable(&self) -> bool {
        match self {
            DriveError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            DriveError::ServerError { status, .. } | DriveError::TokenExchange { status, .. } => {
                is_retryable_status(*status)
            }
            _ => false,
        }
    }
}

/// HTTP 429 or any 5xx
pub fn is_retryable_status(status: u16) -> bool {
    status == 429 || (500..600).contains(&status)
}

/// Result type for Drive operations
pub type Result<T> = std::result::Result<T, DriveError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_statuses() {
        assert!(is_retryable_status(429));
        assert!(is_retryable_status(500));
        assert!(is_retryable_status(503));
        assert!(!is_retryable_status(400));
        assert!(!is_retryable_status(401));
        assert!(!is_retryable_status(404));
    }

    #[test]
    fn test_error_retryability() {
        let server = |status| DriveError::ServerError {
            status,
            message: String::new(),
        };
        assert!(server(502).is_retryable());
        assert!(!server(403).is_retryable());
        assert!(!DriveError::Cancelled.is_retryable());
        assert!(!DriveError::FileNotFound(PathBuf::from("x.docx")).is_retryable());
        assert!(!DriveError::UnrecognizedCredentials.is_retryable());
    }
}
