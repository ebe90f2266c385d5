//! Google credential files
//!
//! Two JSON shapes are accepted:
//!
//! - a service account key (`"type": "service_account"`), as downloaded from
//!   the Cloud console;
//! - an authorized-user token file (anything carrying a `refresh_token`), as
//!   written by the installed-app OAuth flow.
//!
//! The shape is decided once, when the file is loaded.

use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::error::{DriveError, Result};

/// Token endpoint used when an authorized-user file does not name one
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// Service account key
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    /// PEM-encoded RSA private key
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

/// Installed-app OAuth token
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthorizedUser {
    /// Last access token, if the file carries one
    #[serde(default, alias = "token")]
    pub access_token: Option<String>,
    pub refresh_token: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
}

/// A parsed credentials file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    ServiceAccount(ServiceAccountKey),
    AuthorizedUser(AuthorizedUser),
}

impl Credentials {
    /// Load and classify a credentials file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(DriveError::CredentialsNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Classify credentials JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;

        if value.get("type").and_then(Value::as_str) == Some("service_account") {
            return Ok(Credentials::ServiceAccount(serde_json::from_value(value)?));
        }
        if value.get("refresh_token").is_some() {
            return Ok(Credentials::AuthorizedUser(serde_json::from_value(value)?));
        }
        Err(DriveError::UnrecognizedCredentials)
    }

    pub fn token_uri(&self) -> &str {
        match self {
            Credentials::ServiceAccount(key) => &key.token_uri,
            Credentials::AuthorizedUser(user) => &user.token_uri,
        }
    }

    /// Short name of the credential shape, for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Credentials::ServiceAccount(_) => "service_account",
            Credentials::AuthorizedUser(_) => "authorized_user",
        }
    }
}
