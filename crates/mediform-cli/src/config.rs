//! Configuration Settings
//!
//! `mediform.toml` holds the document style, the Drive upload settings and
//! the HTTP server settings. Every table and key is optional.
//!
//! ```toml
//! [style]
//! font_name = "Times New Roman"
//!
//! [drive]
//! credentials = "token.json"
//! folder_id = "1AbCdEf"
//! make_public = true
//!
//! [server]
//! addr = "0.0.0.0:8080"
//! api_password = "change me"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use mediform_core::StyleProfile;
use mediform_drive::{DriveUploader, RetryPolicy};

/// Config file looked up in the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "mediform.toml";

/// Environment variable that overrides `server.api_password`
pub const API_PASSWORD_ENV: &str = "MEDIFORM_API_PASSWORD";

/// Top-level settings structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    /// Document styling
    pub style: StyleProfile,
    /// Drive upload settings
    pub drive: DriveSettings,
    /// HTTP server settings
    pub server: ServerSettings,
}

impl Settings {
    /// Parse settings from a TOML string
    pub fn from_toml_str(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Load settings from `path`, or from [`DEFAULT_CONFIG_FILE`] if it
    /// exists, falling back to defaults. The API password environment
    /// variable is applied last.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = match path {
            Some(path) => Self::read(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::read(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };

        if let Ok(password) = std::env::var(API_PASSWORD_ENV) {
            settings.server.api_password = Some(password);
        }
        Ok(settings)
    }

    fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))
    }
}

/// Drive upload settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveSettings {
    /// Credentials JSON (service account key or OAuth token)
    pub credentials: PathBuf,
    /// Destination folder; the Drive root when unset
    pub folder_id: Option<String>,
    /// Share uploads with anyone holding the link
    pub make_public: bool,
    pub timeout_secs: u64,
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub backoff_multiplier: f64,
    pub max_backoff_ms: u64,
}

impl Default for DriveSettings {
    fn default() -> Self {
        let retry = RetryPolicy::default();
        Self {
            credentials: PathBuf::from("token.json"),
            folder_id: None,
            make_public: true,
            timeout_secs: 30,
            max_attempts: retry.max_attempts,
            initial_backoff_ms: retry.initial_backoff.as_millis() as u64,
            backoff_multiplier: retry.multiplier,
            max_backoff_ms: retry.max_backoff.as_millis() as u64,
        }
    }
}

impl DriveSettings {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            initial_backoff: Duration::from_millis(self.initial_backoff_ms),
            multiplier: self.backoff_multiplier,
            max_backoff: Duration::from_millis(self.max_backoff_ms),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Build an uploader from these settings
    pub fn uploader(&self) -> mediform_drive::Result<DriveUploader> {
        Ok(DriveUploader::new(&self.credentials)?
            .with_timeout(self.timeout())
            .with_retry(self.retry_policy()))
    }
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Listen address
    pub addr: String,
    /// Shared secret; clients send its base64 encoding as `X-API-KEY`
    pub api_password: Option<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0:8080".to_string(),
            api_password: None,
        }
    }
}

impl ServerSettings {
    /// Expected `X-API-KEY` header value, if a password is configured
    pub fn api_key(&self) -> Option<String> {
        self.api_password
            .as_deref()
            .filter(|p| !p.is_empty())
            .map(|p| STANDARD.encode(p.as_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let settings = Settings::from_toml_str("").unwrap();
        assert_eq!(settings.style, StyleProfile::default());
        assert_eq!(settings.drive.credentials, PathBuf::from("token.json"));
        assert!(settings.drive.make_public);
        assert_eq!(settings.drive.retry_policy(), RetryPolicy::default());
        assert_eq!(settings.drive.timeout(), Duration::from_secs(30));
        assert_eq!(settings.server.addr, "0.0.0.0:8080");
        assert!(settings.server.api_key().is_none());
    }

    #[test]
    fn test_partial_config() {
        let settings = Settings::from_toml_str(
            r#"
[style]
margin_left_in = 0.5

[drive]
credentials = "/etc/mediform/sa.json"
folder_id = "1Folder"
max_attempts = 5

[server]
addr = "127.0.0.1:3000"
"#,
        )
        .unwrap();

        assert_eq!(settings.style.margin_left_in, 0.5);
        assert_eq!(settings.style.font_name, "Times New Roman");
        assert_eq!(settings.drive.folder_id.as_deref(), Some("1Folder"));
        assert_eq!(settings.drive.retry_policy().max_attempts, 5);
        assert_eq!(
            settings.drive.retry_policy().initial_backoff,
            Duration::from_millis(500)
        );
        assert_eq!(settings.server.addr, "127.0.0.1:3000");
    }

    #[test]
    fn test_api_key_is_base64_of_password() {
        let server = ServerSettings {
            api_password: Some("secret".to_string()),
            ..ServerSettings::default()
        };
        assert_eq!(server.api_key().as_deref(), Some("c2VjcmV0"));

        let empty = ServerSettings {
            api_password: Some(String::new()),
            ..ServerSettings::default()
        };
        assert!(empty.api_key().is_none());
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(Settings::from_toml_str("[drive]\nmax_attempts = \"many\"").is_err());
    }

    #[test]
    fn test_load_explicit_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[drive]\nmake_public = false\n").unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert!(!settings.drive.make_public);

        let err = Settings::load(Some(&dir.path().join("missing.toml"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read config"));
    }
}
