//! OAuth2 access tokens for the Drive API
//!
//! Service accounts exchange a signed RS256 assertion for a token
//! (the `jwt-bearer` grant); authorized users trade their refresh token.
//! Tokens are cached until shortly before they expire.

use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::credentials::{AuthorizedUser, Credentials, ServiceAccountKey};
use crate::error::{DriveError, Result};

/// Per-file access to files the app created or opened
pub const DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive.file";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: u64 = 3600;
/// Tokens are refreshed this long before their reported expiry
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);
/// Token endpoint timeout until [`TokenProvider::with_timeout`] is called
const DEFAULT_TOKEN_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: u64,
    exp: u64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    /// `None` for a token of unknown lifetime, kept until Drive rejects it
    expires_at: Option<Instant>,
}

impl CachedToken {
    fn is_fresh(&self, now: Instant) -> bool {
        self.expires_at
            .map_or(true, |at| now + EXPIRY_MARGIN < at)
    }
}

/// Hands out access tokens for one set of credentials
pub struct TokenProvider {
    credentials: Credentials,
    signing_key: Option<EncodingKey>,
    client: Client,
    timeout: Duration,
    cache: Mutex<Option<CachedToken>>,
}

impl std::fmt::Debug for TokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenProvider")
            .field("kind", &self.credentials.kind())
            .field("token_uri", &self.credentials.token_uri())
            .finish_non_exhaustive()
    }
}

impl TokenProvider {
    /// Prepare a provider; a service account's private key is parsed here so
    /// a bad key fails before any upload starts
    pub fn new(credentials: Credentials, client: Client) -> Result<Self> {
        let signing_key = match &credentials {
            Credentials::ServiceAccount(key) => {
                Some(EncodingKey::from_rsa_pem(key.private_key.as_bytes())?)
            }
            Credentials::AuthorizedUser(_) => None,
        };
        let cache = match &credentials {
            Credentials::AuthorizedUser(AuthorizedUser {
                access_token: Some(token),
                ..
            }) => Some(CachedToken {
                value: token.clone(),
                expires_at: None,
            }),
            _ => None,
        };

        Ok(Self {
            credentials,
            signing_key,
            client,
            timeout: DEFAULT_TOKEN_TIMEOUT,
            cache: Mutex::new(cache),
        })
    }

    /// Set the timeout of token endpoint requests
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// A valid access token, fetching a new one when the cache is stale
    pub fn access_token(&self) -> Result<String> {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(token) = cache.as_ref().filter(|t| t.is_fresh(Instant::now())) {
            return Ok(token.value.clone());
        }

        let token = self.fetch()?;
        let value = token.value.clone();
        *cache = Some(token);
        Ok(value)
    }

    /// Drop the cached token so the next call fetches a new one
    pub fn invalidate(&self) {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        *cache = None;
    }

    fn fetch(&self) -> Result<CachedToken> {
        let requested = Instant::now();
        let response = match &self.credentials {
            Credentials::ServiceAccount(key) => {
                let assertion = self.sign_assertion(key)?;
                self.client
                    .post(&key.token_uri)
                    .timeout(self.timeout)
                    .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
                    .send()?
            }
            Credentials::AuthorizedUser(user) => {
                let client_id = user
                    .client_id
                    .as_deref()
                    .ok_or(DriveError::NotRefreshable("missing client_id"))?;
                let client_secret = user
                    .client_secret
                    .as_deref()
                    .ok_or(DriveError::NotRefreshable("missing client_secret"))?;
                self.client
                    .post(&user.token_uri)
                    .timeout(self.timeout)
                    .form(&[
                        ("grant_type", "refresh_token"),
                        ("refresh_token", user.refresh_token.as_str()),
                        ("client_id", client_id),
                        ("client_secret", client_secret),
                    ])
                    .send()?
            }
        };

        let status = response.status();
        if !status.is_success() {
            let message = response.text().unwrap_or_else(|_| "Unknown error".to_string());
            return Err(DriveError::TokenExchange {
                status: status.as_u16(),
                message,
            });
        }

        let body: TokenResponse = response.json()?;
        debug!(
            kind = self.credentials.kind(),
            expires_in = body.expires_in,
            "Obtained access token"
        );
        Ok(CachedToken {
            value: body.access_token,
            expires_at: body
                .expires_in
                .map(|secs| requested + Duration::from_secs(secs)),
        })
    }

    fn sign_assertion(&self, key: &ServiceAccountKey) -> Result<String> {
        let signing_key = self
            .signing_key
            .as_ref()
            .ok_or(DriveError::UnrecognizedCredentials)?;
        let iat = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        let claims = Claims {
            iss: &key.client_email,
            scope: DRIVE_SCOPE,
            aud: &key.token_uri,
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        };
        let mut header = Header::new(Algorithm::RS256);
        header.kid = key.private_key_id.clone();
        Ok(jsonwebtoken::encode(&header, &claims, signing_key)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn authorized_user(access_token: Option<&str>) -> Credentials {
        Credentials::AuthorizedUser(AuthorizedUser {
            access_token: access_token.map(str::to_string),
            refresh_token: "1//refresh".to_string(),
            token_uri: "http://127.0.0.1:9/token".to_string(),
            client_id: None,
            client_secret: None,
        })
    }

    #[test]
    fn test_stored_access_token_used_without_network() {
        let provider = TokenProvider::new(authorized_user(Some("ya29.cached")), Client::new()).unwrap();
        assert_eq!(provider.access_token().unwrap(), "ya29.cached");
        assert_eq!(provider.access_token().unwrap(), "ya29.cached");
    }

    #[test]
    fn test_refresh_requires_client_secret() {
        let provider = TokenProvider::new(authorized_user(None), Client::new()).unwrap();
        let err = provider.access_token().unwrap_err();
        assert!(matches!(err, DriveError::NotRefreshable("missing client_id")));
    }

    #[test]
    fn test_invalidate_drops_stored_token() {
        let provider = TokenProvider::new(authorized_user(Some("ya29.stale")), Client::new()).unwrap();
        provider.invalidate();
        assert!(matches!(
            provider.access_token(),
            Err(DriveError::NotRefreshable(_))
        ));
    }

    #[test]
    fn test_timeout_builder() {
        let provider = TokenProvider::new(authorized_user(None), Client::new()).unwrap();
        assert_eq!(provider.timeout(), Duration::from_secs(30));
        let provider = provider.with_timeout(Duration::from_millis(250));
        assert_eq!(provider.timeout(), Duration::from_millis(250));
    }

    #[test]
    fn test_bad_private_key_rejected_up_front() {
        let creds = Credentials::ServiceAccount(ServiceAccountKey {
            client_email: "uploader@demo.iam.gserviceaccount.com".to_string(),
            private_key: "not a pem key".to_string(),
            private_key_id: None,
            token_uri: "https://oauth2.googleapis.com/token".to_string(),
        });
        let err = TokenProvider::new(creds, Client::new()).unwrap_err();
        assert!(matches!(err, DriveError::Jwt(_)));
    }

    #[test]
    fn test_token_freshness() {
        let now = Instant::now();
        let unknown = CachedToken {
            value: "t".into(),
            expires_at: None,
        };
        assert!(unknown.is_fresh(now));

        let soon = CachedToken {
            value: "t".into(),
            expires_at: Some(now + Duration::from_secs(30)),
        };
        assert!(!soon.is_fresh(now));

        let later = CachedToken {
            value: "t".into(),
            expires_at: Some(now + Duration::from_secs(3599)),
        };
        assert!(later.is_fresh(now));
    }
}
