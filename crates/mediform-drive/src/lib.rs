//! # mediform-drive
//!
//! Uploads generated forms to Google Drive and shares them by link.
//!
//! Credentials come from a JSON file, either a service account key or an
//! authorized-user token with a refresh token. Requests are retried with
//! exponential backoff on transport errors, HTTP 429 and 5xx.
//!
//! ## Example
//!
//! ```no_run
//! use mediform_drive::{public_view_url, DriveUploader};
//!
//! let uploader = DriveUploader::new("credentials.json")?;
//! let id = uploader.upload_file("form.docx", Some("1FolderId"))?;
//! uploader.make_public(&id)?;
//! println!("{}", public_view_url(&id));
//! # Ok::<(), mediform_drive::DriveError>(())
//! ```

pub mod auth;
pub mod client;
pub mod credentials;
pub mod error;
pub mod retry;

pub use auth::{TokenProvider, DRIVE_SCOPE};
pub use client::{public_view_url, DriveUploader, DOCX_MIME_TYPE};
pub use credentials::{AuthorizedUser, Credentials, ServiceAccountKey, DEFAULT_TOKEN_URI};
pub use error::{DriveError, Result};
pub use retry::{CancellationToken, RetryPolicy};
