//! Render a form, upload it, and return its public link

use thiserror::Error;
use tracing::debug;

use mediform_core::{write_docx, FormError, FormValues, StyleProfile};
use mediform_drive::{public_view_url, DriveError};

use crate::config::DriveSettings;

/// File name the form is uploaded under
pub const UPLOAD_FILE_NAME: &str = "mediation_application_form.docx";

/// Failure of one render-and-upload run
#[derive(Error, Debug)]
pub enum PublishError {
    #[error("Failed to render form: {0}")]
    Render(#[from] FormError),

    /// Credentials could not be loaded
    #[error("Drive is not configured: {0}")]
    Configuration(DriveError),

    #[error("Upload failed: {0}")]
    Upload(DriveError),

    /// The scratch directory could not be created
    #[error("Temporary file error: {0}")]
    TempFile(#[from] std::io::Error),
}

/// Render `values`, upload the document, optionally share it, and return
/// the browser link
///
/// The document is written to a scratch directory that is removed on every
/// return path.
pub fn render_and_upload(
    style: &StyleProfile,
    drive: &DriveSettings,
    folder_id: Option<&str>,
    values: &FormValues,
) -> Result<String, PublishError> {
    let scratch = tempfile::Builder::new().prefix("mediform-").tempdir()?;
    let path = scratch.path().join(UPLOAD_FILE_NAME);
    write_docx(style, values, &path)?;
    debug!(path = %path.display(), "Rendered form for upload");

    let uploader = drive.uploader().map_err(PublishError::Configuration)?;
    let file_id = uploader
        .upload_file(&path, folder_id)
        .map_err(PublishError::Upload)?;
    if drive.make_public {
        uploader.make_public(&file_id).map_err(PublishError::Upload)?;
    }

    Ok(public_view_url(&file_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credentials_is_configuration_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let drive = DriveSettings {
            credentials: dir.path().join("token.json"),
            ..DriveSettings::default()
        };

        let err = render_and_upload(&StyleProfile::default(), &drive, None, &FormValues::default())
            .unwrap_err();
        assert!(matches!(
            err,
            PublishError::Configuration(DriveError::CredentialsNotFound(_))
        ));
    }
}
