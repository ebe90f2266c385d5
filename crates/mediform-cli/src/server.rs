//! HTTP endpoint for generating forms
//!
//! `POST /generate-docx` takes the form fields as a JSON object, renders the
//! document, uploads it to Drive and answers with the public link. Requests
//! must carry the base64-encoded API password in `X-API-KEY`.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use serde_json::json;
use tracing::{debug, error, info, warn};

use mediform_core::{FormFields, FormValues};

use crate::config::{Settings, API_PASSWORD_ENV};
use crate::publish::{render_and_upload, PublishError};

/// Header carrying the client's API key
pub const API_KEY_HEADER: &str = "x-api-key";

/// Shared state of the request handlers
#[derive(Clone)]
pub struct AppState {
    settings: Arc<Settings>,
    api_key: Arc<str>,
}

impl AppState {
    /// Fails when no API password is configured
    pub fn new(settings: Settings) -> Result<Self> {
        let api_key = settings.server.api_key().with_context(|| {
            format!(
                "No API password configured; set server.api_password or {}",
                API_PASSWORD_ENV
            )
        })?;
        Ok(Self {
            settings: Arc::new(settings),
            api_key: Arc::from(api_key),
        })
    }
}

#[derive(Debug, Serialize)]
struct GenerateResponse {
    url: String,
}

/// Handler failures, each mapped to a status and a stable error code
#[derive(Debug)]
enum ApiError {
    Unauthorized,
    InvalidForm(String),
    Publish(PublishError),
    /// The blocking render task panicked or was cancelled
    Internal(String),
}

impl From<PublishError> for ApiError {
    fn from(err: PublishError) -> Self {
        ApiError::Publish(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, json!({"error": "unauthorized"})),
            ApiError::InvalidForm(detail) => (
                StatusCode::BAD_REQUEST,
                json!({"error": "invalid_form", "detail": detail}),
            ),
            ApiError::Publish(err) => {
                error!(error = %err, "Form generation failed");
                let code = match err {
                    PublishError::Render(_) | PublishError::TempFile(_) => "render_failed",
                    PublishError::Configuration(_) => "configuration_error",
                    PublishError::Upload(_) => "upload_failed",
                };
                (StatusCode::INTERNAL_SERVER_ERROR, json!({"error": code}))
            }
            ApiError::Internal(detail) => {
                error!(%detail, "Form generation task failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({"error": "internal_error"}),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/generate-docx", post(generate_docx))
        .with_state(state)
}

/// Bind `addr` and serve until the process is stopped
pub async fn serve(settings: Settings, addr: &str) -> Result<()> {
    let state = AppState::new(settings)?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Starting mediform server on {}", addr);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

/// Compare in time independent of where the keys first differ
fn keys_match(provided: &[u8], expected: &[u8]) -> bool {
    provided.len() == expected.len()
        && provided
            .iter()
            .zip(expected)
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({"status": "ok", "version": env!("CARGO_PKG_VERSION")}))
}

async fn generate_docx(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<GenerateResponse>, ApiError> {
    let provided = headers.get(API_KEY_HEADER).map(|v| v.as_bytes());
    if !provided.is_some_and(|key| keys_match(key, state.api_key.as_bytes())) {
        warn!("Rejected request with missing or wrong API key");
        return Err(ApiError::Unauthorized);
    }

    // An empty or `null` body renders a blank form
    let fields = if body.is_empty() {
        FormFields::default()
    } else {
        serde_json::from_slice::<Option<FormFields>>(&body)
            .map_err(|e| ApiError::InvalidForm(e.to_string()))?
            .unwrap_or_default()
    };
    let values = FormValues::try_new(fields).map_err(|e| ApiError::InvalidForm(e.to_string()))?;
    debug!(applicant = values.applicant().name(), "Generating form");

    let settings = Arc::clone(&state.settings);
    let url = tokio::task::spawn_blocking(move || {
        render_and_upload(
            &settings.style,
            &settings.drive,
            settings.drive.folder_id.as_deref(),
            &values,
        )
    })
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))??;

    info!(%url, "Generated form");
    Ok(Json(GenerateResponse { url }))
}
