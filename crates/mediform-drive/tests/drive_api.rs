//! Upload flow against a local stand-in for the token and Drive endpoints
//!
//! The stand-in is an axum app on a loopback port. It accepts only the
//! token its `/token` route hands out, can be scripted to fail the next
//! session requests with given statuses, and records what it receives.

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{post, put};
use axum::{Form, Json, Router};
use serde_json::{json, Value};
use tempfile::TempDir;

use mediform_drive::{
    AuthorizedUser, Credentials, DriveError, DriveUploader, RetryPolicy, DOCX_MIME_TYPE,
};

const FRESH_TOKEN: &str = "ya29.fresh";
const FILE_ID: &str = "1FiLeId";

#[derive(Default)]
struct FakeDrive {
    base_url: String,
    token_requests: AtomicUsize,
    session_requests: AtomicUsize,
    upload_requests: AtomicUsize,
    /// Statuses returned by the next session requests, in order
    session_failures: Mutex<VecDeque<u16>>,
    omit_location: AtomicBool,
    token_forms: Mutex<Vec<HashMap<String, String>>>,
    session_metadata: Mutex<Vec<Value>>,
    session_headers: Mutex<Vec<(String, String)>>,
    uploaded: Mutex<Vec<u8>>,
    permissions: Mutex<Vec<(String, Value)>>,
}

type Shared = Arc<FakeDrive>;

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        == Some(&*format!("Bearer {}", FRESH_TOKEN))
}

fn header_value(headers: &HeaderMap, name: &str) -> String {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

async fn token(State(fake): State<Shared>, Form(form): Form<HashMap<String, String>>) -> Json<Value> {
    fake.token_requests.fetch_add(1, Ordering::SeqCst);
    fake.token_forms.lock().unwrap().push(form);
    Json(json!({"access_token": FRESH_TOKEN, "expires_in": 3600, "token_type": "Bearer"}))
}

async fn open_session(
    State(fake): State<Shared>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    Json(metadata): Json<Value>,
) -> Response {
    fake.session_requests.fetch_add(1, Ordering::SeqCst);
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if let Some(status) = fake.session_failures.lock().unwrap().pop_front() {
        return StatusCode::from_u16(status).unwrap().into_response();
    }
    assert_eq!(query.get("uploadType").map(String::as_str), Some("resumable"));

    fake.session_metadata.lock().unwrap().push(metadata);
    fake.session_headers.lock().unwrap().push((
        header_value(&headers, "x-upload-content-type"),
        header_value(&headers, "x-upload-content-length"),
    ));
    if fake.omit_location.load(Ordering::SeqCst) {
        return StatusCode::OK.into_response();
    }
    let location = format!("{}/session/abc123", fake.base_url);
    (StatusCode::OK, [(header::LOCATION, location)]).into_response()
}

async fn upload(
    State(fake): State<Shared>,
    Path(session): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    fake.upload_requests.fetch_add(1, Ordering::SeqCst);
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    assert_eq!(session, "abc123");
    assert_eq!(header_value(&headers, "content-type"), DOCX_MIME_TYPE);
    *fake.uploaded.lock().unwrap() = body.to_vec();
    Json(json!({"id": FILE_ID})).into_response()
}

async fn permission(
    State(fake): State<Shared>,
    Path(file_id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    fake.permissions.lock().unwrap().push((file_id, body));
    Json(json!({"id": "anyoneWithLink"})).into_response()
}

/// Start the stand-in on its own runtime thread
fn start(configure: impl FnOnce(&mut FakeDrive)) -> Shared {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.set_nonblocking(true).unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();

    let mut fake = FakeDrive {
        base_url: format!("http://{}", addr),
        ..FakeDrive::default()
    };
    configure(&mut fake);
    let fake = Arc::new(fake);

    let app = Router::new()
        .route("/token", post(token))
        .route("/upload/files", post(open_session))
        .route("/session/:id", put(upload))
        .route("/api/files/:id/permissions", post(permission))
        .with_state(Arc::clone(&fake));

    std::thread::spawn(move || {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::from_std(listener).unwrap();
            axum::serve(listener, app).await.unwrap();
        });
    });
    fake
}

/// An uploader holding an already expired access token
fn uploader(fake: &FakeDrive) -> DriveUploader {
    let credentials = Credentials::AuthorizedUser(AuthorizedUser {
        access_token: Some("ya29.expired".to_string()),
        refresh_token: "1//refresh".to_string(),
        token_uri: format!("{}/token", fake.base_url),
        client_id: Some("client-id".to_string()),
        client_secret: Some("client-secret".to_string()),
    });
    DriveUploader::from_credentials(credentials)
        .unwrap()
        .with_endpoints(
            format!("{}/upload", fake.base_url),
            format!("{}/api", fake.base_url),
        )
        .with_timeout(Duration::from_secs(5))
        .with_retry(RetryPolicy {
            initial_backoff: Duration::ZERO,
            ..RetryPolicy::default()
        })
}

fn form_file(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("form.docx");
    std::fs::write(&path, b"PK\x03\x04 form bytes").unwrap();
    path
}

#[test]
fn test_upload_refreshes_token_retries_and_returns_id() {
    let fake = start(|f| {
        f.session_failures = Mutex::new(VecDeque::from([503]));
    });
    let dir = TempDir::new().unwrap();
    let path = form_file(&dir);

    let id = uploader(&fake).upload_file(&path, Some("folder-9")).unwrap();
    assert_eq!(id, FILE_ID);

    // 401 with the expired token, 503 once, then success
    assert_eq!(fake.token_requests.load(Ordering::SeqCst), 1);
    assert_eq!(fake.session_requests.load(Ordering::SeqCst), 3);
    assert_eq!(fake.upload_requests.load(Ordering::SeqCst), 1);

    let forms = fake.token_forms.lock().unwrap();
    assert_eq!(forms[0]["grant_type"], "refresh_token");
    assert_eq!(forms[0]["refresh_token"], "1//refresh");
    assert_eq!(forms[0]["client_id"], "client-id");

    assert_eq!(
        fake.session_metadata.lock().unwrap()[0],
        json!({"name": "form.docx", "parents": ["folder-9"]})
    );
    assert_eq!(
        fake.session_headers.lock().unwrap()[0],
        (DOCX_MIME_TYPE.to_string(), "15".to_string())
    );
    assert_eq!(*fake.uploaded.lock().unwrap(), b"PK\x03\x04 form bytes".to_vec());
}

#[test]
fn test_make_public_grants_reader_to_anyone() {
    let fake = start(|_| {});
    let uploader = uploader(&fake);

    uploader.make_public(FILE_ID).unwrap();
    uploader.make_public(FILE_ID).unwrap();

    // The refreshed token is cached for the second call
    assert_eq!(fake.token_requests.load(Ordering::SeqCst), 1);
    let permissions = fake.permissions.lock().unwrap();
    assert_eq!(permissions.len(), 2);
    assert_eq!(permissions[0].0, FILE_ID);
    assert_eq!(permissions[0].1, json!({"role": "reader", "type": "anyone"}));
}

#[test]
fn test_missing_location_is_an_error() {
    let fake = start(|f| {
        f.omit_location = AtomicBool::new(true);
    });
    let dir = TempDir::new().unwrap();

    let err = uploader(&fake).upload_file(form_file(&dir), None).unwrap_err();
    assert!(matches!(err, DriveError::MissingUploadLocation));
    assert_eq!(fake.upload_requests.load(Ordering::SeqCst), 0);
    assert_eq!(
        fake.session_metadata.lock().unwrap()[0],
        json!({"name": "form.docx"})
    );
}

#[test]
fn test_persistent_unavailability_exhausts_retries() {
    let fake = start(|f| {
        f.session_failures = Mutex::new(VecDeque::from([503, 503, 503, 503]));
    });
    let dir = TempDir::new().unwrap();

    let err = uploader(&fake).upload_file(form_file(&dir), None).unwrap_err();
    assert!(matches!(err, DriveError::ServerError { status: 503, .. }));
    // One 401 and three 503s: the 401 retry sits inside the first attempt
    assert_eq!(fake.session_requests.load(Ordering::SeqCst), 4);
    assert_eq!(fake.upload_requests.load(Ordering::SeqCst), 0);
}

#[test]
fn test_client_errors_are_not_retried() {
    let fake = start(|f| {
        f.session_failures = Mutex::new(VecDeque::from([404]));
    });
    let dir = TempDir::new().unwrap();

    let err = uploader(&fake).upload_file(form_file(&dir), None).unwrap_err();
    assert!(matches!(err, DriveError::ServerError { status: 404, .. }));
    assert_eq!(fake.session_requests.load(Ordering::SeqCst), 2);
}
