//! HTTP surface over [`MediaLibrary`]
//!
//! Read-only JSON endpoints for browsing plus raw file delivery. Scans are
//! blocking and run on the blocking thread pool.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use log::{debug, error, warn};
use serde::Serialize;
use serde_json::json;
use std::fmt;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::error::{ScanError, ScanErrorKind};
use crate::library::{LibraryStats, MediaLibrary};
use crate::models::{DirectoryEntry, MediaEntry};

/// Shared handler state
#[derive(Debug, Clone)]
pub struct AppState {
    /// Library every handler reads through
    pub library: Arc<MediaLibrary>,
}

/// Build the application router.
///
/// `/directories/` and `/photos/` with a trailing slash address the root,
/// the same as the bare routes.
pub fn router(library: MediaLibrary) -> Router {
    let state = AppState {
        library: Arc::new(library),
    };

    Router::new()
        .route("/directories", get(root_directories_handler))
        .route("/directories/", get(root_directories_handler))
        .route("/directories/{*path}", get(directories_handler))
        .route("/photos", get(root_photos_handler))
        .route("/photos/", get(root_photos_handler))
        .route("/photos/{*directory}", get(photos_handler))
        .route("/stats", get(stats_handler))
        .route("/media/{*path}", get(media_handler))
        .route("/thumbnail/{*path}", get(thumbnail_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Result returned by every handler
pub type ApiResult<T> = Result<T, ApiError>;

/// A failed request, rendered as `{"error": {"message", "status"}}`.
///
/// The message is what the client sees; details of the underlying
/// [`ScanError`] are logged and never sent.
#[derive(Debug)]
pub struct ApiError {
    /// Response status
    pub status: StatusCode,
    /// Client-facing message
    pub message: String,
}

impl ApiError {
    fn with_status(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// 500 for a scan or read the server could not complete
    pub fn internal(message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// 403 for a path outside the media root
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::FORBIDDEN, message)
    }

    /// 404 for a missing directory or file
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::NOT_FOUND, message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": {
                "message": self.message,
                "status": self.status.as_u16(),
            }
        }));

        (self.status, body).into_response()
    }
}

impl From<ScanError> for ApiError {
    fn from(err: ScanError) -> Self {
        match err.kind {
            ScanErrorKind::AccessDenied => {
                warn!("{}", err);
                Self::forbidden("Access denied")
            }
            ScanErrorKind::NotFound => {
                debug!("{}", err);
                Self::not_found("Not found")
            }
            _ => {
                error!("{}", err);
                Self::internal("Failed to read directory")
            }
        }
    }
}

/// Run a blocking library call off the async executor
async fn blocking<T, F>(state: &AppState, call: F) -> ApiResult<T>
where
    F: FnOnce(&MediaLibrary) -> Result<T, ScanError> + Send + 'static,
    T: Send + 'static,
{
    let library = Arc::clone(&state.library);
    tokio::task::spawn_blocking(move || call(&library))
        .await
        .map_err(|e| {
            error!("Scan task failed: {}", e);
            ApiError::internal("Failed to read directory")
        })?
        .map_err(ApiError::from)
}

/// Body of `GET /directories[/{path}]`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoriesResponse {
    /// Absolute media root
    pub root_path: String,
    /// Requested path as given, empty for the root
    pub path: String,
    pub directories: Vec<DirectoryEntry>,
    pub timestamp: DateTime<Utc>,
}

async fn root_directories_handler(State(state): State<AppState>) -> ApiResult<Json<DirectoriesResponse>> {
    list_directories(state, String::new()).await
}

async fn directories_handler(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> ApiResult<Json<DirectoriesResponse>> {
    list_directories(state, path).await
}

async fn list_directories(state: AppState, path: String) -> ApiResult<Json<DirectoriesResponse>> {
    let requested = path.clone();
    let directories = blocking(&state, move |library| library.directories(&requested)).await?;
    Ok(Json(DirectoriesResponse {
        root_path: state.library.root().to_string(),
        path,
        directories,
        timestamp: Utc::now(),
    }))
}

/// A media entry with the links a client needs to fetch it
#[derive(Debug, Serialize)]
pub struct PhotoItem {
    #[serde(flatten)]
    pub entry: MediaEntry,
    /// `/media/...` link, percent-encoded per segment
    pub url: String,
    /// `/thumbnail/...` link
    pub thumbnail: String,
}

impl From<MediaEntry> for PhotoItem {
    fn from(entry: MediaEntry) -> Self {
        Self {
            url: link("media", &entry.path),
            thumbnail: link("thumbnail", &entry.path),
            entry,
        }
    }
}

/// `totalCount` counts what the scan found within its work limit; when
/// `totalIsExact` is false it is a lower bound on the directory's real total.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotosResponse {
    pub photos: Vec<PhotoItem>,
    pub total_count: usize,
    pub has_more: bool,
    pub current_page: usize,
    pub offset: usize,
    pub limit: usize,
    pub total_is_exact: bool,
    pub directory: String,
}

/// Raw query pairs, in order. Keys may repeat.
type QueryPairs = Vec<(String, String)>;

async fn root_photos_handler(
    State(state): State<AppState>,
    Query(query): Query<QueryPairs>,
) -> ApiResult<Json<PhotosResponse>> {
    list_photos(state, String::new(), query).await
}

async fn photos_handler(
    State(state): State<AppState>,
    Path(directory): Path<String>,
    Query(query): Query<QueryPairs>,
) -> ApiResult<Json<PhotosResponse>> {
    list_photos(state, directory, query).await
}

async fn list_photos(state: AppState, directory: String, query: QueryPairs) -> ApiResult<Json<PhotosResponse>> {
    let recursive = parse_flag(values(&query, "recursive").first().copied());
    let request = state
        .library
        .page_request(&values(&query, "offset"), &values(&query, "limit"));

    let requested = directory.clone();
    let page = blocking(&state, move |library| {
        library.media_page(&requested, recursive, request)
    })
    .await?;

    let current_page = page.current_page();
    Ok(Json(PhotosResponse {
        photos: page.items.into_iter().map(PhotoItem::from).collect(),
        total_count: page.total_count,
        has_more: page.has_more,
        current_page,
        offset: page.offset,
        limit: page.limit,
        total_is_exact: page.total_is_exact,
        directory,
    }))
}

/// Body of `GET /stats`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    /// Absolute media root
    pub root_path: String,
    #[serde(flatten)]
    pub stats: LibraryStats,
    pub timestamp: DateTime<Utc>,
}

async fn stats_handler(State(state): State<AppState>) -> ApiResult<Json<StatsResponse>> {
    let stats = blocking(&state, |library| library.stats()).await?;
    Ok(Json(StatsResponse {
        root_path: state.library.root().to_string(),
        stats,
        timestamp: Utc::now(),
    }))
}

async fn media_handler(State(state): State<AppState>, Path(path): Path<String>) -> ApiResult<Response> {
    serve_file(state, path).await
}

// No thumbnails are generated; the original file is served instead.
async fn thumbnail_handler(State(state): State<AppState>, Path(path): Path<String>) -> ApiResult<Response> {
    serve_file(state, path).await
}

async fn serve_file(state: AppState, path: String) -> ApiResult<Response> {
    let file = blocking(&state, move |library| library.media_file(&path)).await?;

    let bytes = match tokio::fs::read(&file).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ApiError::not_found("Not found"));
        }
        Err(e) => {
            error!("Failed to read {:?}: {}", file, e);
            return Err(ApiError::internal("Failed to read file"));
        }
    };

    let content_type = mime_guess::from_path(&file).first_or_octet_stream();
    Ok(([(header::CONTENT_TYPE, content_type.to_string())], bytes).into_response())
}

/// Every value given for `key`, in query order
fn values<'a>(query: &'a [(String, String)], key: &str) -> Vec<&'a str> {
    query
        .iter()
        .filter(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
        .collect()
}

/// `true`, `1` and `yes` (any case) enable a flag; anything else disables it
fn parse_flag(raw: Option<&str>) -> bool {
    raw.map(|value| {
        matches!(
            value.trim().to_ascii_lowercase().as_str(),
            "true" | "1" | "yes"
        )
    })
    .unwrap_or(false)
}

/// Link to an endpoint for a root-relative path, one encoded segment at a time
fn link(endpoint: &str, relative: &str) -> String {
    let encoded: Vec<_> = relative.split('/').map(urlencoding::encode).collect();
    format!("/{}/{}", endpoint, encoded.join("/"))
}
