//! HTTP surface.
//!
//! Routes dispatch one-to-one to the components and translate their
//! outcomes into status codes. Error bodies always have the shape
//! `{"detail": ...}`.
//!
//! The record store sits behind a single `tokio::sync::Mutex`. The fetch
//! handler holds the lock across both the store replacement and the two
//! file exports so concurrent fetches cannot interleave store state and
//! export artifacts. Uploads read file bytes without the lock, so an upload
//! racing a fetch sees whatever file content exists at open time.

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tracing::{error, info};

use crate::export::{export_records, ExportFormat};
use crate::fetch::{FetchError, UpstreamClient};
use crate::store::{DataStore, Record, StoreError};
use crate::upload::{DocumentStore, UploadError};

/// Shared state for all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Mutex<DataStore>>,
    pub fetcher: UpstreamClient,
    pub uploader: Arc<dyn DocumentStore>,
    pub export_dir: PathBuf,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/fetch-data", get(fetch_data))
        .route("/upload-file", post(upload_file))
        .route("/data", get(list_items).post(create_item))
        .route(
            "/data/{item_id}",
            get(get_item).put(update_item).delete(delete_item),
        )
        .with_state(state)
}

/// Error surfaced to HTTP callers as a status code plus `{"detail": ...}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: Value,
}

impl ApiError {
    fn new(status: StatusCode, detail: impl Into<Value>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        let status = match err {
            StoreError::NotFound => StatusCode::NOT_FOUND,
            StoreError::MissingId | StoreError::DuplicateId => StatusCode::BAD_REQUEST,
        };
        ApiError::new(status, err.to_string())
    }
}

impl From<FetchError> for ApiError {
    fn from(err: FetchError) -> Self {
        match err {
            // Echo the upstream's own status and body.
            FetchError::Upstream { status, detail } => ApiError {
                status: StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
                detail,
            },
            other => ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
        }
    }
}

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        ApiError::new(StatusCode::BAD_GATEWAY, err.to_string())
    }
}

async fn healthz() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// GET /fetch-data: pull the full record set from upstream, replace the
/// store, and rewrite both tabular exports.
async fn fetch_data(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let records = state.fetcher.fetch_records().await?;

    let mut store = state.store.lock().await;
    store.replace_all(records);
    for format in ExportFormat::ALL {
        export_records(store.list(), format, &state.export_dir).map_err(|e| {
            error!(error = %e, format = %format, "Export failed after fetch");
            ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?;
    }

    info!(count = store.len(), "Fetched upstream data and wrote exports");
    Ok(Json(json!({ "message": "Data fetched and saved locally" })))
}

#[derive(Deserialize)]
struct UploadQuery {
    file_format: String,
}

/// POST /upload-file?file_format=csv|xlsx: push the previously exported
/// file to SharePoint.
async fn upload_file(
    State(state): State<AppState>,
    Query(query): Query<UploadQuery>,
) -> Result<Json<Value>, ApiError> {
    let format: ExportFormat = query
        .file_format
        .parse()
        .map_err(|_| ApiError::new(StatusCode::BAD_REQUEST, "Invalid file format"))?;

    let path = state.export_dir.join(format.file_name());
    let content = tokio::fs::read(&path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ApiError::new(
                StatusCode::NOT_FOUND,
                format!("No exported {format} file found; run /fetch-data first"),
            )
        } else {
            error!(error = %e, path = %path.display(), "Failed to read export file");
            ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    })?;

    state.uploader.upload_file(format.file_name(), content).await?;
    Ok(Json(
        json!({ "message": format!("{format} file uploaded to SharePoint") }),
    ))
}

/// GET /data: all records, in insertion order.
async fn list_items(State(state): State<AppState>) -> Json<Vec<Record>> {
    let store = state.store.lock().await;
    Json(store.list().to_vec())
}

/// GET /data/{item_id}
async fn get_item(
    State(state): State<AppState>,
    Path(item_id): Path<i64>,
) -> Result<Json<Record>, ApiError> {
    let store = state.store.lock().await;
    let record = store.get(item_id)?;
    Ok(Json(record.clone()))
}

/// POST /data: append a record with a fresh integer `id`.
async fn create_item(
    State(state): State<AppState>,
    Json(record): Json<Record>,
) -> Result<Json<Record>, ApiError> {
    let mut store = state.store.lock().await;
    let created = store.create(record)?;
    Ok(Json(created))
}

/// PUT /data/{item_id}: replace the record at that id wholesale.
async fn update_item(
    State(state): State<AppState>,
    Path(item_id): Path<i64>,
    Json(record): Json<Record>,
) -> Result<Json<Record>, ApiError> {
    let mut store = state.store.lock().await;
    let updated = store.update(item_id, record)?;
    Ok(Json(updated))
}

/// DELETE /data/{item_id}: remove and return the record.
async fn delete_item(
    State(state): State<AppState>,
    Path(item_id): Path<i64>,
) -> Result<Json<Record>, ApiError> {
    let mut store = state.store.lock().await;
    let removed = store.delete(item_id)?;
    Ok(Json(removed))
}
