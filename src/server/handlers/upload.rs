use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use bytes::Bytes;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::StratusError;
use crate::server::handlers::ApiError;
use crate::server::AppState;

/// Body stored when the upload request carries no inline content.
const DEFAULT_CONTENT: &str = "placeholder file content";

/// Body for `POST /v1/upload`.
#[derive(Debug, Deserialize)]
pub struct UploadRequest {
    /// Original filename; becomes the tail of the object key.
    pub filename: Option<String>,
    /// MIME type recorded with the object.
    pub content_type: Option<String>,
    /// Optional inline file content.
    pub content: Option<String>,
}

/// Query string for `GET /v1/upload`.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    /// Only keys starting with this prefix are listed.
    #[serde(default)]
    pub prefix: String,
}

/// Stores an upload under a timestamped `uploads/` key.
pub async fn upload_file(
    State(state): State<AppState>,
    Json(request): Json<UploadRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (Some(filename), Some(content_type)) = (request.filename, request.content_type) else {
        return Err(ApiError(StratusError::Validation(
            "filename and content_type are required".to_string(),
        )));
    };

    let key = format!("uploads/{}-{}", Utc::now().timestamp_millis(), filename);
    let body = Bytes::from(request.content.unwrap_or_else(|| DEFAULT_CONTENT.to_string()));
    let outcome = state
        .backends
        .objects
        .put(&state.config.objects.bucket, &key, body, &content_type);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "url": outcome.location,
            "key": outcome.key,
            "bucket": outcome.bucket,
        })),
    ))
}

/// Returns stored metadata for an object key.
pub async fn file_metadata(State(state): State<AppState>, Path(key): Path<String>) -> Response {
    match state.backends.objects.get(&state.config.objects.bucket, &key) {
        Ok(object) => Json(json!({
            "content_type": object.content_type,
            "last_modified": object.last_modified,
            "size": object.size,
            "etag": object.etag,
        }))
        .into_response(),
        Err(StratusError::ObjectNotFound { .. }) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "File not found" })),
        )
            .into_response(),
        Err(err) => ApiError(err).into_response(),
    }
}

/// Deletes an object key. Always succeeds; deleting an absent key still
/// reports the key as deleted.
pub async fn delete_file(State(state): State<AppState>, Path(key): Path<String>) -> Json<Value> {
    state
        .backends
        .objects
        .delete(&state.config.objects.bucket, &key);
    Json(json!({ "deleted": true, "key": key }))
}

/// Lists stored objects, optionally filtered by key prefix.
pub async fn list_files(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Json<Value> {
    let files: Vec<Value> = state
        .backends
        .objects
        .list(&state.config.objects.bucket, &params.prefix)
        .into_iter()
        .map(|f| {
            json!({
                "key": f.key,
                "size": f.size,
                "last_modified": f.last_modified,
                "etag": f.etag,
            })
        })
        .collect();
    Json(json!({ "files": files }))
}
