use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::error::StratusError;
use crate::search::{SearchOutcome, SearchQuery};
use crate::server::handlers::ApiError;
use crate::server::AppState;

/// Query string for `GET /v1/search`.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    /// Text matched against the `content` field of indexed documents.
    pub q: Option<String>,
    /// Index to search (default `default`).
    pub index: Option<String>,
    /// Maximum number of hits returned (default 10).
    pub limit: Option<usize>,
}

/// Runs a match query against the `content` field.
pub async fn run_search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchOutcome>, ApiError> {
    let Some(q) = params.q else {
        return Err(ApiError(StratusError::Validation(
            "Query parameter \"q\" is required".to_string(),
        )));
    };
    let index = params.index.as_deref().unwrap_or("default");
    let query = SearchQuery::Match {
        field: "content".to_string(),
        text: q,
    };
    let size = params.limit.unwrap_or(state.config.search.default_size);
    let outcome = state.backends.search.search(index, Some(&query), Some(size));
    Ok(Json(outcome))
}

/// Indexes a document, honoring a caller-supplied `_id` field.
pub async fn index_document(
    State(state): State<AppState>,
    Path(index): Path<String>,
    Json(source): Json<Map<String, Value>>,
) -> impl IntoResponse {
    let id = source.get("_id").and_then(Value::as_str).map(str::to_string);
    let outcome = state.backends.search.index(&index, source, id.as_deref());
    (StatusCode::CREATED, Json(outcome))
}

/// Deletes an indexed document by id.
pub async fn delete_document(
    State(state): State<AppState>,
    Path((index, id)): Path<(String, String)>,
) -> Response {
    match state.backends.search.delete(&index, &id) {
        Ok(outcome) => Json(outcome).into_response(),
        Err(StratusError::DocumentNotFound { .. }) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Document not found" })),
        )
            .into_response(),
        Err(err) => ApiError(err).into_response(),
    }
}
