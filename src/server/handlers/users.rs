use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Map, Value};

use crate::docstore::ID_FIELD;
use crate::server::AppState;

const COLLECTION: &str = "users";

/// Lists every user document in insertion order.
pub async fn list_users(State(state): State<AppState>) -> Json<Value> {
    let users = state.backends.documents.find(COLLECTION, None);
    Json(json!({ "users": users }))
}

/// Fetches a single user by id.
pub async fn get_user(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.backends.documents.find_by_id(COLLECTION, &id) {
        Some(user) => Json(json!({ "user": user })).into_response(),
        None => user_not_found(),
    }
}

/// Creates a user document from the request body.
pub async fn create_user(
    State(state): State<AppState>,
    Json(fields): Json<Map<String, Value>>,
) -> impl IntoResponse {
    let user = state.backends.documents.create(COLLECTION, fields);
    (StatusCode::CREATED, Json(json!({ "user": user })))
}

/// Shallow-merges the request body into the user matching `id`.
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(fields): Json<Map<String, Value>>,
) -> Response {
    let outcome = state
        .backends
        .documents
        .update_one(COLLECTION, &id_query(&id), &fields);
    if outcome.modified_count == 0 {
        return user_not_found();
    }
    Json(json!({ "success": true })).into_response()
}

/// Removes the user matching `id`.
pub async fn delete_user(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let outcome = state.backends.documents.delete_one(COLLECTION, &id_query(&id));
    if outcome.deleted_count == 0 {
        return user_not_found();
    }
    StatusCode::NO_CONTENT.into_response()
}

fn id_query(id: &str) -> Map<String, Value> {
    let mut query = Map::new();
    query.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
    query
}

fn user_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "User not found" })),
    )
        .into_response()
}
