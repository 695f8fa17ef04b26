use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Map, Value};

use crate::docstore::ID_FIELD;
use crate::server::AppState;

const COLLECTION: &str = "devices";
const USER_ID_FIELD: &str = "user_id";
const REGISTERED_AT_FIELD: &str = "registered_at";

/// Lists the devices registered to a user.
pub async fn list_devices(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Json<Value> {
    let mut query = Map::new();
    query.insert(USER_ID_FIELD.to_string(), Value::String(user_id));
    let devices = state.backends.documents.find(COLLECTION, Some(&query));
    Json(json!({ "devices": devices }))
}

/// Fetches one of a user's devices by id.
pub async fn get_device(
    State(state): State<AppState>,
    Path((user_id, device_id)): Path<(String, String)>,
) -> Response {
    match state
        .backends
        .documents
        .find_one(COLLECTION, &device_query(&user_id, &device_id))
    {
        Some(device) => Json(json!({ "device": device })).into_response(),
        None => device_not_found(),
    }
}

/// Registers a device under a user. The route injects the owning `user_id`
/// and a `registered_at` timestamp, overriding any caller-supplied values.
pub async fn create_device(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(mut fields): Json<Map<String, Value>>,
) -> impl IntoResponse {
    fields.insert(USER_ID_FIELD.to_string(), Value::String(user_id));
    fields.insert(
        REGISTERED_AT_FIELD.to_string(),
        Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
    );
    let device = state.backends.documents.create(COLLECTION, fields);
    (StatusCode::CREATED, Json(json!({ "device": device })))
}

/// Shallow-merges the request body into one of a user's devices.
pub async fn update_device(
    State(state): State<AppState>,
    Path((user_id, device_id)): Path<(String, String)>,
    Json(fields): Json<Map<String, Value>>,
) -> Response {
    let outcome = state.backends.documents.update_one(
        COLLECTION,
        &device_query(&user_id, &device_id),
        &fields,
    );
    if outcome.modified_count == 0 {
        return device_not_found();
    }
    Json(json!({ "success": true })).into_response()
}

/// Removes one of a user's devices.
pub async fn delete_device(
    State(state): State<AppState>,
    Path((user_id, device_id)): Path<(String, String)>,
) -> Response {
    let outcome = state
        .backends
        .documents
        .delete_one(COLLECTION, &device_query(&user_id, &device_id));
    if outcome.deleted_count == 0 {
        return device_not_found();
    }
    StatusCode::NO_CONTENT.into_response()
}

/// Device lookups are always scoped by owner, so a device id from another
/// user's fleet reads as absent rather than leaking across users.
fn device_query(user_id: &str, device_id: &str) -> Map<String, Value> {
    let mut query = Map::new();
    query.insert(ID_FIELD.to_string(), Value::String(device_id.to_string()));
    query.insert(
        USER_ID_FIELD.to_string(),
        Value::String(user_id.to_string()),
    );
    query
}

fn device_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Device not found" })),
    )
        .into_response()
}
