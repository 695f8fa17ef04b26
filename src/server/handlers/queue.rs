use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::error::StratusError;
use crate::server::handlers::ApiError;
use crate::server::AppState;

/// Body for `POST /v1/queue/send`.
#[derive(Debug, Deserialize)]
pub struct SendRequest {
    /// Queue to append to; created on first send.
    pub queue_url: Option<String>,
    /// Arbitrary JSON payload; serialized for storage and parsed back on
    /// receive.
    pub message: Option<Value>,
    /// Caller-supplied message attributes, stored with the queued message.
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

/// Query string for `GET /v1/queue/receive`.
#[derive(Debug, Deserialize)]
pub struct ReceiveParams {
    pub queue_url: Option<String>,
    /// Upper bound on returned messages (default 1).
    pub max_messages: Option<usize>,
}

/// Query string for `DELETE /v1/queue/message`.
#[derive(Debug, Deserialize)]
pub struct DeleteParams {
    pub queue_url: Option<String>,
    pub receipt_handle: Option<String>,
}

/// Appends a message to a queue.
pub async fn send_message(
    State(state): State<AppState>,
    Json(request): Json<SendRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (queue_url, message) = match (request.queue_url, request.message) {
        (Some(queue_url), Some(message)) if !queue_url.is_empty() => (queue_url, message),
        _ => {
            return Err(ApiError(StratusError::Validation(
                "queue_url and message are required".to_string(),
            )))
        }
    };

    let body = serde_json::to_string(&message).map_err(StratusError::from)?;
    let receipt = state
        .backends
        .queue
        .send(&queue_url, &body, request.attributes)?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message_id": receipt.message_id,
            "md5": receipt.body_md5,
        })),
    ))
}

/// Peeks up to `max_messages` messages from the front of a queue.
pub async fn receive_messages(
    State(state): State<AppState>,
    Query(params): Query<ReceiveParams>,
) -> Result<Json<Value>, ApiError> {
    let Some(queue_url) = params.queue_url else {
        return Err(ApiError(StratusError::Validation(
            "queue_url is required".to_string(),
        )));
    };

    let messages: Vec<Value> = state
        .backends
        .queue
        .receive(&queue_url, params.max_messages)
        .into_iter()
        .map(|m| {
            let body = serde_json::from_str(&m.body).unwrap_or(Value::Null);
            json!({
                "message_id": m.message_id,
                "body": body,
                "receipt_handle": m.receipt_handle,
                "attributes": m.attributes,
                "md5": m.body_md5,
            })
        })
        .collect();
    Ok(Json(json!({ "messages": messages })))
}

/// Acknowledges a message by receipt handle. The queue model only logs the
/// acknowledgement; nothing is removed.
pub async fn delete_message(
    State(state): State<AppState>,
    Query(params): Query<DeleteParams>,
) -> Result<StatusCode, ApiError> {
    let (Some(queue_url), Some(receipt_handle)) = (params.queue_url, params.receipt_handle) else {
        return Err(ApiError(StratusError::Validation(
            "queue_url and receipt_handle are required".to_string(),
        )));
    };
    state.backends.queue.delete(&queue_url, &receipt_handle);
    Ok(StatusCode::NO_CONTENT)
}

/// Returns the queue action log in append order.
pub async fn message_history(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "history": state.backends.queue.message_log() }))
}

/// Clears the action log and every queue.
pub async fn clear_history(State(state): State<AppState>) -> StatusCode {
    state.backends.queue.clear_message_log();
    StatusCode::NO_CONTENT
}
