use axum::extract::State;
use axum::Json;
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};

use crate::server::AppState;

/// Liveness probe: reports per-backend ready flags (whether the one-time
/// connect step has run) alongside a timestamp.
pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        "services": {
            "documents": state.backends.documents.is_connected(),
            "cache": state.backends.cache.is_connected(),
            "search": state.backends.search.is_connected(),
        },
    }))
}
