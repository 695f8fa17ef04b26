use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use super::handlers::{devices, health, metrics, places, queue, search, upload, users};
use super::middleware;
use super::AppState;

/// Builds the axum router with all routes, middleware, and shared state.
pub fn build_router(state: AppState) -> Router {
    let timeout = Duration::from_secs(state.config.server.request_timeout_secs);
    let body_limit = state.config.server.max_request_body_mb * 1024 * 1024;

    Router::new()
        .route("/health", get(health::health_check))
        .route("/metrics", get(metrics::metrics_handler))
        .route("/v1/users", get(users::list_users).post(users::create_user))
        .route(
            "/v1/users/:id",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route(
            "/v1/users/:id/devices",
            get(devices::list_devices).post(devices::create_device),
        )
        .route(
            "/v1/users/:id/devices/:device_id",
            get(devices::get_device)
                .put(devices::update_device)
                .delete(devices::delete_device),
        )
        .route("/v1/search", get(search::run_search))
        .route("/v1/search/:index/document", post(search::index_document))
        .route(
            "/v1/search/:index/document/:id",
            delete(search::delete_document),
        )
        .route(
            "/v1/upload",
            get(upload::list_files).post(upload::upload_file),
        )
        .route(
            "/v1/upload/*key",
            get(upload::file_metadata).delete(upload::delete_file),
        )
        .route("/v1/queue/send", post(queue::send_message))
        .route("/v1/queue/receive", get(queue::receive_messages))
        .route("/v1/queue/message", delete(queue::delete_message))
        .route(
            "/v1/queue/history",
            get(queue::message_history).delete(queue::clear_history),
        )
        .route("/v1/places/map", get(places::map_data))
        .route("/v1/places/regions", get(places::regions))
        .layer(axum::middleware::from_fn(middleware::http_metrics))
        .layer(TimeoutLayer::new(timeout))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(axum::middleware::from_fn(middleware::request_id))
        .with_state(state)
}
