pub mod handlers;
pub mod middleware;
pub mod routes;

use std::sync::Arc;

use crate::backends::Backends;
use crate::config::Config;

/// Shared application state injected into all handlers via axum's State extractor.
#[derive(Clone)]
pub struct AppState {
    pub backends: Arc<Backends>,
    pub config: Arc<Config>,
}
