//! Application startup and bootstrap logic.
//!
//! This module extracts initialization logic from `main.rs` to make it
//! testable under `cargo test --lib`. Every backend is in-process, so
//! building the application never touches the network and cannot fail.

use std::sync::Arc;

use axum::Router;
use tracing_subscriber::EnvFilter;

use crate::backends::Backends;
use crate::config::Config;
use crate::server::routes::build_router;
use crate::server::AppState;

/// Resolve the configuration file path.
///
/// Priority:
/// 1. `STRATUS_CONFIG` environment variable
/// 2. `./stratus.toml` if it exists
/// 3. None (use defaults)
pub fn resolve_config_path() -> Option<String> {
    std::env::var("STRATUS_CONFIG").ok().or_else(|| {
        let default = "stratus.toml";
        std::path::Path::new(default)
            .exists()
            .then(|| default.to_string())
    })
}

/// Initialize tracing subscriber from logging config.
///
/// Supports JSON and plain text formats. Uses `RUST_LOG` env var if set,
/// otherwise falls back to `config.logging.level`.
pub fn init_logging(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .init();
        }
        _ => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
        }
    }
}

/// Build the application router and its backing state.
///
/// Initializes metrics, constructs every backend emulation, runs their
/// one-time connect steps, and wires the axum `Router`. The backends handle
/// is also returned so callers can reach engines without HTTP.
pub fn build_app(config: Config) -> (Router, Arc<Backends>) {
    tracing::info!("stratus starting");

    tracing::info!(
        host = %config.server.host,
        port = config.server.port,
        bucket = %config.objects.bucket,
        base_url = %config.objects.base_url,
        gateway_latency_ms = config.gateway.latency_ms,
        "configuration loaded"
    );

    crate::metrics::init();

    let backends = Arc::new(Backends::new(&config));
    backends.connect_all();

    let state = AppState {
        backends: backends.clone(),
        config: Arc::new(config),
    };
    let app = build_router(state);

    (app, backends)
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_config_path_from_env() {
        // Save original value
        let original = std::env::var("STRATUS_CONFIG").ok();

        std::env::set_var("STRATUS_CONFIG", "foo.toml");
        let path = resolve_config_path();

        // Restore original value
        match original {
            Some(v) => std::env::set_var("STRATUS_CONFIG", v),
            None => std::env::remove_var("STRATUS_CONFIG"),
        }

        assert_eq!(path, Some("foo.toml".to_string()));
    }

    #[test]
    fn test_load_config_from_toml() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("stratus.toml");
        std::fs::write(
            &path,
            "[server]\nport = 4100\n\n[objects]\nbucket = \"custom-bucket\"\n",
        )
        .unwrap();

        let config = Config::load(path.to_str()).unwrap();
        assert_eq!(config.server.port, 4100);
        assert_eq!(config.objects.bucket, "custom-bucket");
        // Unset fields keep their defaults.
        assert_eq!(config.server.request_timeout_secs, 30);
    }

    #[test]
    fn test_load_config_missing_file_is_an_error() {
        let result = Config::load(Some("/nonexistent/stratus.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_build_app_connects_backends() {
        let (_router, backends) = build_app(Config::default());
        assert!(backends.documents.is_connected());
        assert!(backends.cache.is_connected());
        assert!(backends.search.is_connected());
    }
}
