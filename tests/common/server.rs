use std::sync::Arc;

use tokio::net::TcpListener;

use stratus::backends::Backends;
use stratus::config::Config;
use stratus::server::routes::build_router;
use stratus::server::AppState;

/// Start a test server with optional config override, returning
/// (base_url, backends). Every server owns a fresh world, so tests never
/// need to clean up after themselves.
pub async fn start_test_server_with_config(
    config_override: Option<Config>,
) -> (String, Arc<Backends>) {
    // Ensure metrics are registered (idempotent)
    stratus::metrics::init();

    let config = config_override.unwrap_or_else(|| Config::load(None).unwrap());
    let backends = Arc::new(Backends::new(&config));
    backends.connect_all();

    let state = AppState {
        backends: backends.clone(),
        config: Arc::new(config),
    };

    let app = build_router(state);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let base_url = format!("http://{addr}");

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (base_url, backends)
}

/// Start a test server with default config.
pub async fn start_test_server() -> (String, Arc<Backends>) {
    start_test_server_with_config(None).await
}

/// Create a user over the API and return its id.
pub async fn create_user_api(
    client: &reqwest::Client,
    base_url: &str,
    body: serde_json::Value,
) -> String {
    let resp = client
        .post(format!("{base_url}/v1/users"))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
    let body: serde_json::Value = resp.json().await.unwrap();
    body["user"]["_id"].as_str().unwrap().to_string()
}
