use crate::error::{Result, StratusError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub objects: ObjectsConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_max_request_body_mb")]
    pub max_request_body_mb: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectsConfig {
    /// Bucket that the upload routes write into.
    #[serde(default = "default_objects_bucket")]
    pub bucket: String,
    /// Prefix for the synthetic public URLs returned on upload. Nothing is
    /// ever served from these URLs; they only have to look plausible.
    #[serde(default = "default_objects_base_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_search_size")]
    pub default_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Simulated round-trip latency for outbound calls, in milliseconds.
    #[serde(default = "default_gateway_latency_ms")]
    pub latency_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_host() -> String {
    std::env::var("STRATUS_HOST").unwrap_or_else(|_| "0.0.0.0".to_string())
}
fn default_port() -> u16 {
    std::env::var("STRATUS_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000)
}
fn default_request_timeout() -> u64 {
    std::env::var("STRATUS_REQUEST_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(30)
}
fn default_max_request_body_mb() -> usize {
    std::env::var("STRATUS_MAX_REQUEST_BODY_MB")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(10)
}
fn default_objects_bucket() -> String {
    std::env::var("STRATUS_OBJECTS_BUCKET").unwrap_or_else(|_| "local-objects".to_string())
}
fn default_objects_base_url() -> String {
    std::env::var("STRATUS_OBJECTS_BASE_URL")
        .unwrap_or_else(|_| "https://objects.example.com".to_string())
}
fn default_search_size() -> usize {
    std::env::var("STRATUS_SEARCH_DEFAULT_SIZE")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(10)
}
fn default_gateway_latency_ms() -> u64 {
    std::env::var("STRATUS_GATEWAY_LATENCY_MS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(100)
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    std::env::var("STRATUS_LOG_FORMAT").unwrap_or_else(|_| "json".to_string())
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_secs: default_request_timeout(),
            max_request_body_mb: default_max_request_body_mb(),
        }
    }
}

impl Default for ObjectsConfig {
    fn default() -> Self {
        Self {
            bucket: default_objects_bucket(),
            base_url: default_objects_base_url(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_size: default_search_size(),
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            latency_ms: default_gateway_latency_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load config from a TOML file, falling back to defaults.
    /// After loading, env var overrides are applied so that:
    /// env var > TOML file > defaults.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut config = match path {
            Some(p) => {
                let content = std::fs::read_to_string(p).map_err(|e| {
                    StratusError::Config(format!("failed to read config file {p}: {e}"))
                })?;
                toml::from_str(&content)
                    .map_err(|e| StratusError::Config(format!("failed to parse config: {e}")))?
            }
            None => Config::default(),
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides on top of file/default values.
    /// This ensures env vars always take priority over TOML settings.
    fn apply_env_overrides(&mut self) {
        // Server
        if let Ok(v) = std::env::var("STRATUS_HOST") {
            self.server.host = v;
        }
        if let Some(v) = std::env::var("STRATUS_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            self.server.port = v;
        }
        if let Some(v) = std::env::var("STRATUS_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            self.server.request_timeout_secs = v;
        }
        if let Some(v) = std::env::var("STRATUS_MAX_REQUEST_BODY_MB")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            self.server.max_request_body_mb = v;
        }

        // Objects
        if let Ok(v) = std::env::var("STRATUS_OBJECTS_BUCKET") {
            self.objects.bucket = v;
        }
        if let Ok(v) = std::env::var("STRATUS_OBJECTS_BASE_URL") {
            self.objects.base_url = v;
        }

        // Search
        if let Some(v) = std::env::var("STRATUS_SEARCH_DEFAULT_SIZE")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            self.search.default_size = v;
        }

        // Gateway
        if let Some(v) = std::env::var("STRATUS_GATEWAY_LATENCY_MS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            self.gateway.latency_ms = v;
        }

        // Logging
        if let Ok(v) = std::env::var("STRATUS_LOG_FORMAT") {
            self.logging.format = v;
        }
    }
}
