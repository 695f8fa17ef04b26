//! Outbound HTTP call emulation.
//!
//! Nothing leaves the process. `post` records the would-be call in an
//! append-only log, waits out a configurable simulated latency, and hands
//! back a canned success envelope echoing the payload. Tests read the log
//! to assert what the system under test tried to send.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::time::Duration;
use tracing::{debug, info, instrument};

use crate::ids::IdSource;
use crate::metrics;

/// One recorded outbound call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CallRecord {
    pub timestamp: DateTime<Utc>,
    pub url: String,
    pub method: String,
    pub payload: Value,
    pub headers: Map<String, Value>,
}

/// Synthetic response returned for every call.
#[derive(Debug, Clone, Serialize)]
pub struct GatewayResponse {
    pub status: u16,
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
    pub echo: Value,
}

/// Emulated outbound gateway.
pub struct OutboundGateway {
    log: Mutex<Vec<CallRecord>>,
    ids: Arc<dyn IdSource>,
    latency: Duration,
}

impl OutboundGateway {
    pub fn new(ids: Arc<dyn IdSource>, latency_ms: u64) -> Self {
        Self {
            log: Mutex::new(Vec::new()),
            ids,
            latency: Duration::from_millis(latency_ms),
        }
    }

    /// Record a POST and return a synthetic 200 after the simulated
    /// latency. The latency rides the Tokio clock, so paused-clock tests
    /// skip the wait.
    #[instrument(skip(self, payload, headers))]
    pub async fn post(
        &self,
        url: &str,
        payload: Value,
        headers: Map<String, Value>,
    ) -> GatewayResponse {
        metrics::ENGINE_OPS_TOTAL
            .with_label_values(&["gateway", "post"])
            .inc();
        self.lock_log().push(CallRecord {
            timestamp: Utc::now(),
            url: url.to_string(),
            method: "POST".to_string(),
            payload: payload.clone(),
            headers,
        });
        debug!(url, "recorded outbound call");

        tokio::time::sleep(self.latency).await;

        GatewayResponse {
            status: 200,
            request_id: self.ids.id(),
            timestamp: Utc::now(),
            echo: payload,
        }
    }

    /// Snapshot of the call log in append order.
    pub fn request_log(&self) -> Vec<CallRecord> {
        self.lock_log().clone()
    }

    /// Drop all recorded calls.
    pub fn clear_request_log(&self) {
        let mut log = self.lock_log();
        let calls = log.len();
        log.clear();
        info!(calls, "cleared outbound call log");
    }

    fn lock_log(&self) -> std::sync::MutexGuard<'_, Vec<CallRecord>> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::SequentialIds;
    use serde_json::json;

    fn gateway(latency_ms: u64) -> OutboundGateway {
        OutboundGateway::new(Arc::new(SequentialIds::default()), latency_ms)
    }

    #[tokio::test(start_paused = true)]
    async fn test_post_returns_success_envelope() {
        let gw = gateway(100);
        let payload = json!({"event": "signup", "user": "ada"});
        let headers = json!({"x-api-key": "k1"}).as_object().cloned().unwrap();

        let resp = gw.post("https://api.example.com/events", payload.clone(), headers).await;
        assert_eq!(resp.status, 200);
        assert_eq!(resp.request_id, "000000000");
        assert_eq!(resp.echo, payload);
    }

    #[tokio::test(start_paused = true)]
    async fn test_post_records_call_in_order() {
        let gw = gateway(100);
        gw.post("https://a.example.com", json!({"n": 1}), Map::new())
            .await;
        gw.post("https://b.example.com", json!({"n": 2}), Map::new())
            .await;

        let log = gw.request_log();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].url, "https://a.example.com");
        assert_eq!(log[0].method, "POST");
        assert_eq!(log[0].payload, json!({"n": 1}));
        assert_eq!(log[1].url, "https://b.example.com");
    }

    #[tokio::test(start_paused = true)]
    async fn test_latency_rides_the_tokio_clock() {
        let gw = gateway(250);
        let before = tokio::time::Instant::now();
        gw.post("https://slow.example.com", json!({}), Map::new())
            .await;
        // Paused clock: the sleep advances virtual time by exactly the
        // configured latency without real waiting.
        assert_eq!(before.elapsed(), Duration::from_millis(250));
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_request_log() {
        let gw = gateway(0);
        gw.post("https://a.example.com", json!({}), Map::new())
            .await;
        assert_eq!(gw.request_log().len(), 1);

        gw.clear_request_log();
        assert!(gw.request_log().is_empty());
    }
}
