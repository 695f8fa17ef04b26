//! Expiring key-value cache emulation.
//!
//! Values are stored serialized, as the real client would send them over the
//! wire. TTLs ride on the Tokio clock: each `set` with a TTL spawns a
//! one-shot reaper for that entry, and reads treat a past deadline as
//! absence regardless of whether the reaper has fired yet. Under
//! `tokio::time::pause` the clock is virtual, so tests can advance past a
//! TTL without real waiting.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::time::{Duration, Instant};
use tracing::{debug, info};

use crate::error::Result;
use crate::metrics;

#[derive(Debug, Clone)]
struct CacheEntry {
    payload: String,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// Emulated cache server. Keys live until deleted or expired; expiry is
/// authoritative on read, the background reaper only reclaims memory.
pub struct KvStore {
    entries: Arc<DashMap<String, CacheEntry>>,
    connected: AtomicBool,
}

impl Default for KvStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KvStore {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            connected: AtomicBool::new(false),
        }
    }

    /// One-time connect step; only flips the ready flag.
    pub fn connect(&self) {
        info!("cache connected");
        self.connected.store(true, Ordering::Relaxed);
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }

    /// Serialize and store `value`. With `ttl_seconds` the entry is
    /// scheduled for removal after that many seconds; scheduling needs a
    /// running Tokio runtime. Overwriting a key replaces its deadline.
    pub fn set<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        ttl_seconds: Option<u64>,
    ) -> Result<()> {
        metrics::ENGINE_OPS_TOTAL
            .with_label_values(&["kv", "set"])
            .inc();
        let payload = serde_json::to_string(value)?;
        let expires_at = ttl_seconds.map(|s| Instant::now() + Duration::from_secs(s));
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                payload,
                expires_at,
            },
        );

        if let Some(deadline) = expires_at {
            let entries = Arc::clone(&self.entries);
            let key = key.to_string();
            tokio::spawn(async move {
                tokio::time::sleep_until(deadline).await;
                // The entry may have been overwritten with a later deadline
                // since this reaper was scheduled; re-check before removing.
                let removed = entries
                    .remove_if(&key, |_, entry| entry.is_expired(Instant::now()))
                    .is_some();
                if removed {
                    metrics::CACHE_EXPIRATIONS_TOTAL.inc();
                    debug!(key, "cache entry expired");
                }
            });
        }
        Ok(())
    }

    /// Deserialized value for `key`, or `None` if absent or expired. An
    /// expired entry found here is removed on the spot rather than waiting
    /// for its reaper.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        metrics::ENGINE_OPS_TOTAL
            .with_label_values(&["kv", "get"])
            .inc();
        let now = Instant::now();
        let Some(entry) = self.entries.get(key) else {
            metrics::CACHE_HITS_TOTAL.with_label_values(&["miss"]).inc();
            return None;
        };
        if entry.is_expired(now) {
            // Ref must be released before mutating the map.
            drop(entry);
            self.entries.remove_if(key, |_, e| e.is_expired(now));
            metrics::CACHE_HITS_TOTAL
                .with_label_values(&["expired"])
                .inc();
            return None;
        }
        let parsed = serde_json::from_str(&entry.payload).ok();
        metrics::CACHE_HITS_TOTAL.with_label_values(&["hit"]).inc();
        parsed
    }

    /// Remove `key`; 1 if it existed, 0 otherwise.
    pub fn del(&self, key: &str) -> u64 {
        metrics::ENGINE_OPS_TOTAL
            .with_label_values(&["kv", "del"])
            .inc();
        match self.entries.remove(key) {
            Some(_) => 1,
            None => 0,
        }
    }

    /// All currently-present (not expired) keys matching `pattern`, where
    /// `*` matches any substring and every other character matches
    /// literally. Sorted so callers see a stable order.
    pub fn keys(&self, pattern: &str) -> Vec<String> {
        metrics::ENGINE_OPS_TOTAL
            .with_label_values(&["kv", "keys"])
            .inc();
        let now = Instant::now();
        let mut out: Vec<String> = self
            .entries
            .iter()
            .filter(|entry| !entry.value().is_expired(now))
            .filter(|entry| glob_match(pattern, entry.key()))
            .map(|entry| entry.key().clone())
            .collect();
        out.sort();
        out
    }

    /// Liveness probe.
    pub fn ping(&self) -> &'static str {
        "PONG"
    }
}

/// Glob match with `*` as the only metacharacter. Splits the pattern on `*`
/// and anchors the first and last fragments; middle fragments match
/// left-to-right.
fn glob_match(pattern: &str, key: &str) -> bool {
    let mut fragments = pattern.split('*');
    // split always yields at least one item
    let first = fragments.next().unwrap_or("");
    if !key.starts_with(first) {
        return false;
    }
    let mut rest = &key[first.len()..];

    let mut middle: Vec<&str> = fragments.collect();
    let Some(last) = middle.pop() else {
        // No `*` in the pattern: exact match only.
        return rest.is_empty();
    };

    for frag in middle {
        if frag.is_empty() {
            continue;
        }
        match rest.find(frag) {
            Some(idx) => rest = &rest[idx + frag.len()..],
            None => return false,
        }
    }
    rest.ends_with(last)
}
