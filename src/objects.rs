//! Object storage emulation.
//!
//! Buckets are created on first write and map keys to byte bodies plus the
//! usual metadata strip (content type, size, last-modified, entity tag).
//! `get` raises on a missing key, mirroring the raising client it stands in
//! for; `delete` is idempotent and always acknowledges with a delete
//! marker.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::error::{Result, StratusError};
use crate::ids::IdSource;
use crate::metrics;

#[derive(Debug, Clone)]
struct StoredObject {
    body: Bytes,
    content_type: String,
    last_modified: DateTime<Utc>,
    etag: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PutOutcome {
    pub location: String,
    pub bucket: String,
    pub key: String,
    pub etag: String,
}

/// Full object as returned by `get`; `size` is always `body.len()`.
#[derive(Debug, Clone)]
pub struct ObjectData {
    pub body: Bytes,
    pub content_type: String,
    pub size: usize,
    pub last_modified: DateTime<Utc>,
    pub etag: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DeleteMarker {
    pub delete_marker: bool,
    pub version_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ObjectSummary {
    pub key: String,
    pub size: usize,
    pub last_modified: DateTime<Utc>,
    pub etag: String,
    pub storage_class: &'static str,
}

/// Emulated object store. `base_url` only shapes the synthetic location
/// URLs handed back on put; nothing is ever served from them.
pub struct ObjectVault {
    buckets: DashMap<String, DashMap<String, StoredObject>>,
    ids: Arc<dyn IdSource>,
    base_url: String,
}

impl ObjectVault {
    pub fn new(ids: Arc<dyn IdSource>, base_url: String) -> Self {
        Self {
            buckets: DashMap::new(),
            ids,
            base_url,
        }
    }

    /// Store or overwrite an object. Assigns a fresh quoted entity tag and
    /// stamps last-modified with the current time.
    #[instrument(skip(self, body, content_type))]
    pub fn put(&self, bucket: &str, key: &str, body: Bytes, content_type: &str) -> PutOutcome {
        metrics::ENGINE_OPS_TOTAL
            .with_label_values(&["objects", "put"])
            .inc();
        let etag = format!("\"{}\"", self.ids.id());
        let object = StoredObject {
            body,
            content_type: content_type.to_string(),
            last_modified: Utc::now(),
            etag: etag.clone(),
        };

        let size = object.body.len();
        let replaced = self
            .buckets
            .entry(bucket.to_string())
            .or_default()
            .insert(key.to_string(), object);
        let freed = replaced.map(|old| old.body.len()).unwrap_or(0);
        metrics::OBJECT_STORE_BYTES.add(size as i64 - freed as i64);

        debug!(bucket, key, size, "stored object");
        PutOutcome {
            location: format!("{}/{}/{}", self.base_url, bucket, key),
            bucket: bucket.to_string(),
            key: key.to_string(),
            etag,
        }
    }

    /// Fetch an object. Raises `ObjectNotFound` when the bucket or key is
    /// absent.
    pub fn get(&self, bucket: &str, key: &str) -> Result<ObjectData> {
        metrics::ENGINE_OPS_TOTAL
            .with_label_values(&["objects", "get"])
            .inc();
        let not_found = || StratusError::ObjectNotFound {
            bucket: bucket.to_string(),
            key: key.to_string(),
        };
        let objects = self.buckets.get(bucket).ok_or_else(not_found)?;
        let object = objects.get(key).ok_or_else(not_found)?;
        Ok(ObjectData {
            body: object.body.clone(),
            content_type: object.content_type.clone(),
            size: object.body.len(),
            last_modified: object.last_modified,
            etag: object.etag.clone(),
        })
    }

    /// Remove an object if present. Absence is not an error; either way the
    /// caller gets a delete marker with a fresh version id.
    #[instrument(skip(self))]
    pub fn delete(&self, bucket: &str, key: &str) -> DeleteMarker {
        metrics::ENGINE_OPS_TOTAL
            .with_label_values(&["objects", "delete"])
            .inc();
        if let Some(objects) = self.buckets.get(bucket) {
            if let Some((_, old)) = objects.remove(key) {
                metrics::OBJECT_STORE_BYTES.sub(old.body.len() as i64);
                debug!(bucket, key, "deleted object");
            }
        }
        DeleteMarker {
            delete_marker: true,
            version_id: self.ids.id(),
        }
    }

    /// All objects in `bucket` whose key starts with `prefix`, sorted by
    /// key. A missing bucket lists as empty.
    pub fn list(&self, bucket: &str, prefix: &str) -> Vec<ObjectSummary> {
        metrics::ENGINE_OPS_TOTAL
            .with_label_values(&["objects", "list"])
            .inc();
        let Some(objects) = self.buckets.get(bucket) else {
            return Vec::new();
        };
        let mut out: Vec<ObjectSummary> = objects
            .iter()
            .filter(|entry| entry.key().starts_with(prefix))
            .map(|entry| ObjectSummary {
                key: entry.key().clone(),
                size: entry.value().body.len(),
                last_modified: entry.value().last_modified,
                etag: entry.value().etag.clone(),
                storage_class: "STANDARD",
            })
            .collect();
        out.sort_by(|a, b| a.key.cmp(&b.key));
        out
    }
}
