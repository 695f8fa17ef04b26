//! In-memory document database emulation.
//!
//! Collections are named, created on first use, and hold flat JSON documents
//! in insertion order. Every operation reports misses through its return
//! value (`Option`, zero counts); nothing here raises for "not found".

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use dashmap::DashMap;
use serde_json::{Map, Value};
use tracing::{debug, info, instrument};

use crate::ids::IdSource;
use crate::metrics;

pub const ID_FIELD: &str = "_id";
pub const CREATED_AT_FIELD: &str = "created_at";
pub const UPDATED_AT_FIELD: &str = "updated_at";

/// Result of `update_one`. `document` holds the post-merge document when a
/// match was found.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateOutcome {
    pub modified_count: u64,
    pub document: Option<Value>,
}

/// Result of `delete_one`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub deleted_count: u64,
}

/// Emulated document database. Documents live in per-collection vectors so
/// scans observe insertion order, matching what callers of the real thing
/// see with unindexed queries.
pub struct DocumentStore {
    collections: DashMap<String, Vec<Value>>,
    ids: Arc<dyn IdSource>,
    connected: AtomicBool,
}

impl DocumentStore {
    pub fn new(ids: Arc<dyn IdSource>) -> Self {
        Self {
            collections: DashMap::new(),
            ids,
            connected: AtomicBool::new(false),
        }
    }

    /// One-time connect step. Only flips the ready flag; the `uri` is
    /// accepted for interface parity and logged, never dialed.
    pub fn connect(&self, uri: &str) {
        info!(uri, "document store connected");
        self.connected.store(true, Ordering::Relaxed);
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }

    /// All documents matching every field of `query` by strict equality, in
    /// insertion order. No query returns the whole collection.
    pub fn find(&self, collection: &str, query: Option<&Map<String, Value>>) -> Vec<Value> {
        metrics::ENGINE_OPS_TOTAL
            .with_label_values(&["docstore", "find"])
            .inc();
        let Some(docs) = self.collections.get(collection) else {
            return Vec::new();
        };
        match query {
            Some(q) => docs.iter().filter(|d| matches(d, q)).cloned().collect(),
            None => docs.clone(),
        }
    }

    /// First document matching `query`, or `None`.
    pub fn find_one(&self, collection: &str, query: &Map<String, Value>) -> Option<Value> {
        metrics::ENGINE_OPS_TOTAL
            .with_label_values(&["docstore", "find_one"])
            .inc();
        self.collections
            .get(collection)?
            .iter()
            .find(|d| matches(d, query))
            .cloned()
    }

    /// Document whose id field equals `id`, or `None`.
    pub fn find_by_id(&self, collection: &str, id: &str) -> Option<Value> {
        metrics::ENGINE_OPS_TOTAL
            .with_label_values(&["docstore", "find_by_id"])
            .inc();
        self.collections
            .get(collection)?
            .iter()
            .find(|d| d.get(ID_FIELD).and_then(Value::as_str) == Some(id))
            .cloned()
    }

    /// Insert a document built from `fields` plus a fresh id and equal
    /// created/updated timestamps. Server-assigned fields win over any
    /// caller-supplied values of the same name. Returns the stored document.
    #[instrument(skip(self, fields))]
    pub fn create(&self, collection: &str, fields: Map<String, Value>) -> Value {
        metrics::ENGINE_OPS_TOTAL
            .with_label_values(&["docstore", "create"])
            .inc();
        let id = self.ids.id();
        let now = timestamp();

        let mut doc = fields;
        doc.insert(ID_FIELD.to_string(), Value::String(id.clone()));
        doc.insert(CREATED_AT_FIELD.to_string(), now.clone());
        doc.insert(UPDATED_AT_FIELD.to_string(), now);

        let doc = Value::Object(doc);
        self.collections
            .entry(collection.to_string())
            .or_default()
            .push(doc.clone());

        debug!(collection, id, "created document");
        doc
    }

    /// Merge `set` into the first document matching `query` and refresh its
    /// updated timestamp. The id field is never overwritten, so document
    /// identity stays stable across updates. Reports a modified count of 0
    /// on miss; never inserts.
    #[instrument(skip(self, query, set))]
    pub fn update_one(
        &self,
        collection: &str,
        query: &Map<String, Value>,
        set: &Map<String, Value>,
    ) -> UpdateOutcome {
        metrics::ENGINE_OPS_TOTAL
            .with_label_values(&["docstore", "update_one"])
            .inc();
        let Some(mut docs) = self.collections.get_mut(collection) else {
            return UpdateOutcome {
                modified_count: 0,
                document: None,
            };
        };
        let Some(doc) = docs.iter_mut().find(|d| matches(d, query)) else {
            return UpdateOutcome {
                modified_count: 0,
                document: None,
            };
        };

        if let Value::Object(obj) = doc {
            for (k, v) in set {
                if k != ID_FIELD {
                    obj.insert(k.clone(), v.clone());
                }
            }
            obj.insert(UPDATED_AT_FIELD.to_string(), timestamp());
        }

        UpdateOutcome {
            modified_count: 1,
            document: Some(doc.clone()),
        }
    }

    /// Remove the first document matching `query`. Reports a deleted count
    /// of 0 when nothing matched.
    #[instrument(skip(self, query))]
    pub fn delete_one(&self, collection: &str, query: &Map<String, Value>) -> DeleteOutcome {
        metrics::ENGINE_OPS_TOTAL
            .with_label_values(&["docstore", "delete_one"])
            .inc();
        let Some(mut docs) = self.collections.get_mut(collection) else {
            return DeleteOutcome { deleted_count: 0 };
        };
        match docs.iter().position(|d| matches(d, query)) {
            Some(pos) => {
                docs.remove(pos);
                DeleteOutcome { deleted_count: 1 }
            }
            None => DeleteOutcome { deleted_count: 0 },
        }
    }
}

/// Strict-equality match: every query field must be present in the document
/// with an identical value.
fn matches(doc: &Value, query: &Map<String, Value>) -> bool {
    query.iter().all(|(k, v)| doc.get(k) == Some(v))
}

fn timestamp() -> Value {
    Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true))
}
