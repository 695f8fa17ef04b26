//! Full-text search emulation.
//!
//! Indices are created on first write and hold documents in insertion
//! order. Two query shapes are supported: `match` (case-insensitive
//! substring against a string field) and `term` (exact equality, or
//! membership when the field holds an array). Scoring is flat; every hit
//! scores 1.0.
//!
//! Unlike the other engines, `delete` raises on a missing document. That
//! asymmetry is part of the surface being emulated and is load-bearing for
//! callers that translate it into a 404.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, instrument};

use crate::error::{Result, StratusError};
use crate::ids::IdSource;
use crate::metrics;

/// Fallback hit cap when the caller does not give one.
pub const DEFAULT_SIZE: usize = 10;

/// Exactly one query shape per search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SearchQuery {
    /// Case-insensitive substring match against the string value of `field`.
    /// Documents where the field is absent or not a string never match.
    #[serde(rename = "match")]
    Match { field: String, text: String },
    /// Exact equality against `field`; membership test when the field holds
    /// an array.
    #[serde(rename = "term")]
    Term { field: String, value: Value },
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct IndexOutcome {
    pub index: String,
    pub id: String,
    pub result: &'static str,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub index: String,
    pub id: String,
    pub result: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub index: String,
    pub id: String,
    pub score: f64,
    pub source: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    pub took: u64,
    pub total: usize,
    pub hits: Vec<SearchHit>,
}

/// Emulated search cluster. Insertion order doubles as ranking order since
/// all hits score the same.
pub struct SearchIndex {
    indices: DashMap<String, Vec<Value>>,
    ids: Arc<dyn IdSource>,
    connected: AtomicBool,
}

impl SearchIndex {
    pub fn new(ids: Arc<dyn IdSource>) -> Self {
        Self {
            indices: DashMap::new(),
            ids,
            connected: AtomicBool::new(false),
        }
    }

    /// One-time connect step; only flips the ready flag.
    pub fn connect(&self, node: &str) {
        info!(node, "search index connected");
        self.connected.store(true, Ordering::Relaxed);
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }

    /// Store `source` under `id` (generated when omitted) in the named
    /// index, overwriting in place if the id already exists. The id is also
    /// injected into the stored document so hits carry it.
    #[instrument(skip(self, source))]
    pub fn index(&self, index: &str, source: Map<String, Value>, id: Option<&str>) -> IndexOutcome {
        metrics::ENGINE_OPS_TOTAL
            .with_label_values(&["search", "index"])
            .inc();
        let doc_id = match id {
            Some(id) => id.to_string(),
            None => self.ids.id(),
        };
        let mut doc = source;
        doc.insert("_id".to_string(), Value::String(doc_id.clone()));
        let doc = Value::Object(doc);

        let mut docs = self.indices.entry(index.to_string()).or_default();
        match docs.iter_mut().find(|d| doc_id_of(d) == Some(&doc_id)) {
            Some(existing) => *existing = doc,
            None => docs.push(doc),
        }

        debug!(index, id = %doc_id, "indexed document");
        IndexOutcome {
            index: index.to_string(),
            id: doc_id,
            result: "created",
        }
    }

    /// Run `query` over the named index, returning up to `size` hits
    /// (default 10). `total` always counts every match, not just the
    /// returned page. A missing index behaves as an empty one.
    pub fn search(
        &self,
        index: &str,
        query: Option<&SearchQuery>,
        size: Option<usize>,
    ) -> SearchOutcome {
        metrics::ENGINE_OPS_TOTAL
            .with_label_values(&["search", "search"])
            .inc();
        let started = Instant::now();
        let size = size.unwrap_or(DEFAULT_SIZE);

        let matched: Vec<Value> = match self.indices.get(index) {
            Some(docs) => docs
                .iter()
                .filter(|doc| query.map_or(true, |q| query_matches(q, doc)))
                .cloned()
                .collect(),
            None => Vec::new(),
        };

        let total = matched.len();
        let hits = matched
            .into_iter()
            .take(size)
            .map(|doc| SearchHit {
                index: index.to_string(),
                id: doc_id_of(&doc).unwrap_or_default().to_string(),
                score: 1.0,
                source: doc,
            })
            .collect();

        SearchOutcome {
            took: started.elapsed().as_millis() as u64,
            total,
            hits,
        }
    }

    /// Remove the document. This is the one engine operation that raises on
    /// a miss; deleting an unknown id is an error naming both the id and
    /// the index.
    #[instrument(skip(self))]
    pub fn delete(&self, index: &str, id: &str) -> Result<DeleteOutcome> {
        metrics::ENGINE_OPS_TOTAL
            .with_label_values(&["search", "delete"])
            .inc();
        let not_found = || StratusError::DocumentNotFound {
            id: id.to_string(),
            index: index.to_string(),
        };

        let mut docs = self.indices.get_mut(index).ok_or_else(not_found)?;
        let pos = docs
            .iter()
            .position(|d| doc_id_of(d) == Some(id))
            .ok_or_else(not_found)?;
        docs.remove(pos);

        debug!(index, id, "deleted document");
        Ok(DeleteOutcome {
            index: index.to_string(),
            id: id.to_string(),
            result: "deleted",
        })
    }
}

fn doc_id_of(doc: &Value) -> Option<&str> {
    doc.get("_id").and_then(Value::as_str)
}

fn query_matches(query: &SearchQuery, doc: &Value) -> bool {
    match query {
        SearchQuery::Match { field, text } => doc
            .get(field)
            .and_then(Value::as_str)
            .map_or(false, |s| {
                s.to_lowercase().contains(&text.to_lowercase())
            }),
        SearchQuery::Term { field, value } => match doc.get(field) {
            Some(Value::Array(items)) => items.contains(value),
            Some(v) => v == value,
            None => false,
        },
    }
}
