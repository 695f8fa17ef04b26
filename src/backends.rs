//! Shared handle over every backend emulation.
//!
//! One `Backends` value owns one independent world: its own collections,
//! cache entries, indices, buckets, queues, and logs. The server builds a
//! single instance at startup; tests build as many as they need. All ids
//! minted anywhere in that world come from the one injected [`IdSource`].

use std::sync::Arc;

use tracing::info;

use crate::config::Config;
use crate::docstore::DocumentStore;
use crate::gateway::OutboundGateway;
use crate::ids::{IdSource, RandomIds};
use crate::kv::KvStore;
use crate::objects::ObjectVault;
use crate::places::PlaceCatalog;
use crate::queue::MessageQueue;
use crate::search::SearchIndex;

pub struct Backends {
    pub documents: Arc<DocumentStore>,
    pub cache: Arc<KvStore>,
    pub search: Arc<SearchIndex>,
    pub objects: Arc<ObjectVault>,
    pub queue: Arc<MessageQueue>,
    pub places: Arc<PlaceCatalog>,
    pub gateway: Arc<OutboundGateway>,
}

impl Backends {
    pub fn new(config: &Config) -> Self {
        Self::with_ids(Arc::new(RandomIds), config)
    }

    /// Build with an explicit id source so tests can pin generated ids.
    pub fn with_ids(ids: Arc<dyn IdSource>, config: &Config) -> Self {
        Self {
            documents: Arc::new(DocumentStore::new(Arc::clone(&ids))),
            cache: Arc::new(KvStore::new()),
            search: Arc::new(SearchIndex::new(Arc::clone(&ids))),
            objects: Arc::new(ObjectVault::new(
                Arc::clone(&ids),
                config.objects.base_url.clone(),
            )),
            queue: Arc::new(MessageQueue::new(Arc::clone(&ids))),
            places: Arc::new(PlaceCatalog::new()),
            gateway: Arc::new(OutboundGateway::new(ids, config.gateway.latency_ms)),
        }
    }

    /// Run the one-time connect step for the emulations that model a
    /// connection handshake. Everything else is usable immediately.
    pub fn connect_all(&self) {
        info!("connecting backend emulations");
        self.documents.connect("local://documents");
        self.cache.connect();
        self.search.connect("local://search");
        info!("all backend emulations connected");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::SequentialIds;
    use bytes::Bytes;
    use serde_json::json;

    #[test]
    fn test_connect_all_flips_ready_flags() {
        let backends = Backends::new(&Config::default());
        assert!(!backends.documents.is_connected());
        assert!(!backends.cache.is_connected());
        assert!(!backends.search.is_connected());

        backends.connect_all();
        assert!(backends.documents.is_connected());
        assert!(backends.cache.is_connected());
        assert!(backends.search.is_connected());
    }

    #[test]
    fn test_instances_are_independent_worlds() {
        let a = Backends::new(&Config::default());
        let b = Backends::new(&Config::default());

        a.documents
            .create("users", json!({"name": "Ada"}).as_object().cloned().unwrap());
        assert_eq!(a.documents.find("users", None).len(), 1);
        assert!(b.documents.find("users", None).is_empty());
    }

    #[test]
    fn test_shared_id_source_feeds_every_engine() {
        let backends = Backends::with_ids(
            Arc::new(SequentialIds::default()),
            &Config::default(),
        );

        let doc = backends
            .documents
            .create("users", json!({}).as_object().cloned().unwrap());
        assert_eq!(doc["_id"], "000000000");

        let put = backends
            .objects
            .put("b", "k", Bytes::from_static(b"x"), "text/plain");
        assert_eq!(put.etag, "\"000000001\"");
    }
}
