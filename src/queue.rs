//! Message queue emulation.
//!
//! Queues are created on first send and hold messages in arrival order.
//! Receiving peeks at the front of the queue without removing anything,
//! and deleting only records intent; both quirks are part of the surface
//! being emulated, so consumers of the real thing behave identically
//! against this one. Every send, receive, and delete also lands in a
//! global append-only action log that tests and debugging tools read back.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, instrument};

use crate::error::{Result, StratusError};
use crate::ids::IdSource;
use crate::metrics;

const SENDER_ID: &str = "local-sender";

#[derive(Debug, Clone)]
struct QueuedMessage {
    message_id: String,
    body: String,
    attributes: Map<String, Value>,
    sent_at: DateTime<Utc>,
}

/// Receipt returned by `send`. The hash fields are placeholder tokens, not
/// real digests; callers only ever compare them for presence.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SendReceipt {
    pub message_id: String,
    pub body_md5: String,
    pub attributes_md5: String,
}

/// Delivery metadata attached to each received message. String-typed the
/// way the real service returns them.
#[derive(Debug, Clone, Serialize)]
pub struct DeliveryAttributes {
    pub sent_timestamp: String,
    pub approximate_receive_count: String,
    pub sender_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReceivedMessage {
    pub message_id: String,
    pub receipt_handle: String,
    pub body: String,
    pub body_md5: String,
    pub attributes: DeliveryAttributes,
    pub message_attributes: Map<String, Value>,
}

/// One entry in the global action log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum QueueEvent {
    Send {
        timestamp: DateTime<Utc>,
        queue_url: String,
        message_id: String,
        body: String,
    },
    Receive {
        timestamp: DateTime<Utc>,
        queue_url: String,
        messages_received: usize,
    },
    Delete {
        timestamp: DateTime<Utc>,
        queue_url: String,
        receipt_handle: String,
    },
}

/// Emulated queue service.
pub struct MessageQueue {
    queues: DashMap<String, Vec<QueuedMessage>>,
    log: Mutex<Vec<QueueEvent>>,
    ids: Arc<dyn IdSource>,
}

impl MessageQueue {
    pub fn new(ids: Arc<dyn IdSource>) -> Self {
        Self {
            queues: DashMap::new(),
            log: Mutex::new(Vec::new()),
            ids,
        }
    }

    /// Append a message to the named queue (created on demand) and log a
    /// `send` entry. Fails if the queue url or body is empty.
    #[instrument(skip(self, body, attributes))]
    pub fn send(
        &self,
        queue_url: &str,
        body: &str,
        attributes: Map<String, Value>,
    ) -> Result<SendReceipt> {
        metrics::ENGINE_OPS_TOTAL
            .with_label_values(&["queue", "send"])
            .inc();
        if queue_url.is_empty() {
            return Err(StratusError::Validation("queue url is required".to_string()));
        }
        if body.is_empty() {
            return Err(StratusError::Validation(
                "message body is required".to_string(),
            ));
        }

        let message_id = self.ids.id();
        let sent_at = Utc::now();
        self.queues
            .entry(queue_url.to_string())
            .or_default()
            .push(QueuedMessage {
                message_id: message_id.clone(),
                body: body.to_string(),
                attributes,
                sent_at,
            });

        self.append_event(QueueEvent::Send {
            timestamp: sent_at,
            queue_url: queue_url.to_string(),
            message_id: message_id.clone(),
            body: body.to_string(),
        });

        debug!(queue_url, message_id, "sent message");
        Ok(SendReceipt {
            message_id,
            body_md5: self.ids.id(),
            attributes_md5: self.ids.id(),
        })
    }

    /// Up to `max_messages` (default 1) messages from the front of the
    /// queue, each with a fresh receipt handle. Messages stay queued; this
    /// model never dequeues on receive. Logs a `receive` entry even when
    /// the queue is unknown or empty.
    #[instrument(skip(self))]
    pub fn receive(&self, queue_url: &str, max_messages: Option<usize>) -> Vec<ReceivedMessage> {
        metrics::ENGINE_OPS_TOTAL
            .with_label_values(&["queue", "receive"])
            .inc();
        let max = max_messages.unwrap_or(1);
        let messages: Vec<ReceivedMessage> = self
            .queues
            .get(queue_url)
            .map(|queue| {
                queue
                    .iter()
                    .take(max)
                    .map(|msg| ReceivedMessage {
                        message_id: msg.message_id.clone(),
                        receipt_handle: self.ids.receipt_handle(),
                        body: msg.body.clone(),
                        body_md5: self.ids.id(),
                        attributes: DeliveryAttributes {
                            sent_timestamp: msg.sent_at.timestamp_millis().to_string(),
                            approximate_receive_count: "1".to_string(),
                            sender_id: SENDER_ID.to_string(),
                        },
                        message_attributes: msg.attributes.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        self.append_event(QueueEvent::Receive {
            timestamp: Utc::now(),
            queue_url: queue_url.to_string(),
            messages_received: messages.len(),
        });

        messages
    }

    /// Log a `delete` entry for the given receipt handle. The handle is not
    /// checked against any prior receive and no message is removed; in this
    /// model deletion is a logging-only operation.
    #[instrument(skip(self))]
    pub fn delete(&self, queue_url: &str, receipt_handle: &str) {
        metrics::ENGINE_OPS_TOTAL
            .with_label_values(&["queue", "delete"])
            .inc();
        self.append_event(QueueEvent::Delete {
            timestamp: Utc::now(),
            queue_url: queue_url.to_string(),
            receipt_handle: receipt_handle.to_string(),
        });
    }

    /// Snapshot of the action log in append order.
    pub fn message_log(&self) -> Vec<QueueEvent> {
        self.lock_log().clone()
    }

    /// Reset the action log and drop all queued messages.
    pub fn clear_message_log(&self) {
        let mut log = self.lock_log();
        let events = log.len();
        log.clear();
        drop(log);

        let queues = self.queues.len();
        self.queues.clear();
        info!(events, queues, "cleared message log and queues");
    }

    fn append_event(&self, event: QueueEvent) {
        self.lock_log().push(event);
    }

    fn lock_log(&self) -> std::sync::MutexGuard<'_, Vec<QueueEvent>> {
        // Log writes never panic, but recover from poisoning anyway.
        self.log.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
