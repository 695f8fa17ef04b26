//! Stratus: local in-process emulation of a cloud service backend.

pub mod backends;
pub mod config;
pub mod docstore;
pub mod error;
pub mod gateway;
pub mod ids;
pub mod kv;
pub mod metrics;
pub mod objects;
pub mod places;
pub mod queue;
pub mod search;
pub mod server;
pub mod startup;
