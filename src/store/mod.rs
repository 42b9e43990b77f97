//! Counter store backends.
//!
//! Handlers only see [`CounterStore`]; `main` decides at startup whether that
//! is the Firebase Realtime Database or the in-process [`MemoryStore`].

mod firebase;
mod memory;

pub use firebase::FirebaseStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use serde_json::Value;

use crate::allowlist::{MetricTarget, Namespace};
use crate::error::StoreError;

// Where the connectivity probe writes
pub const PROBE_PATH: &str = "test/message";

#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Plain read of one namespace object. `Value::Null` when nothing is stored.
    async fn read_namespace(&self, namespace: Namespace) -> Result<Value, StoreError>;

    /// Add one to the counter at `target` without a local read-modify-write
    /// window. Returns the value now stored.
    async fn increment(&self, target: &MetricTarget) -> Result<u64, StoreError>;

    /// Write a small document to [`PROBE_PATH`] and read it back.
    async fn probe(&self) -> Result<Value, StoreError>;
}

pub(crate) fn probe_document() -> Value {
    serde_json::json!({
        "content": "Hello from Backend!",
        "timestamp": chrono::Utc::now().timestamp_millis(),
    })
}
