use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::{Map, Value};

use super::{CounterStore, PROBE_PATH, probe_document};
use crate::allowlist::{MetricTarget, Namespace};
use crate::error::StoreError;
use crate::models::coerce_count;

/// In-process store keyed by full path ("sources/resume").
///
/// Increments run under the DashMap shard lock for the key, which makes them
/// atomic within the process. Used for local runs and tests.
pub struct MemoryStore {
    values: DashMap<String, Value>,
    available: AtomicBool, // false = every call fails
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            values: DashMap::new(),
            available: AtomicBool::new(true),
        }
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::Relaxed);
    }

    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::Relaxed)
    }

    // Raw write, bypasses increment semantics
    pub fn set(&self, path: &str, value: Value) {
        self.values.insert(path.to_string(), value);
    }

    pub fn get(&self, path: &str) -> Option<Value> {
        self.values.get(path).map(|v| v.clone())
    }

    fn ensure_available(&self) -> Result<(), StoreError> {
        if self.is_available() {
            Ok(())
        } else {
            Err(StoreError::Unavailable)
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CounterStore for MemoryStore {
    async fn read_namespace(&self, namespace: Namespace) -> Result<Value, StoreError> {
        self.ensure_available()?;

        let prefix = format!("{namespace}/");
        let fields: Map<String, Value> = self
            .values
            .iter()
            .filter_map(|entry| {
                entry
                    .key()
                    .strip_prefix(&prefix)
                    .map(|field| (field.to_string(), entry.value().clone()))
            })
            .collect();

        if fields.is_empty() {
            Ok(Value::Null)
        } else {
            Ok(Value::Object(fields))
        }
    }

    async fn increment(&self, target: &MetricTarget) -> Result<u64, StoreError> {
        self.ensure_available()?;

        let mut entry = self.values.entry(target.path()).or_insert(Value::Null);
        let next = coerce_count(Some(&*entry))
            .checked_add(1)
            .ok_or_else(|| StoreError::Overflow { path: target.path() })?;
        *entry = Value::from(next);
        Ok(next)
    }

    async fn probe(&self) -> Result<Value, StoreError> {
        self.ensure_available()?;

        self.set(PROBE_PATH, probe_document());
        self.get(PROBE_PATH).ok_or(StoreError::Protocol("probe document vanished"))
    }
}
