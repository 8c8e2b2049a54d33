//! Key-value stores the counter service can sit on

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

use super::CounterError;

/// Integer counters addressed by string keys
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Current values in key order, `None` for keys never written
    async fn get_many(&self, keys: &[String]) -> Result<Vec<Option<u64>>, CounterError>;

    /// Atomically add one and return the new value
    async fn incr(&self, key: &str) -> Result<u64, CounterError>;
}

/// In-process store for local runs and tests. Values die with the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: Arc<DashMap<String, u64>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CounterStore for MemoryStore {
    async fn get_many(&self, keys: &[String]) -> Result<Vec<Option<u64>>, CounterError> {
        Ok(keys
            .iter()
            .map(|key| self.values.get(key).map(|v| *v))
            .collect())
    }

    async fn incr(&self, key: &str) -> Result<u64, CounterError> {
        let mut entry = self.values.entry(key.to_string()).or_insert(0);
        *entry += 1;
        Ok(*entry)
    }
}
