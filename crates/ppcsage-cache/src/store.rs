//! Namespaced key-value storage boundary.

use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::Mutex;

use ppcsage_core::Result;

use crate::entry::Namespace;

/// Minimal async storage contract the cache depends on. Values are opaque
/// strings. A `put` replaces any existing value for the key in one step.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn put(&self, ns: Namespace, key: &str, value: String) -> Result<()>;

    async fn get(&self, ns: Namespace, key: &str) -> Result<Option<String>>;

    async fn delete(&self, ns: Namespace, key: &str) -> Result<()>;

    /// Every `(key, value)` pair in the namespace, ordered by key.
    async fn list_all(&self, ns: Namespace) -> Result<Vec<(String, String)>>;

    async fn clear(&self, ns: Namespace) -> Result<()>;
}

/// In-process store.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<(Namespace, String), String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn put(&self, ns: Namespace, key: &str, value: String) -> Result<()> {
        self.entries.lock().insert((ns, key.to_string()), value);
        Ok(())
    }

    async fn get(&self, ns: Namespace, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().get(&(ns, key.to_string())).cloned())
    }

    async fn delete(&self, ns: Namespace, key: &str) -> Result<()> {
        self.entries.lock().remove(&(ns, key.to_string()));
        Ok(())
    }

    async fn list_all(&self, ns: Namespace) -> Result<Vec<(String, String)>> {
        Ok(self
            .entries
            .lock()
            .iter()
            .filter(|((n, _), _)| *n == ns)
            .map(|((_, k), v)| (k.clone(), v.clone()))
            .collect())
    }

    async fn clear(&self, ns: Namespace) -> Result<()> {
        self.entries.lock().retain(|(n, _), _| *n != ns);
        Ok(())
    }
}
