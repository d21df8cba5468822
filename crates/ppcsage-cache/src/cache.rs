//! TTL cache over a `KvStore`.
//!
//! Entries are stored as JSON `CacheEntry` envelopes. Reads are lazy
//! evictors: an expired or undecodable entry is deleted and reported as a
//! miss. Each namespace is bounded by `max_entries`; the oldest entries
//! beyond the bound are evicted after every put.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, error, info, warn};

use ppcsage_core::{CacheConfig, Error, PageContext, ProcessedContent, Result};

use crate::clock::{Clock, SystemClock};
use crate::entry::{CacheEntry, Namespace};
use crate::store::KvStore;

/// Point-in-time cache statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    /// Bytes of model data held.
    pub model_cache_size: usize,
    /// Bytes of serialized results held.
    pub result_cache_size: usize,
    pub total_entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
    pub last_cleanup: Option<DateTime<Utc>>,
}

pub struct ExpiringCache {
    store: Arc<dyn KvStore>,
    clock: Arc<dyn Clock>,
    config: CacheConfig,
    hits: AtomicU64,
    misses: AtomicU64,
    last_cleanup: Mutex<Option<DateTime<Utc>>>,
}

impl ExpiringCache {
    pub fn new(store: Arc<dyn KvStore>, config: CacheConfig) -> Self {
        Self::with_clock(store, Arc::new(SystemClock), config)
    }

    pub fn with_clock(store: Arc<dyn KvStore>, clock: Arc<dyn Clock>, config: CacheConfig) -> Self {
        Self {
            store,
            clock,
            config,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            last_cleanup: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Deterministic key: `cache_` + SHA-256 hex of the content followed by
    /// the context's JSON.
    pub fn key_for(content: &str, context: &PageContext) -> String {
        let canonical = serde_json::to_string(context).unwrap_or_default();
        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        hasher.update(canonical.as_bytes());
        format!("cache_{}", hex::encode(hasher.finalize()))
    }

    /// Store `value` under `key`, replacing any existing entry. Storage
    /// failures are returned as `CacheUnavailable`.
    pub async fn put<T: Serialize>(
        &self,
        ns: Namespace,
        key: &str,
        value: &T,
        ttl_ms: i64,
    ) -> Result<()> {
        let entry = CacheEntry::new(value, self.clock.now_ms(), ttl_ms);
        let raw = serde_json::to_string(&entry)?;
        self.store
            .put(ns, key, raw)
            .await
            .map_err(|e| Error::CacheUnavailable(e.to_string()))?;
        debug!("Cached {}/{} (ttl {}ms)", ns, key, ttl_ms);

        if let Err(e) = self.enforce_capacity(ns, key).await {
            warn!("Capacity eviction in {} failed: {}", ns, e);
        }
        Ok(())
    }

    /// Value under `key` if present and unexpired. Read failures, decode
    /// failures and expired entries are all misses.
    pub async fn get<T: DeserializeOwned>(&self, ns: Namespace, key: &str) -> Option<T> {
        let raw = match self.store.get(ns, key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return self.miss(),
            Err(e) => {
                warn!("Cache read {}/{} failed, treating as miss: {}", ns, key, e);
                return self.miss();
            }
        };

        let entry: CacheEntry<T> = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Undecodable cache entry {}/{}: {}", ns, key, e);
                self.delete_quietly(ns, key).await;
                return self.miss();
            }
        };

        if !entry.is_valid(self.clock.now_ms()) {
            debug!("Cache entry {}/{} expired", ns, key);
            self.delete_quietly(ns, key).await;
            return self.miss();
        }

        self.hits.fetch_add(1, Ordering::Relaxed);
        Some(entry.data)
    }

    /// Remove every expired or undecodable entry in every namespace.
    /// Returns the number removed.
    pub async fn clear_expired(&self) -> Result<usize> {
        let now = self.clock.now_ms();
        let mut removed = 0;
        for ns in Namespace::ALL {
            for (key, raw) in self.store.list_all(ns).await? {
                let valid = serde_json::from_str::<CacheEntry<serde_json::Value>>(&raw)
                    .map(|entry| entry.is_valid(now))
                    .unwrap_or(false);
                if !valid {
                    self.store.delete(ns, &key).await?;
                    removed += 1;
                }
            }
        }
        *self.last_cleanup.lock() = Some(Utc::now());
        if removed > 0 {
            info!("Cleared {} expired cache entries", removed);
        }
        Ok(removed)
    }

    /// Wipe every namespace.
    pub async fn clear_all(&self) -> Result<()> {
        for ns in Namespace::ALL {
            self.store
                .clear(ns)
                .await
                .map_err(|e| Error::CacheUnavailable(e.to_string()))?;
        }
        info!("Cache cleared");
        Ok(())
    }

    /// Keys currently stored in `ns`, expired or not.
    pub async fn keys(&self, ns: Namespace) -> Result<Vec<String>> {
        Ok(self
            .store
            .list_all(ns)
            .await?
            .into_iter()
            .map(|(key, _)| key)
            .collect())
    }

    pub async fn put_result(&self, key: &str, content: &ProcessedContent) -> Result<()> {
        self.put(Namespace::Results, key, content, self.config.result_ttl_ms)
            .await
    }

    pub async fn get_result(&self, key: &str) -> Option<ProcessedContent> {
        self.get(Namespace::Results, key).await
    }

    /// Store model bytes, hex encoded.
    pub async fn put_model(&self, name: &str, bytes: &[u8]) -> Result<()> {
        self.put(Namespace::Models, name, &hex::encode(bytes), self.config.model_ttl_ms)
            .await
    }

    pub async fn get_model(&self, name: &str) -> Option<Vec<u8>> {
        let encoded: String = self.get(Namespace::Models, name).await?;
        match hex::decode(&encoded) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                warn!("Model {} is not valid hex: {}", name, e);
                self.delete_quietly(Namespace::Models, name).await;
                None
            }
        }
    }

    pub async fn stats(&self) -> Result<CacheStats> {
        let models = self.store.list_all(Namespace::Models).await?;
        let results = self.store.list_all(Namespace::Results).await?;

        let model_cache_size: usize = models
            .iter()
            .filter_map(|(_, raw)| serde_json::from_str::<CacheEntry<String>>(raw).ok())
            .map(|entry| entry.data.len() / 2)
            .sum();
        let result_cache_size: usize = results.iter().map(|(_, raw)| raw.len()).sum();

        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let lookups = hits + misses;
        Ok(CacheStats {
            model_cache_size,
            result_cache_size,
            total_entries: models.len() + results.len(),
            hits,
            misses,
            hit_rate: if lookups == 0 { 0.0 } else { hits as f64 / lookups as f64 },
            last_cleanup: *self.last_cleanup.lock(),
        })
    }

    /// Start the periodic `clear_expired` task. Returns `None` when the
    /// sweep interval is 0.
    pub fn spawn_sweeper(self: &Arc<Self>) -> Option<tokio::task::JoinHandle<()>> {
        if self.config.sweep_interval_secs == 0 {
            return None;
        }
        let cache = Arc::clone(self);
        let period = Duration::from_secs(self.config.sweep_interval_secs);
        Some(tokio::spawn(async move {
            info!("Cache sweeper started (every {}s)", period.as_secs());
            let mut ticker = tokio::time::interval(period);
            // The first tick completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if let Err(e) = cache.clear_expired().await {
                    error!("Cache sweep failed: {}", e);
                }
            }
        }))
    }

    fn miss<T>(&self) -> Option<T> {
        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    async fn delete_quietly(&self, ns: Namespace, key: &str) {
        if let Err(e) = self.store.delete(ns, key).await {
            warn!("Failed to delete cache entry {}/{}: {}", ns, key, e);
        }
    }

    /// Evict the oldest entries of `ns` beyond `max_entries`. `keep` is the
    /// key just written and is never evicted.
    async fn enforce_capacity(&self, ns: Namespace, keep: &str) -> Result<()> {
        let max = self.config.max_entries;
        if max == 0 {
            return Ok(());
        }
        let entries = self.store.list_all(ns).await?;
        if entries.len() <= max {
            return Ok(());
        }

        let mut aged: Vec<(i64, String)> = entries
            .into_iter()
            .filter(|(key, _)| key != keep)
            .map(|(key, raw)| {
                let timestamp = serde_json::from_str::<CacheEntry<serde_json::Value>>(&raw)
                    .map(|entry| entry.timestamp)
                    .unwrap_or(i64::MIN);
                (timestamp, key)
            })
            .collect();
        aged.sort();

        // `keep` occupies one slot.
        let excess = (aged.len() + 1).saturating_sub(max);
        for (_, key) in aged.into_iter().take(excess) {
            self.store.delete(ns, &key).await?;
        }
        debug!("Evicted {} entries from {}", excess, ns);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::sqlite::SqliteStore;
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use ppcsage_core::{ContentLength, OutputFormat, PageType};

    fn cache_with_clock(config: CacheConfig) -> (ExpiringCache, Arc<MemoryStore>, Arc<ManualClock>) {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(1_000_000));
        let cache = ExpiringCache::with_clock(store.clone(), clock.clone(), config);
        (cache, store, clock)
    }

    fn context(keywords: &[&str]) -> PageContext {
        PageContext::new(
            PageType::ExecutiveSummary,
            keywords,
            &["phase1"],
            ContentLength::Brief,
            OutputFormat::Summary,
        )
    }

    #[tokio::test]
    async fn test_round_trip() {
        let (cache, _, _) = cache_with_clock(CacheConfig::default());
        cache.put(Namespace::Results, "k", &vec![1, 2, 3], 1_000).await.unwrap();
        let got: Option<Vec<i32>> = cache.get(Namespace::Results, "k").await;
        assert_eq!(got, Some(vec![1, 2, 3]));
    }

    #[tokio::test]
    async fn test_expiry_deletes_on_read() {
        let (cache, _, clock) = cache_with_clock(CacheConfig::default());
        cache.put(Namespace::Results, "k", &"v", 500).await.unwrap();

        clock.advance(500);
        assert_eq!(cache.get::<String>(Namespace::Results, "k").await.as_deref(), Some("v"));

        clock.advance(1);
        assert!(cache.get::<String>(Namespace::Results, "k").await.is_none());
        assert!(cache.keys(Namespace::Results).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_decode_failure_is_miss_and_deleted() {
        let (cache, store, _) = cache_with_clock(CacheConfig::default());
        store.put(Namespace::Results, "bad", "{not json".into()).await.unwrap();

        assert!(cache.get::<String>(Namespace::Results, "bad").await.is_none());
        assert!(store.get(Namespace::Results, "bad").await.unwrap().is_none());

        // Well-formed JSON of the wrong shape is also a decode failure.
        cache.put(Namespace::Results, "shape", &42, 1_000).await.unwrap();
        assert!(cache.get::<Vec<String>>(Namespace::Results, "shape").await.is_none());
    }

    #[tokio::test]
    async fn test_clear_expired_across_namespaces() {
        let (cache, store, clock) = cache_with_clock(CacheConfig::default());
        cache.put(Namespace::Results, "short", &1, 100).await.unwrap();
        cache.put(Namespace::Results, "long", &2, 10_000).await.unwrap();
        cache.put(Namespace::Models, "m", &"00", 100).await.unwrap();
        store.put(Namespace::Models, "junk", "???".into()).await.unwrap();

        clock.advance(1_000);
        assert_eq!(cache.clear_expired().await.unwrap(), 3);
        assert_eq!(cache.keys(Namespace::Results).await.unwrap(), vec!["long"]);
        assert!(cache.keys(Namespace::Models).await.unwrap().is_empty());
        assert!(cache.stats().await.unwrap().last_cleanup.is_some());
    }

    #[tokio::test]
    async fn test_capacity_evicts_oldest() {
        let config = CacheConfig {
            max_entries: 2,
            ..CacheConfig::default()
        };
        let (cache, _, clock) = cache_with_clock(config);
        for key in ["a", "b", "c"] {
            cache.put(Namespace::Results, key, &key, 60_000).await.unwrap();
            clock.advance(10);
        }
        assert_eq!(cache.keys(Namespace::Results).await.unwrap(), vec!["b", "c"]);
    }

    #[tokio::test]
    async fn test_capacity_never_evicts_fresh_write_on_timestamp_tie() {
        let config = CacheConfig {
            max_entries: 1,
            ..CacheConfig::default()
        };
        let (cache, _, _) = cache_with_clock(config);
        cache.put(Namespace::Results, "b", &"old", 60_000).await.unwrap();
        cache.put(Namespace::Results, "a", &"new", 60_000).await.unwrap();

        assert_eq!(
            cache.get::<String>(Namespace::Results, "a").await.as_deref(),
            Some("new")
        );
        assert_eq!(cache.keys(Namespace::Results).await.unwrap(), vec!["a"]);
    }

    #[tokio::test]
    async fn test_key_for_is_deterministic() {
        let ctx = context(&["budget", "roi"]);
        let a = ExpiringCache::key_for("some content", &ctx);
        let b = ExpiringCache::key_for("some content", &ctx);
        assert_eq!(a, b);
        assert!(a.starts_with("cache_"));
        assert_eq!(a.len(), "cache_".len() + 64);

        assert_ne!(a, ExpiringCache::key_for("other content", &ctx));
        assert_ne!(a, ExpiringCache::key_for("some content", &context(&["budget"])));
    }

    #[tokio::test]
    async fn test_model_bytes_round_trip_and_stats() {
        let (cache, _, _) = cache_with_clock(CacheConfig::default());
        cache.put_model("tiny-model", &[0xde, 0xad, 0xbe, 0xef]).await.unwrap();
        assert_eq!(cache.get_model("tiny-model").await, Some(vec![0xde, 0xad, 0xbe, 0xef]));
        assert!(cache.get_model("absent").await.is_none());

        let stats = cache.stats().await.unwrap();
        assert_eq!(stats.model_cache_size, 4);
        assert_eq!(stats.total_entries, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert!((stats.hit_rate - 0.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_result_ttl_applied() {
        let (cache, _, clock) = cache_with_clock(CacheConfig::default());
        let content = ProcessedContent {
            summary: "Summary.".into(),
            insights: Vec::new(),
            entities: Vec::new(),
            relevance_score: 0.5,
            confidence: 0.25,
            sources: vec!["phase1".into()],
            processed_at: Utc::now(),
        };
        cache.put_result("r", &content).await.unwrap();
        clock.advance(ppcsage_core::config::DEFAULT_RESULT_TTL_MS);
        assert_eq!(cache.get_result("r").await, Some(content));
        clock.advance(1);
        assert!(cache.get_result("r").await.is_none());
    }

    #[tokio::test]
    async fn test_over_sqlite_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(SqliteStore::open(dir.path().join("cache.db")).unwrap());
        let clock = Arc::new(ManualClock::new(0));
        let cache = ExpiringCache::with_clock(store, clock.clone(), CacheConfig::default());

        cache.put(Namespace::Results, "k", &"v1", 100).await.unwrap();
        cache.put(Namespace::Results, "k", &"v2", 100).await.unwrap();
        assert_eq!(cache.get::<String>(Namespace::Results, "k").await.as_deref(), Some("v2"));

        clock.advance(101);
        assert!(cache.get::<String>(Namespace::Results, "k").await.is_none());
        assert!(cache.keys(Namespace::Results).await.unwrap().is_empty());

        cache.put(Namespace::Models, "m", &"ab", 100).await.unwrap();
        cache.clear_all().await.unwrap();
        assert_eq!(cache.stats().await.unwrap().total_entries, 0);
    }

    #[tokio::test]
    async fn test_sweeper_removes_expired() {
        let disabled = CacheConfig {
            sweep_interval_secs: 0,
            ..CacheConfig::default()
        };
        let (cache, _, _) = cache_with_clock(disabled);
        assert!(Arc::new(cache).spawn_sweeper().is_none());

        let config = CacheConfig {
            sweep_interval_secs: 1,
            ..CacheConfig::default()
        };
        let (cache, _, clock) = cache_with_clock(config);
        let cache = Arc::new(cache);
        cache.put(Namespace::Results, "stale", &1, 10).await.unwrap();
        clock.advance(100);

        let handle = cache.spawn_sweeper().unwrap();
        tokio::time::sleep(Duration::from_millis(1_300)).await;
        handle.abort();
        assert!(cache.keys(Namespace::Results).await.unwrap().is_empty());
    }

    struct FailingStore;

    #[async_trait]
    impl KvStore for FailingStore {
        async fn put(&self, _: Namespace, _: &str, _: String) -> Result<()> {
            Err(Error::Database("disk full".into()))
        }
        async fn get(&self, _: Namespace, _: &str) -> Result<Option<String>> {
            Err(Error::Database("disk gone".into()))
        }
        async fn delete(&self, _: Namespace, _: &str) -> Result<()> {
            Err(Error::Database("disk gone".into()))
        }
        async fn list_all(&self, _: Namespace) -> Result<Vec<(String, String)>> {
            Err(Error::Database("disk gone".into()))
        }
        async fn clear(&self, _: Namespace) -> Result<()> {
            Err(Error::Database("disk gone".into()))
        }
    }

    #[tokio::test]
    async fn test_write_failure_surfaces_read_failure_misses() {
        let cache = ExpiringCache::new(Arc::new(FailingStore), CacheConfig::default());
        assert!(matches!(
            cache.put(Namespace::Results, "k", &1, 100).await,
            Err(Error::CacheUnavailable(_))
        ));
        assert!(cache.get::<i32>(Namespace::Results, "k").await.is_none());
    }
}
