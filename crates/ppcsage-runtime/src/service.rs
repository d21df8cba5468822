//! Cached, timeout-guarded content processing for async callers.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use ppcsage_cache::{ExpiringCache, SqliteStore};
use ppcsage_core::{
    DocumentSet, Error, PageContext, PageInsights, PageType, PpcSageConfig, ProcessedContent,
    Result,
};

use crate::orchestrator::Orchestrator;

/// Front door for page content: result cache lookup, processing on the
/// blocking pool under a timeout, cache write.
pub struct ContentService {
    orchestrator: Arc<Orchestrator>,
    cache: Arc<ExpiringCache>,
    timeout: Duration,
}

impl ContentService {
    pub fn new(orchestrator: Arc<Orchestrator>, cache: Arc<ExpiringCache>, timeout: Duration) -> Self {
        Self {
            orchestrator,
            cache,
            timeout,
        }
    }

    /// Build the service with a SQLite-backed cache under `config.data_dir`.
    pub fn from_config(config: &PpcSageConfig) -> Result<Self> {
        config.processing.validate()?;
        let store = SqliteStore::open(config.cache_db_path())?;
        let cache = ExpiringCache::new(Arc::new(store), config.cache.clone());
        let orchestrator = Orchestrator::new(config.processing.clone());
        info!(
            "ContentService ready: cache at {}, timeout {}ms",
            config.cache_db_path().display(),
            config.processing_timeout_ms
        );
        Ok(Self::new(
            Arc::new(orchestrator),
            Arc::new(cache),
            Duration::from_millis(config.processing_timeout_ms),
        ))
    }

    pub fn orchestrator(&self) -> &Arc<Orchestrator> {
        &self.orchestrator
    }

    pub fn cache(&self) -> &Arc<ExpiringCache> {
        &self.cache
    }

    /// Processed content for a page type from the context table.
    pub async fn page_content(
        &self,
        page_type: PageType,
        documents: DocumentSet,
    ) -> Result<ProcessedContent> {
        let context = self
            .orchestrator
            .get_context(page_type)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("No context defined for page type: {}", page_type)))?;
        Ok(self.summarize(documents, context).await)
    }

    /// Processed content for `context`. Never fails: a timeout or a failed
    /// processing task yields truncation-based fallback content, and a
    /// failed cache write only logs.
    pub async fn summarize(&self, documents: DocumentSet, context: PageContext) -> ProcessedContent {
        let key = ExpiringCache::key_for(
            &self.orchestrator.source_text(&documents, &context),
            &context,
        );
        if let Some(hit) = self.cache.get_result(&key).await {
            debug!("Result cache hit for {}", context.page_type);
            return hit;
        }

        let documents = Arc::new(documents);
        let context = Arc::new(context);
        match self.process(Arc::clone(&documents), Arc::clone(&context)).await {
            Ok(content) => {
                if let Err(e) = self.cache.put_result(&key, &content).await {
                    warn!("Failed to cache result for {}: {}", context.page_type, e);
                }
                content
            }
            Err(e) => {
                warn!(
                    "Processing for {} failed, using fallback content: {}",
                    context.page_type, e
                );
                self.orchestrator.fallback_content(&documents, &context)
            }
        }
    }

    /// Page insights, computed on the blocking pool under the timeout. Only
    /// an unknown page type is an error; a timeout or a failed task yields
    /// the fallback summary with empty lists.
    pub async fn page_insights(
        &self,
        page_type: PageType,
        documents: DocumentSet,
    ) -> Result<PageInsights> {
        let context = self
            .orchestrator
            .get_context(page_type)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("No context defined for page type: {}", page_type)))?;

        let documents = Arc::new(documents);
        let orchestrator = Arc::clone(&self.orchestrator);
        let task_documents = Arc::clone(&documents);
        let task = tokio::task::spawn_blocking(move || {
            orchestrator.page_insights(page_type, &task_documents)
        });
        let failure = match tokio::time::timeout(self.timeout, task).await {
            Ok(Ok(result)) => return result,
            Ok(Err(e)) => Error::Internal(format!("insight task failed: {}", e)),
            Err(_) => Error::ExtractionTimeout(self.timeout_ms()),
        };
        warn!(
            "Insights for {} failed, using fallback content: {}",
            page_type, failure
        );
        Ok(PageInsights {
            summary: self.orchestrator.fallback_content(&documents, &context).summary,
            key_findings: Vec::new(),
            recommendations: Vec::new(),
            metrics: Vec::new(),
            competitors: Vec::new(),
            risks: Vec::new(),
        })
    }

    async fn process(
        &self,
        documents: Arc<DocumentSet>,
        context: Arc<PageContext>,
    ) -> Result<ProcessedContent> {
        let orchestrator = Arc::clone(&self.orchestrator);
        let task = tokio::task::spawn_blocking(move || orchestrator.summarize(&documents, &context));
        match tokio::time::timeout(self.timeout, task).await {
            Ok(Ok(content)) => Ok(content),
            Ok(Err(e)) => Err(Error::Internal(format!("processing task failed: {}", e))),
            Err(_) => Err(Error::ExtractionTimeout(self.timeout_ms())),
        }
    }

    fn timeout_ms(&self) -> u64 {
        u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use ppcsage_cache::{KvStore, MemoryStore, Namespace};
    use ppcsage_core::{CacheConfig, ProcessingRules, RawDocument};
    use ppcsage_infer::{ExtractiveSummarizer, Summarizer};

    struct CountingSummarizer {
        calls: Arc<AtomicUsize>,
    }

    impl Summarizer for CountingSummarizer {
        fn summarize(&self, text: &str, max_chars: usize) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            ExtractiveSummarizer::default().summarize(text, max_chars)
        }
        fn name(&self) -> &'static str {
            "counting"
        }
        fn is_available(&self) -> bool {
            true
        }
    }

    struct SlowSummarizer;

    impl Summarizer for SlowSummarizer {
        fn summarize(&self, text: &str, _max_chars: usize) -> Result<String> {
            std::thread::sleep(Duration::from_millis(300));
            Ok(text.to_string())
        }
        fn name(&self) -> &'static str {
            "slow"
        }
        fn is_available(&self) -> bool {
            true
        }
    }

    /// Reads work, writes fail.
    struct ReadOnlyStore;

    #[async_trait]
    impl KvStore for ReadOnlyStore {
        async fn put(&self, _: Namespace, _: &str, _: String) -> Result<()> {
            Err(Error::Database("read-only".into()))
        }
        async fn get(&self, _: Namespace, _: &str) -> Result<Option<String>> {
            Ok(None)
        }
        async fn delete(&self, _: Namespace, _: &str) -> Result<()> {
            Ok(())
        }
        async fn list_all(&self, _: Namespace) -> Result<Vec<(String, String)>> {
            Ok(Vec::new())
        }
        async fn clear(&self, _: Namespace) -> Result<()> {
            Ok(())
        }
    }

    fn documents() -> DocumentSet {
        let mut docs = DocumentSet::new();
        docs.insert(
            "phase1".into(),
            RawDocument::new(
                "# Highlights\nThe budget covers search and social. ROI reached 180% in 6 months.",
            ),
        );
        docs
    }

    fn service(orchestrator: Orchestrator, store: Arc<dyn KvStore>, timeout: Duration) -> ContentService {
        let cache = ExpiringCache::new(store, CacheConfig::default());
        ContentService::new(Arc::new(orchestrator), Arc::new(cache), timeout)
    }

    #[tokio::test]
    async fn test_second_call_served_from_cache() {
        let calls = Arc::new(AtomicUsize::new(0));
        let orchestrator = Orchestrator::new(ProcessingRules::default())
            .with_summarizer(Arc::new(CountingSummarizer { calls: calls.clone() }));
        let svc = service(orchestrator, Arc::new(MemoryStore::new()), Duration::from_secs(10));

        let first = svc
            .page_content(PageType::ExecutiveSummary, documents())
            .await
            .unwrap();
        let second = svc
            .page_content(PageType::ExecutiveSummary, documents())
            .await
            .unwrap();

        assert_eq!(first.summary, second.summary);
        assert_eq!(first.processed_at, second.processed_at);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(svc.cache().keys(Namespace::Results).await.unwrap().len(), 1);
        assert_eq!(svc.cache().stats().await.unwrap().hits, 1);
    }

    #[tokio::test]
    async fn test_timeout_falls_back_without_caching() {
        let orchestrator =
            Orchestrator::new(ProcessingRules::default()).with_summarizer(Arc::new(SlowSummarizer));
        let svc = service(orchestrator, Arc::new(MemoryStore::new()), Duration::from_millis(20));

        let content = svc
            .page_content(PageType::ExecutiveSummary, documents())
            .await
            .unwrap();
        assert!(content.insights.is_empty());
        assert_eq!(content.relevance_score, 0.0);
        assert_eq!(content.sources, vec!["phase1"]);
        assert!(content.summary.starts_with("Highlights"));
        assert!(svc.cache().keys(Namespace::Results).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_insights_timeout_falls_back() {
        let orchestrator =
            Orchestrator::new(ProcessingRules::default()).with_summarizer(Arc::new(SlowSummarizer));
        let svc = service(orchestrator, Arc::new(MemoryStore::new()), Duration::from_millis(20));

        let page = svc
            .page_insights(PageType::ExecutiveSummary, documents())
            .await
            .unwrap();
        assert!(page.summary.starts_with("Highlights"));
        assert!(page.key_findings.is_empty() && page.recommendations.is_empty());
        assert!(page.metrics.is_empty() && page.competitors.is_empty() && page.risks.is_empty());
    }

    #[tokio::test]
    async fn test_cache_write_failure_still_returns_content() {
        let svc = service(
            Orchestrator::new(ProcessingRules::default()),
            Arc::new(ReadOnlyStore),
            Duration::from_secs(10),
        );
        let content = svc
            .page_content(PageType::ExecutiveSummary, documents())
            .await
            .unwrap();
        assert!(content.relevance_score > 0.0);
        assert!(!content.entities.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_page_not_found() {
        let svc = service(
            Orchestrator::new(ProcessingRules::default()),
            Arc::new(MemoryStore::new()),
            Duration::from_secs(10),
        );
        let result = svc.page_content(PageType::KeywordStrategy, documents()).await;
        assert!(matches!(result, Err(Error::NotFound(_))));
        let insights = svc.page_insights(PageType::KeywordStrategy, documents()).await;
        assert!(matches!(insights, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_from_config_uses_sqlite_cache() {
        let dir = tempfile::tempdir().unwrap();
        let config = PpcSageConfig {
            data_dir: dir.path().to_path_buf(),
            ..PpcSageConfig::default()
        };
        let svc = ContentService::from_config(&config).unwrap();
        svc.page_content(PageType::ExecutiveSummary, documents())
            .await
            .unwrap();

        assert!(config.cache_db_path().exists());
        assert_eq!(svc.cache().keys(Namespace::Results).await.unwrap().len(), 1);

        let page = svc
            .page_insights(PageType::ExecutiveSummary, documents())
            .await
            .unwrap();
        assert!(page.metrics.iter().any(|m| m.value == "180%"));
    }
}
