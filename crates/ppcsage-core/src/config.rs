//! Processing rules, cache settings and environment-driven configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};

pub const DEFAULT_MODEL_TTL_MS: i64 = 7 * 24 * 60 * 60 * 1000;
pub const DEFAULT_RESULT_TTL_MS: i64 = 24 * 60 * 60 * 1000;
pub const DEFAULT_PROCESSING_TIMEOUT_MS: u64 = 10_000;

/// Weights of the three relevance terms. The remainder up to 1.0 is unused.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub keyword_match: f64,
    pub length_fit: f64,
    pub entity_density: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            keyword_match: 0.4,
            length_fit: 0.3,
            entity_density: 0.2,
        }
    }
}

impl ScoringWeights {
    pub fn total(&self) -> f64 {
        self.keyword_match + self.length_fit + self.entity_density
    }
}

/// Thresholds and bounds for the text pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingRules {
    pub min_sentence_length: usize,
    pub max_sentence_length: usize,
    pub weights: ScoringWeights,
    /// Entity count at which the entity term saturates.
    pub entity_saturation: usize,
    pub min_section_relevance: f64,
    pub min_insight_relevance: f64,
    pub max_insights: usize,
    pub max_entities: usize,
    /// Characters of content handed to the summarizer.
    pub max_summary_input: usize,
}

impl Default for ProcessingRules {
    fn default() -> Self {
        Self {
            min_sentence_length: 10,
            max_sentence_length: 500,
            weights: ScoringWeights::default(),
            entity_saturation: 3,
            min_section_relevance: 0.3,
            min_insight_relevance: 0.6,
            max_insights: 10,
            max_entities: 20,
            max_summary_input: 1000,
        }
    }
}

impl ProcessingRules {
    /// Reject rule sets that would make scoring meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.min_sentence_length > self.max_sentence_length {
            return Err(Error::Config(format!(
                "min_sentence_length {} exceeds max_sentence_length {}",
                self.min_sentence_length, self.max_sentence_length
            )));
        }
        let w = &self.weights;
        if w.keyword_match < 0.0 || w.length_fit < 0.0 || w.entity_density < 0.0 {
            return Err(Error::Config("relevance weights must be non-negative".into()));
        }
        if w.total() > 1.0 + f64::EPSILON {
            return Err(Error::Config(format!(
                "relevance weights sum to {:.3}, must be <= 1",
                w.total()
            )));
        }
        if self.entity_saturation == 0 {
            return Err(Error::Config("entity_saturation must be at least 1".into()));
        }
        Ok(())
    }
}

/// Expiring cache settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub model_ttl_ms: i64,
    pub result_ttl_ms: i64,
    /// Per-namespace entry bound; oldest entries are evicted past it.
    pub max_entries: usize,
    /// Period of the background sweeper; 0 disables it. The sweeper only
    /// runs once a long-lived embedder calls `ExpiringCache::spawn_sweeper`;
    /// one-shot callers such as the CLI rely on lazy eviction and
    /// `clear_expired`.
    pub sweep_interval_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            model_ttl_ms: DEFAULT_MODEL_TTL_MS,
            result_ttl_ms: DEFAULT_RESULT_TTL_MS,
            max_entries: 100,
            sweep_interval_secs: 300,
        }
    }
}

/// Top-level PPCSage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PpcSageConfig {
    /// Directory holding the cache database.
    pub data_dir: PathBuf,
    pub processing: ProcessingRules,
    pub cache: CacheConfig,
    pub processing_timeout_ms: u64,
}

impl Default for PpcSageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            processing: ProcessingRules::default(),
            cache: CacheConfig::default(),
            processing_timeout_ms: DEFAULT_PROCESSING_TIMEOUT_MS,
        }
    }
}

impl PpcSageConfig {
    /// Load a JSON config file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: PpcSageConfig = serde_json::from_str(&raw)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        config.processing.validate()?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Build configuration from `PPCSAGE_CONFIG` (optional file), then
    /// `PPCSAGE_DATA_DIR` and `PPCSAGE_PROCESSING_TIMEOUT_MS` overrides.
    pub fn from_env() -> Result<Self> {
        let mut config = match std::env::var("PPCSAGE_CONFIG") {
            Ok(path) => Self::load(Path::new(&path))?,
            Err(_) => Self::default(),
        };

        if let Ok(dir) = std::env::var("PPCSAGE_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(ms) = std::env::var("PPCSAGE_PROCESSING_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.processing_timeout_ms = ms;
        }

        Ok(config)
    }

    /// Path of the SQLite cache database inside the data directory.
    pub fn cache_db_path(&self) -> PathBuf {
        self.data_dir.join("ppcsage-cache.db")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules_are_valid() {
        let rules = ProcessingRules::default();
        assert!(rules.validate().is_ok());
        assert!((rules.weights.total() - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_rejects_overweight() {
        let mut rules = ProcessingRules::default();
        rules.weights.keyword_match = 0.6;
        assert!(matches!(rules.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_load_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ppcsage.json");
        std::fs::write(
            &path,
            r#"{ "processing": { "max_insights": 3 }, "processing_timeout_ms": 250 }"#,
        )
        .unwrap();

        let config = PpcSageConfig::load(&path).unwrap();
        assert_eq!(config.processing.max_insights, 3);
        assert_eq!(config.processing.min_sentence_length, 10);
        assert_eq!(config.processing_timeout_ms, 250);
        assert_eq!(config.cache.max_entries, 100);
    }

    #[test]
    fn test_load_rejects_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(PpcSageConfig::load(&path), Err(Error::Config(_))));
    }
}
