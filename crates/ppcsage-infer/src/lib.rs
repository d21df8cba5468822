//! PPCSage Infer: summarization and insight classification capabilities.
//!
//! The `Summarizer` and `Classifier` traits abstract over the models that
//! would turn research text into page copy. The defaults are heuristic:
//! `ExtractiveSummarizer` stitches leading sentences together and
//! `KeywordClassifier` applies the priority-ordered keyword rules. A model
//! backed implementation can be dropped in at construction time.

pub mod classifier;
pub mod summarizer;

pub use classifier::{Classifier, KeywordClassifier};
pub use summarizer::{ExtractiveSummarizer, NoopSummarizer, Summarizer};

use std::sync::Arc;

/// Create the default summarizer.
pub fn create_summarizer() -> Arc<dyn Summarizer> {
    let summarizer = ExtractiveSummarizer::default();
    tracing::info!("Using {} summarizer", summarizer.name());
    Arc::new(summarizer)
}

/// Create the default insight classifier.
pub fn create_classifier() -> Arc<dyn Classifier> {
    let classifier = KeywordClassifier;
    tracing::info!("Using {} classifier", classifier.name());
    Arc::new(classifier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_available() {
        assert!(create_summarizer().is_available());
        assert_eq!(create_classifier().name(), "keyword");
    }
}
