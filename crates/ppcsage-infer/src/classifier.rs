//! Insight classifier trait and the keyword-rule default.

use ppcsage_core::InsightKind;
use ppcsage_extract::classify_insight;

/// Trait for insight classification backends.
pub trait Classifier: Send + Sync {
    /// Assign exactly one category to a sentence.
    fn classify(&self, sentence: &str) -> InsightKind;

    fn name(&self) -> &'static str;
}

/// Priority-ordered keyword rules: recommendation, opportunity, threat,
/// then finding.
pub struct KeywordClassifier;

impl Classifier for KeywordClassifier {
    fn classify(&self, sentence: &str) -> InsightKind {
        classify_insight(sentence)
    }

    fn name(&self) -> &'static str {
        "keyword"
    }
}
