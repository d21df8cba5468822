//! Insight classification by indicator words.

use once_cell::sync::Lazy;
use regex::Regex;

use ppcsage_core::InsightKind;

static RECOMMENDATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:recommend(?:s|ed|ation|ations)?|should|need to|must|ought to)\b").unwrap()
});
static OPPORTUNITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:opportunit(?:y|ies)|potential|growth|advantages?|benefits?|improve[sd]?)\b")
        .unwrap()
});
static THREAT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:risks?|threats?|challenges?|problems?|issues?|weakness(?:es)?|concerns?)\b")
        .unwrap()
});

/// Classify one sentence. First match wins, in the order
/// recommendation, opportunity, threat; anything else is a finding.
pub fn classify_insight(sentence: &str) -> InsightKind {
    if RECOMMENDATION.is_match(sentence) {
        InsightKind::Recommendation
    } else if OPPORTUNITY.is_match(sentence) {
        InsightKind::Opportunity
    } else if THREAT.is_match(sentence) {
        InsightKind::Threat
    } else {
        InsightKind::Finding
    }
}
