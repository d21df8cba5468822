//! Regex entity extraction: money, percentages, durations, organizations,
//! recommendation phrases.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

use ppcsage_core::{Entity, EntityKind};

use crate::char_window;

/// Characters of context kept on each side of a match.
pub const CONTEXT_RADIUS: usize = 50;

static CURRENCY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$(?:\d{1,3}(?:,\d{3})+|\d+)(?:\.\d+)?").unwrap());
static PERCENTAGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+(?:\.\d+)?%").unwrap());
static DURATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b\d+\s+(?:day|week|month|year)s?\b").unwrap());
static ORGANIZATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Z][A-Za-z0-9&]*(?:\s+[A-Z][A-Za-z0-9&]*)*\s+(?:Inc\.|Corp\.|LLC\b|Ltd\.|Co\.)")
        .unwrap()
});
static RECOMMENDATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:recommend(?:s|ed|ation|ations)?|should|needs?\s+to)\s+[^.!?\n]+").unwrap()
});

/// One regex pass. Confidence is fixed per pass and reflects how
/// unambiguous the pattern is.
struct Pass {
    regex: &'static Lazy<Regex>,
    kind: EntityKind,
    confidence: f64,
}

static PASSES: [Pass; 5] = [
    Pass { regex: &CURRENCY, kind: EntityKind::Budget, confidence: 0.8 },
    Pass { regex: &PERCENTAGE, kind: EntityKind::Metric, confidence: 0.9 },
    Pass { regex: &DURATION, kind: EntityKind::Timeline, confidence: 0.7 },
    Pass { regex: &ORGANIZATION, kind: EntityKind::Competitor, confidence: 0.6 },
    Pass { regex: &RECOMMENDATION, kind: EntityKind::Recommendation, confidence: 0.75 },
];

/// Extract entities from `text`, at most `max` of them.
///
/// Results are grouped by pass (budget, metric, timeline, competitor,
/// recommendation) and in order of appearance within each pass.
pub fn extract_entities(text: &str, max: usize) -> Vec<Entity> {
    if text.trim().is_empty() {
        trace!("extract_entities: empty input");
        return Vec::new();
    }

    let mut entities = Vec::new();
    for pass in PASSES.iter() {
        for m in pass.regex.find_iter(text) {
            if entities.len() >= max {
                return entities;
            }
            entities.push(Entity {
                text: m.as_str().trim().to_string(),
                kind: pass.kind,
                confidence: pass.confidence,
                context: char_window(text, m.start(), m.end(), CONTEXT_RADIUS)
                    .trim()
                    .to_string(),
            });
        }
    }
    entities
}

/// Number of entities in `text`, stopping once `cap` is reached.
pub fn count_entities(text: &str, cap: usize) -> usize {
    let mut count = 0;
    for pass in PASSES.iter() {
        count += pass.regex.find_iter(text).take(cap - count).count();
        if count >= cap {
            return cap;
        }
    }
    count
}
