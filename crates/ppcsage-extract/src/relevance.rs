//! Relevance of a text unit to a page context.
//!
//! score = w_k * keyword_fraction + w_l * length_fit + w_e * entity_density,
//! clamped to [0, 1]. Every threshold downstream (section filter, insight
//! filter) is expressed against this score.

use ppcsage_core::{clamp_unit, ContentLength, PageContext, ProcessingRules};

use crate::entities::count_entities;

/// Focus keywords occurring in `text` (case-insensitive substring match),
/// in context order.
pub fn keyword_matches<'a>(text: &str, context: &'a PageContext) -> Vec<&'a str> {
    let lower = text.to_lowercase();
    context
        .focus_keywords
        .iter()
        .filter(|kw| !kw.is_empty() && lower.contains(&kw.to_lowercase()))
        .map(String::as_str)
        .collect()
}

/// How well a text of `len` characters fits the requested content length.
///
/// brief: full marks under 200 chars, falling to 0 at 700.
/// detailed: full marks for 200..=800, otherwise triangular around 500.
/// comprehensive: rises linearly to full marks past 500.
pub fn length_score(len: usize, content_length: ContentLength) -> f64 {
    let len = len as f64;
    let score = match content_length {
        ContentLength::Brief => {
            if len < 200.0 {
                1.0
            } else {
                1.0 - (len - 200.0) / 500.0
            }
        }
        ContentLength::Detailed => {
            if (200.0..=800.0).contains(&len) {
                1.0
            } else {
                1.0 - (len - 500.0).abs() / 500.0
            }
        }
        ContentLength::Comprehensive => {
            if len > 500.0 {
                1.0
            } else {
                len / 500.0
            }
        }
    };
    clamp_unit(score)
}

/// Score `text` against `context`. Empty text or an empty keyword list
/// scores 0.
pub fn score_relevance(text: &str, context: &PageContext, rules: &ProcessingRules) -> f64 {
    let trimmed = text.trim();
    if trimmed.is_empty() || context.focus_keywords.is_empty() {
        return 0.0;
    }

    let matched = keyword_matches(trimmed, context).len();
    let keyword_score = clamp_unit(matched as f64 / context.focus_keywords.len() as f64);

    let length = length_score(trimmed.chars().count(), context.content_length);

    let saturation = rules.entity_saturation.max(1);
    let entity_score = count_entities(trimmed, saturation) as f64 / saturation as f64;

    let w = &rules.weights;
    clamp_unit(
        keyword_score * w.keyword_match + length * w.length_fit + entity_score * w.entity_density,
    )
}
