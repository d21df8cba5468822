//! Page-report extraction: named metrics, competitor profiles, risks.

use once_cell::sync::Lazy;
use regex::Regex;

use ppcsage_core::{
    CompetitorInsight, EntityKind, ExtractedMetric, InsightKind, MetricKind, RiskInsight,
    RiskLevel,
};

use crate::{char_window, truncate_chars};
use crate::classify::classify_insight;
use crate::entities::extract_entities;
use crate::sentences::SentenceSegmenter;

const SOURCE_RADIUS: usize = 30;
const NAME_WORDS: usize = 3;
const DEFAULT_MITIGATION: &str = "Develop mitigation strategy";

static METRIC_VALUE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?P<pct>\d+(?:\.\d+)?%)|(?P<money>\$(?:\d{1,3}(?:,\d{3})+|\d+)(?:\.\d+)?)|(?P<span>\b\d+\s+(?:day|week|month|year)s?\b)",
    )
    .unwrap()
});
static CONNECTORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:is|are|was|were|of|at|by|to|and|the|a|an|over|for|from|about|=)$").unwrap());

static STRENGTH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:strong|leader|leading|dominat\w*|advantages?|excellent|popular|established)\b").unwrap()
});
static WEAKNESS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:weak\w*|lacks?|lacking|limited|poor|slow|expensive|outdated)\b").unwrap()
});
static GAP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:opportunit(?:y|ies)|gaps?|underserved|potential|untapped)\b").unwrap()
});

static HIGH_IMPACT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:significant|major|critical|severe|substantial)\b").unwrap());
static LOW_IMPACT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:minor|small|slight|negligible)\b").unwrap());
static HIGH_LIKELIHOOD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:likely|frequent|often|common|probable|expected)\b").unwrap());
static LOW_LIKELIHOOD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:unlikely|rare|rarely|seldom|occasional)\b").unwrap());
static MITIGATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:mitigat\w*|reduc\w*|prevent\w*|address\w*|monitor\w*|hedg\w*)\b").unwrap()
});

/// Named metric values: percentages (performance, or ROI when the name or
/// the following words mention it), currency amounts (budget), durations
/// (timeline). The name is up to three words preceding the value within the
/// same clause.
pub fn extract_metrics(text: &str, max: usize) -> Vec<ExtractedMetric> {
    let mut metrics = Vec::new();
    for caps in METRIC_VALUE.captures_iter(text) {
        if metrics.len() >= max {
            break;
        }
        let Some(whole) = caps.get(0) else { continue };
        let name = metric_name(&text[..whole.start()]);

        let (kind, confidence, fallback_name) = if caps.name("pct").is_some() {
            let after = truncate_chars(&text[whole.end()..], 12);
            let roi = name.to_lowercase().contains("roi") || after.to_lowercase().contains("roi");
            if roi {
                (MetricKind::Roi, 0.85, "roi")
            } else {
                (MetricKind::Performance, 0.9, "performance")
            }
        } else if caps.name("money").is_some() {
            (MetricKind::Budget, 0.8, "budget")
        } else {
            (MetricKind::Timeline, 0.8, "timeline")
        };

        metrics.push(ExtractedMetric {
            name: if name.is_empty() { fallback_name.to_string() } else { name },
            value: whole.as_str().to_string(),
            kind,
            confidence,
            source: char_window(text, whole.start(), whole.end(), SOURCE_RADIUS)
                .trim()
                .to_string(),
        });
    }
    metrics
}

fn metric_name(before: &str) -> String {
    let clause_start = before
        .rfind(|c: char| matches!(c, '.' | '!' | '?' | '\n' | ';' | ',' | '('))
        .map(|i| i + 1)
        .unwrap_or(0);
    let mut words: Vec<String> = before[clause_start..]
        .split_whitespace()
        .map(|w| {
            w.trim_matches(|c: char| !c.is_alphanumeric() && c != '-')
                .to_string()
        })
        .filter(|w| !w.is_empty())
        .collect();
    while words.last().map(|w| CONNECTORS.is_match(w)).unwrap_or(false) {
        words.pop();
    }
    let start = words.len().saturating_sub(NAME_WORDS);
    words[start..].join(" ")
}

/// Profiles for up to `max` organizations named in `text`.
pub fn extract_competitors(text: &str, max: usize) -> Vec<CompetitorInsight> {
    let sentences = SentenceSegmenter::default().segment(text);
    let mut competitors: Vec<CompetitorInsight> = Vec::new();

    for entity in extract_entities(text, usize::MAX)
        .into_iter()
        .filter(|e| e.kind == EntityKind::Competitor)
    {
        if competitors.len() >= max {
            break;
        }
        if competitors.iter().any(|c| c.name == entity.text) {
            continue;
        }
        let mentions: Vec<&String> = sentences.iter().filter(|s| s.contains(&entity.text)).collect();
        let pick = |re: &Regex| -> Vec<String> {
            mentions
                .iter()
                .filter(|s| re.is_match(s))
                .map(|s| s.to_string())
                .collect()
        };
        competitors.push(CompetitorInsight {
            strengths: pick(&STRENGTH),
            weaknesses: pick(&WEAKNESS),
            opportunities: pick(&GAP),
            name: entity.text,
            source: entity.context,
        });
    }
    competitors
}

/// Threat sentences rated for impact and likelihood, each paired with the
/// next mitigation-style sentence in the text.
pub fn extract_risks(text: &str, source: &str, max: usize) -> Vec<RiskInsight> {
    let sentences = SentenceSegmenter::default().segment(text);
    let mut risks = Vec::new();

    for (i, sentence) in sentences.iter().enumerate() {
        if risks.len() >= max {
            break;
        }
        if classify_insight(sentence) != InsightKind::Threat {
            continue;
        }
        let mitigation = sentences[i + 1..]
            .iter()
            .find(|s| MITIGATION.is_match(s))
            .cloned()
            .unwrap_or_else(|| DEFAULT_MITIGATION.to_string());
        risks.push(RiskInsight {
            risk: sentence.clone(),
            impact: rate(sentence, &HIGH_IMPACT, &LOW_IMPACT),
            likelihood: rate(sentence, &HIGH_LIKELIHOOD, &LOW_LIKELIHOOD),
            mitigation,
            source: source.to_string(),
        });
    }
    risks
}

fn rate(sentence: &str, high: &Regex, low: &Regex) -> RiskLevel {
    if low.is_match(sentence) {
        RiskLevel::Low
    } else if high.is_match(sentence) {
        RiskLevel::High
    } else {
        RiskLevel::Medium
    }
}
