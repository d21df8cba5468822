//! Documents in, processed content out.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One pasted-back phase response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDocument {
    pub text: String,
}

impl RawDocument {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Phase id → document. Ordered so that iteration is deterministic.
pub type DocumentSet = BTreeMap<String, RawDocument>;

/// Clamp a score into [0, 1]. NaN maps to 0.
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Heading,
    Paragraph,
    List,
    Metric,
}

/// A titled slice of a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentSection {
    pub id: String,
    pub title: String,
    pub content: String,
    pub phase: String,
    pub relevance_score: f64,
    #[serde(rename = "type")]
    pub kind: SectionKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Competitor,
    Metric,
    Recommendation,
    Timeline,
    Budget,
    Keyword,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub text: String,
    #[serde(rename = "type")]
    pub kind: EntityKind,
    pub confidence: f64,
    /// Up to 50 characters either side of the match.
    pub context: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    Opportunity,
    Threat,
    Recommendation,
    Finding,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insight {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: InsightKind,
    pub content: String,
    pub relevance_score: f64,
    pub confidence: f64,
    /// Page the insight was produced for.
    pub source: String,
    pub phase: String,
    pub keywords: Vec<String>,
}

/// The unit returned to callers and stored in the result cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedContent {
    pub summary: String,
    pub insights: Vec<Insight>,
    pub entities: Vec<Entity>,
    pub relevance_score: f64,
    pub confidence: f64,
    pub sources: Vec<String>,
    pub processed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    Budget,
    Timeline,
    Performance,
    Roi,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedMetric {
    pub name: String,
    pub value: String,
    #[serde(rename = "type")]
    pub kind: MetricKind,
    pub confidence: f64,
    /// Surrounding text the metric was read from.
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitorInsight {
    pub name: String,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub opportunities: Vec<String>,
    pub source: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskInsight {
    pub risk: String,
    pub impact: RiskLevel,
    pub likelihood: RiskLevel,
    pub mitigation: String,
    pub source: String,
}

/// Page-level breakdown of the relevant content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInsights {
    pub summary: String,
    pub key_findings: Vec<String>,
    pub recommendations: Vec<String>,
    pub metrics: Vec<ExtractedMetric>,
    pub competitors: Vec<CompetitorInsight>,
    pub risks: Vec<RiskInsight>,
}

/// Sections selected for a page, best first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelevantContent {
    pub primary_content: String,
    pub supporting_content: Vec<String>,
    pub all_content: String,
    pub sections: Vec<ContentSection>,
}
