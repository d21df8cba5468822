//! Page kinds and the per-page processing context.

use serde::{Deserialize, Serialize};

/// Report page that content is being processed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PageType {
    ExecutiveSummary,
    CompetitiveAnalysis,
    MarketOpportunities,
    StrategicPositioning,
    ImplementationPlan,
    BudgetAllocation,
    RiskAssessment,
    KeywordStrategy,
}

impl PageType {
    pub const ALL: [PageType; 8] = [
        Self::ExecutiveSummary,
        Self::CompetitiveAnalysis,
        Self::MarketOpportunities,
        Self::StrategicPositioning,
        Self::ImplementationPlan,
        Self::BudgetAllocation,
        Self::RiskAssessment,
        Self::KeywordStrategy,
    ];

    /// Kebab-case identifier, as used on the wire and in insight sources.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExecutiveSummary => "executive-summary",
            Self::CompetitiveAnalysis => "competitive-analysis",
            Self::MarketOpportunities => "market-opportunities",
            Self::StrategicPositioning => "strategic-positioning",
            Self::ImplementationPlan => "implementation-plan",
            Self::BudgetAllocation => "budget-allocation",
            Self::RiskAssessment => "risk-assessment",
            Self::KeywordStrategy => "keyword-strategy",
        }
    }

    /// Parse a kebab-case identifier.
    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|p| p.as_str() == slug)
    }
}

impl std::fmt::Display for PageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How much text a page wants; drives the length term of relevance scoring
/// and the summary budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentLength {
    Brief,
    Detailed,
    Comprehensive,
}

impl ContentLength {
    /// Maximum summary length in characters.
    pub fn summary_chars(&self) -> usize {
        match self {
            Self::Brief => 150,
            Self::Detailed => 250,
            Self::Comprehensive => 350,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Summary,
    Bullets,
    Insights,
    Metrics,
}

/// Immutable description of what "relevant" means for one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageContext {
    pub page_type: PageType,
    /// Focus terms, matched case-insensitively as substrings.
    pub focus_keywords: Vec<String>,
    /// Phase (document) ids that feed this page, in priority order.
    pub relevant_phases: Vec<String>,
    pub content_length: ContentLength,
    pub output_format: OutputFormat,
}

impl PageContext {
    pub fn new(
        page_type: PageType,
        focus_keywords: &[&str],
        relevant_phases: &[&str],
        content_length: ContentLength,
        output_format: OutputFormat,
    ) -> Self {
        Self {
            page_type,
            focus_keywords: focus_keywords.iter().map(|s| s.to_string()).collect(),
            relevant_phases: relevant_phases.iter().map(|s| s.to_string()).collect(),
            content_length,
            output_format,
        }
    }
}
