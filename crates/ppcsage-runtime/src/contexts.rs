//! The fixed table of page contexts.

use ppcsage_core::{ContentLength, OutputFormat, PageContext, PageType};

/// Page contexts built once at startup and read-only afterwards.
#[derive(Debug, Clone)]
pub struct ContextTable {
    contexts: Vec<PageContext>,
}

impl ContextTable {
    pub fn new() -> Self {
        let contexts = vec![
            PageContext::new(
                PageType::ExecutiveSummary,
                &[
                    "key findings",
                    "recommendations",
                    "roi",
                    "budget",
                    "timeline",
                    "success metrics",
                    "competitive advantage",
                    "strategy",
                    "overview",
                    "summary",
                    "highlights",
                ],
                &["phase1", "phase4", "phase5"],
                ContentLength::Brief,
                OutputFormat::Summary,
            ),
            PageContext::new(
                PageType::MarketOpportunities,
                &[
                    "opportunity",
                    "market gap",
                    "potential",
                    "growth",
                    "untapped market",
                    "niche",
                    "expansion",
                    "target audience",
                    "market size",
                    "demand",
                    "trends",
                    "emerging",
                ],
                &["phase1", "phase3", "phase4"],
                ContentLength::Detailed,
                OutputFormat::Insights,
            ),
            PageContext::new(
                PageType::CompetitiveAnalysis,
                &[
                    "competitors",
                    "competition",
                    "market position",
                    "advantages",
                    "weaknesses",
                    "differentiation",
                    "market share",
                    "positioning",
                    "competitive landscape",
                    "rivals",
                    "benchmarking",
                ],
                &["phase2", "phase3"],
                ContentLength::Detailed,
                OutputFormat::Insights,
            ),
            PageContext::new(
                PageType::StrategicPositioning,
                &[
                    "positioning",
                    "strategy",
                    "value proposition",
                    "branding",
                    "unique selling point",
                    "differentiation",
                    "market position",
                    "brand positioning",
                    "strategic direction",
                    "competitive advantage",
                ],
                &["phase4", "phase5"],
                ContentLength::Detailed,
                OutputFormat::Insights,
            ),
            PageContext::new(
                PageType::ImplementationPlan,
                &[
                    "implementation",
                    "execution",
                    "timeline",
                    "budget allocation",
                    "campaign setup",
                    "phases",
                    "milestones",
                    "resources",
                    "roadmap",
                    "plan",
                    "deployment",
                    "launch",
                ],
                &["phase5"],
                ContentLength::Comprehensive,
                OutputFormat::Bullets,
            ),
        ];
        Self { contexts }
    }

    pub fn get(&self, page_type: PageType) -> Option<&PageContext> {
        self.contexts.iter().find(|c| c.page_type == page_type)
    }

    /// Map a page slug or one of the short aliases to a page type.
    pub fn resolve(slug: &str) -> Option<PageType> {
        match slug {
            "opportunities" => Some(PageType::MarketOpportunities),
            "strategy" => Some(PageType::StrategicPositioning),
            "timeline" => Some(PageType::ImplementationPlan),
            "metrics" | "overview" => Some(PageType::ExecutiveSummary),
            other => PageType::from_slug(other),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &PageContext> {
        self.contexts.iter()
    }
}

impl Default for ContextTable {
    fn default() -> Self {
        Self::new()
    }
}
