//! Orchestrator: turns phase documents into page content.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use ppcsage_core::{
    clamp_unit, ContentLength, DocumentSet, Error, Insight, InsightKind, OutputFormat,
    PageContext, PageInsights, PageType, ProcessedContent, ProcessingRules, RawDocument,
    RelevantContent, Result,
};
use ppcsage_extract::{
    clean_text, extract_competitors, extract_entities, extract_keywords, extract_metrics,
    extract_risks, extract_sections, keyword_matches, score_relevance, truncate_chars,
    SentenceSegmenter,
};
use ppcsage_infer::{create_classifier, create_summarizer, Classifier, Summarizer};

use crate::contexts::ContextTable;

/// Summary used when no relevant document has any text.
pub const NO_CONTENT_SUMMARY: &str = "No content available for summarization.";

const SUPPORTING_SECTIONS: usize = 4;
const INSIGHT_KEYWORDS: usize = 5;
const DOCUMENT_KEYWORDS: usize = 10;
const PAGE_LIST_LIMIT: usize = 5;
const PAGE_COMPETITORS: usize = 3;
const PAGE_RISKS: usize = 3;
/// Insight confidence relative to its relevance.
const CONFIDENCE_FACTOR: f64 = 0.9;

/// A slice of text and the phase it came from.
struct Unit {
    phase: String,
    text: String,
}

/// Coordinates sectioning, scoring, classification and summarization for
/// the pages in its context table.
pub struct Orchestrator {
    contexts: ContextTable,
    rules: ProcessingRules,
    segmenter: SentenceSegmenter,
    summarizer: Arc<dyn Summarizer>,
    classifier: Arc<dyn Classifier>,
}

impl Orchestrator {
    /// Create an orchestrator with the default capabilities.
    pub fn new(rules: ProcessingRules) -> Self {
        let segmenter = SentenceSegmenter::new(rules.min_sentence_length, rules.max_sentence_length);
        let contexts = ContextTable::new();
        info!(
            "Orchestrator initialized: {} page contexts, insight threshold {:.2}",
            contexts.iter().count(),
            rules.min_insight_relevance
        );
        Self {
            contexts,
            rules,
            segmenter,
            summarizer: create_summarizer(),
            classifier: create_classifier(),
        }
    }

    pub fn with_summarizer(mut self, summarizer: Arc<dyn Summarizer>) -> Self {
        self.summarizer = summarizer;
        self
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn Classifier>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn get_context(&self, page_type: PageType) -> Option<&PageContext> {
        self.contexts.get(page_type)
    }

    pub fn contexts(&self) -> &ContextTable {
        &self.contexts
    }

    pub fn rules(&self) -> &ProcessingRules {
        &self.rules
    }

    /// Text of the context's phases that are present and non-blank, tagged
    /// with the phase id. This is what the result cache key is derived from.
    pub fn source_text(&self, documents: &DocumentSet, context: &PageContext) -> String {
        self.relevant_documents(documents, context)
            .iter()
            .map(|(phase, text)| format!("{}\n{}", phase, text))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Sections of the context's phases that pass the relevance filter,
    /// best first.
    pub fn relevant_content(&self, documents: &DocumentSet, context: &PageContext) -> RelevantContent {
        let mut sections: Vec<_> = self
            .relevant_documents(documents, context)
            .into_iter()
            .flat_map(|(phase, text)| extract_sections(phase, text, context, &self.rules))
            .collect();
        sections.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));

        RelevantContent {
            primary_content: sections.first().map(|s| s.content.clone()).unwrap_or_default(),
            supporting_content: sections
                .iter()
                .skip(1)
                .take(SUPPORTING_SECTIONS)
                .map(|s| s.content.clone())
                .collect(),
            all_content: sections
                .iter()
                .map(|s| s.content.as_str())
                .collect::<Vec<_>>()
                .join("\n\n"),
            sections,
        }
    }

    /// Summary, insights and entities for `context` over `documents`.
    ///
    /// Sections are the unit of work; when no section passes the relevance
    /// filter the cleaned documents are used whole. Summarizer failures fall
    /// back to truncation.
    pub fn summarize(&self, documents: &DocumentSet, context: &PageContext) -> ProcessedContent {
        let docs = self.relevant_documents(documents, context);
        if docs.is_empty() {
            debug!("No relevant documents for {}", context.page_type);
            return empty_content();
        }
        let sources: Vec<String> = docs.iter().map(|(phase, _)| phase.to_string()).collect();

        let relevant = self.relevant_content(documents, context);
        let (units, relevance_score) = if relevant.sections.is_empty() {
            debug!(
                "No section of {} passed the relevance filter, using whole documents",
                context.page_type
            );
            let units: Vec<Unit> = docs
                .iter()
                .map(|(phase, text)| Unit {
                    phase: phase.to_string(),
                    text: clean_text(text),
                })
                .collect();
            let score = mean(units.iter().map(|u| score_relevance(&u.text, context, &self.rules)));
            (units, score)
        } else {
            let score = mean(relevant.sections.iter().map(|s| s.relevance_score));
            let units: Vec<Unit> = relevant
                .sections
                .into_iter()
                .map(|s| Unit {
                    phase: s.phase,
                    text: s.content,
                })
                .collect();
            (units, score)
        };

        let combined = clean_text(
            &units
                .iter()
                .map(|u| u.text.as_str())
                .collect::<Vec<_>>()
                .join("\n\n"),
        );
        let summary = self.summary_for(&combined, context.content_length.summary_chars());
        let insights = self.extract_insights(&units, context);
        let entities = extract_entities(&combined, self.rules.max_entities);

        let confidence = if insights.is_empty() {
            clamp_unit(CONFIDENCE_FACTOR * relevance_score)
        } else {
            mean(insights.iter().map(|i| i.confidence))
        };

        debug!(
            "Summarized {}: {} units, {} insights, {} entities, relevance {:.2}",
            context.page_type,
            units.len(),
            insights.len(),
            entities.len(),
            relevance_score
        );

        ProcessedContent {
            summary,
            insights,
            entities,
            relevance_score,
            confidence,
            sources,
            processed_at: Utc::now(),
        }
    }

    /// Findings, recommendations, metrics, competitors and risks for one
    /// page.
    pub fn page_insights(&self, page_type: PageType, documents: &DocumentSet) -> Result<PageInsights> {
        let context = self.get_context(page_type).ok_or_else(|| {
            Error::NotFound(format!("No context defined for page type: {}", page_type))
        })?;
        let relevant = self.relevant_content(documents, context);

        let summary = if relevant.primary_content.trim().is_empty() {
            NO_CONTENT_SUMMARY.to_string()
        } else {
            self.summary_for(
                &clean_text(&relevant.primary_content),
                context.content_length.summary_chars(),
            )
        };

        let units: Vec<Unit> = relevant
            .sections
            .iter()
            .map(|s| Unit {
                phase: s.phase.clone(),
                text: s.content.clone(),
            })
            .collect();
        let insights = self.extract_insights(&units, context);
        let contents_of = |kind: InsightKind| -> Vec<String> {
            insights
                .iter()
                .filter(|i| i.kind == kind)
                .take(PAGE_LIST_LIMIT)
                .map(|i| i.content.clone())
                .collect()
        };

        let all_content = clean_text(&relevant.all_content);
        let mut risks = Vec::new();
        for section in &relevant.sections {
            if risks.len() >= PAGE_RISKS {
                break;
            }
            risks.extend(extract_risks(
                &section.content,
                &section.phase,
                PAGE_RISKS - risks.len(),
            ));
        }

        Ok(PageInsights {
            summary,
            key_findings: contents_of(InsightKind::Finding),
            recommendations: contents_of(InsightKind::Recommendation),
            metrics: extract_metrics(&all_content, self.rules.max_entities),
            competitors: extract_competitors(&all_content, PAGE_COMPETITORS),
            risks,
        })
    }

    /// Summarize a single document against a context derived from its own
    /// top keywords.
    pub fn process_document(&self, phase: &str, text: &str) -> ProcessedContent {
        let keywords = extract_keywords(&clean_text(text), DOCUMENT_KEYWORDS);
        let context = PageContext {
            page_type: PageType::ExecutiveSummary,
            focus_keywords: keywords,
            relevant_phases: vec![phase.to_string()],
            content_length: ContentLength::Detailed,
            output_format: OutputFormat::Summary,
        };
        let mut documents = DocumentSet::new();
        documents.insert(phase.to_string(), RawDocument::new(text));
        self.summarize(&documents, &context)
    }

    /// Truncation-only content for when processing fails or times out.
    pub fn fallback_content(&self, documents: &DocumentSet, context: &PageContext) -> ProcessedContent {
        let docs = self.relevant_documents(documents, context);
        if docs.is_empty() {
            return empty_content();
        }
        let combined = docs
            .iter()
            .map(|(_, text)| clean_text(text))
            .collect::<Vec<_>>()
            .join(" ");
        ProcessedContent {
            summary: truncated(&combined, context.content_length.summary_chars()),
            insights: Vec::new(),
            entities: Vec::new(),
            relevance_score: 0.0,
            confidence: 0.0,
            sources: docs.iter().map(|(phase, _)| phase.to_string()).collect(),
            processed_at: Utc::now(),
        }
    }

    /// `(phase, text)` for each of the context's phases present in
    /// `documents` with non-blank text, in context order.
    fn relevant_documents<'a>(
        &self,
        documents: &'a DocumentSet,
        context: &'a PageContext,
    ) -> Vec<(&'a str, &'a str)> {
        context
            .relevant_phases
            .iter()
            .filter_map(|phase| {
                documents
                    .get(phase)
                    .filter(|doc| !doc.text.trim().is_empty())
                    .map(|doc| (phase.as_str(), doc.text.as_str()))
            })
            .collect()
    }

    fn summary_for(&self, text: &str, max_chars: usize) -> String {
        let input = truncate_chars(text, self.rules.max_summary_input);
        match self.summarizer.summarize(input, max_chars) {
            Ok(summary) if !summary.trim().is_empty() => summary,
            Ok(_) => truncated(text, max_chars),
            Err(e) => {
                warn!(
                    "Summarizer '{}' failed, truncating instead: {}",
                    self.summarizer.name(),
                    e
                );
                truncated(text, max_chars)
            }
        }
    }

    /// Sentences that mention a focus keyword and score at least
    /// `min_insight_relevance`, best first, at most `max_insights`.
    fn extract_insights(&self, units: &[Unit], context: &PageContext) -> Vec<Insight> {
        let mut insights = Vec::new();
        for unit in units {
            for sentence in self.segmenter.segment_keyed(&memo_key(unit), &unit.text) {
                if keyword_matches(&sentence, context).is_empty() {
                    continue;
                }
                let score = score_relevance(&sentence, context, &self.rules);
                if score < self.rules.min_insight_relevance {
                    continue;
                }
                insights.push(Insight {
                    id: Uuid::new_v4().to_string(),
                    kind: self.classifier.classify(&sentence),
                    relevance_score: score,
                    confidence: clamp_unit(CONFIDENCE_FACTOR * score),
                    source: context.page_type.as_str().to_string(),
                    phase: unit.phase.clone(),
                    keywords: extract_keywords(&sentence, INSIGHT_KEYWORDS),
                    content: sentence,
                });
            }
        }
        insights.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));
        insights.truncate(self.rules.max_insights);
        insights
    }
}

fn memo_key(unit: &Unit) -> String {
    let mut hasher = DefaultHasher::new();
    unit.text.hash(&mut hasher);
    format!("{}:{:016x}", unit.phase, hasher.finish())
}

fn empty_content() -> ProcessedContent {
    ProcessedContent {
        summary: NO_CONTENT_SUMMARY.to_string(),
        insights: Vec::new(),
        entities: Vec::new(),
        relevance_score: 0.0,
        confidence: 0.0,
        sources: Vec::new(),
        processed_at: Utc::now(),
    }
}

/// `text` cut to `max_chars` with `...` appended when it was longer.
fn truncated(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    if text.chars().count() > max_chars {
        format!("{}...", truncate_chars(text, max_chars))
    } else {
        text.to_string()
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0.0
    } else {
        clamp_unit(sum / count as f64)
    }
}
