//! Heading-based section extraction with relevance filtering.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use ppcsage_core::{ContentSection, PageContext, ProcessingRules, SectionKind};

use crate::relevance::score_relevance;

/// One or two `#` markers followed by whitespace and a title.
static HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#{1,2}\s+(\S.*)$").unwrap());
static BULLET: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*(?:[-*+]|\d+\.)\s+").unwrap());

/// Title given to text that precedes the first heading.
pub const PREAMBLE_TITLE: &str = "Overview";

struct Draft<'a> {
    title: &'a str,
    preamble: bool,
    lines: Vec<&'a str>,
}

/// Split `text` into titled sections, keeping those whose relevance to
/// `context` reaches `rules.min_section_relevance`. Sections come back in
/// document order.
pub fn extract_sections(
    phase: &str,
    text: &str,
    context: &PageContext,
    rules: &ProcessingRules,
) -> Vec<ContentSection> {
    let mut drafts: Vec<Draft<'_>> = Vec::new();
    let mut current = Draft {
        title: PREAMBLE_TITLE,
        preamble: true,
        lines: Vec::new(),
    };

    for line in text.lines() {
        let trimmed = line.trim();
        if let Some(caps) = HEADING.captures(trimmed) {
            let title = caps.get(1).map(|m| m.as_str().trim()).unwrap_or_default();
            let next = Draft {
                title,
                preamble: false,
                lines: Vec::new(),
            };
            drafts.push(std::mem::replace(&mut current, next));
        } else if !trimmed.is_empty() {
            current.lines.push(line);
        }
    }
    // The trailing section has no heading after it to trigger the flush.
    drafts.push(current);

    let mut sections = Vec::new();
    for draft in drafts {
        if draft.lines.is_empty() {
            continue;
        }
        let content = draft.lines.join("\n").trim().to_string();
        let relevance_score = score_relevance(&content, context, rules);
        if relevance_score < rules.min_section_relevance {
            debug!(
                "Dropping section '{}' from {} (relevance {:.2})",
                draft.title, phase, relevance_score
            );
            continue;
        }
        let kind = section_kind(draft.title, draft.preamble, &draft.lines);
        sections.push(ContentSection {
            id: format!("{}-section-{}", phase, sections.len()),
            title: draft.title.to_string(),
            content,
            phase: phase.to_string(),
            relevance_score,
            kind,
        });
    }
    sections
}

fn section_kind(title: &str, preamble: bool, lines: &[&str]) -> SectionKind {
    if preamble {
        return SectionKind::Paragraph;
    }
    let lower = title.to_lowercase();
    if ["metric", "kpi", "measurement", "performance"]
        .iter()
        .any(|w| lower.contains(w))
    {
        return SectionKind::Metric;
    }
    if ["list", "summary", "key", "main"].iter().any(|w| lower.contains(w))
        || lines.iter().all(|l| BULLET.is_match(l))
    {
        return SectionKind::List;
    }
    SectionKind::Heading
}

#[cfg(test)]
mod tests {
    use super::*;
    use ppcsage_core::{ContentLength, OutputFormat, PageType};

    fn ctx(keywords: &[&str]) -> PageContext {
        PageContext::new(
            PageType::BudgetAllocation,
            keywords,
            &["phase1"],
            ContentLength::Brief,
            OutputFormat::Summary,
        )
    }

    #[test]
    fn test_two_headings() {
        let rules = ProcessingRules::default();
        let text = "# Intro\nHello world\n## Budget\nSpend $500 monthly";
        let sections = extract_sections("phase1", text, &ctx(&["hello", "budget", "spend"]), &rules);
        let titles: Vec<&str> = sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Intro", "Budget"]);
        assert_eq!(sections[0].content, "Hello world");
        assert!(sections[1].content.contains("$500"));
        assert_eq!(sections[1].id, "phase1-section-1");
        assert_eq!(sections[1].phase, "phase1");
    }

    #[test]
    fn test_last_section_flushed_and_lines_ordered() {
        let rules = ProcessingRules::default();
        let text = "## Plan\nfirst budget line\n\nsecond budget line\nthird budget line";
        let sections = extract_sections("p", text, &ctx(&["budget"]), &rules);
        assert_eq!(sections.len(), 1);
        assert_eq!(
            sections[0].content,
            "first budget line\nsecond budget line\nthird budget line"
        );
    }

    #[test]
    fn test_irrelevant_sections_dropped() {
        let rules = ProcessingRules {
            min_section_relevance: 0.5,
            ..ProcessingRules::default()
        };
        let text = "# Weather\nIt rained all day.\n# Budget\nThe budget is $2,000 for 3 months.";
        let sections = extract_sections("p", text, &ctx(&["budget"]), &rules);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title, "Budget");
        assert_eq!(sections[0].id, "p-section-0");
        assert!(sections[0].relevance_score >= 0.5);
    }

    #[test]
    fn test_preamble_and_kinds() {
        let rules = ProcessingRules::default();
        let text = "Budget context first.\n# Key Metrics\nbudget CTR 4%\n# Channels\n- budget search\n- budget social\n### Not a heading\n";
        let sections = extract_sections("p", text, &ctx(&["budget"]), &rules);
        let kinds: Vec<(&str, SectionKind)> =
            sections.iter().map(|s| (s.title.as_str(), s.kind)).collect();
        assert_eq!(
            kinds,
            vec![
                (PREAMBLE_TITLE, SectionKind::Paragraph),
                ("Key Metrics", SectionKind::Metric),
                ("Channels", SectionKind::Heading),
            ]
        );
        // "### Not a heading" stays in the body, so Channels is not all bullets.
        assert!(sections[2].content.ends_with("### Not a heading"));
    }

    #[test]
    fn test_bullet_body_is_list() {
        let rules = ProcessingRules::default();
        let text = "# Channels\n- budget search\n- budget social";
        let sections = extract_sections("p", text, &ctx(&["budget"]), &rules);
        assert_eq!(sections[0].kind, SectionKind::List);
    }

    #[test]
    fn test_heading_without_body_skipped() {
        let rules = ProcessingRules::default();
        let sections = extract_sections("p", "# Empty\n# Budget\nbudget here", &ctx(&["budget"]), &rules);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title, "Budget");
    }
}
