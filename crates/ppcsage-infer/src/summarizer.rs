//! Summarizer trait and implementations.
//!
//! - `ExtractiveSummarizer`: leading sentences that fit the character budget
//! - `NoopSummarizer`: always fails, so callers take their truncation path

use ppcsage_core::{Error, Result};
use ppcsage_extract::truncate_chars;

/// Trait for summarization backends.
pub trait Summarizer: Send + Sync {
    /// Summarize `text` in at most roughly `max_chars` characters.
    fn summarize(&self, text: &str, max_chars: usize) -> Result<String>;

    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Whether the backend can produce summaries.
    fn is_available(&self) -> bool;
}

/// Picks sentences in document order while they fit within the budget.
///
/// Sentences of `min_sentence_chars` or fewer characters are skipped. When
/// not even the first sentence fits, the text is truncated to the budget
/// and suffixed with `...`.
pub struct ExtractiveSummarizer {
    min_sentence_chars: usize,
}

impl ExtractiveSummarizer {
    pub fn new(min_sentence_chars: usize) -> Self {
        Self { min_sentence_chars }
    }
}

impl Default for ExtractiveSummarizer {
    fn default() -> Self {
        Self::new(20)
    }
}

impl Summarizer for ExtractiveSummarizer {
    fn summarize(&self, text: &str, max_chars: usize) -> Result<String> {
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::InvalidInput("nothing to summarize".into()));
        }

        let mut summary = String::new();
        let mut summary_chars = 0;
        for sentence in text
            .split(|c: char| matches!(c, '.' | '!' | '?'))
            .map(str::trim)
            .filter(|s| s.chars().count() > self.min_sentence_chars)
        {
            let len = sentence.chars().count();
            // Each sentence adds ". " after it.
            if summary_chars + len + 2 > max_chars {
                break;
            }
            summary.push_str(sentence);
            summary.push_str(". ");
            summary_chars += len + 2;
        }

        let summary = summary.trim_end();
        if summary.is_empty() {
            return Ok(format!("{}...", truncate_chars(text, max_chars)));
        }
        Ok(summary.to_string())
    }

    fn name(&self) -> &'static str {
        "extractive"
    }

    fn is_available(&self) -> bool {
        true
    }
}

/// Placeholder summarizer for when no backend is configured.
pub struct NoopSummarizer;

impl Summarizer for NoopSummarizer {
    fn summarize(&self, _text: &str, _max_chars: usize) -> Result<String> {
        Err(Error::Internal("no summarizer backend available".into()))
    }

    fn name(&self) -> &'static str {
        "noop"
    }

    fn is_available(&self) -> bool {
        false
    }
}
