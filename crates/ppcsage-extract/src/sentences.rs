//! Sentence segmentation with length filtering.

use std::collections::HashMap;

use parking_lot::Mutex;
use tracing::debug;

use crate::clean::clean_text;

/// Upper bound on memoized segmentations before the memo is reset.
const MEMO_CAPACITY: usize = 256;

/// Words whose trailing period does not end a sentence.
const ABBREVIATIONS: &[&str] = &[
    "inc", "corp", "ltd", "co", "mr", "mrs", "ms", "dr", "vs", "e.g", "i.e", "approx", "est",
];

/// Splits text into sentence-like units.
///
/// Units end after `.`, `!` or `?` followed by whitespace, at a newline, or
/// at end of text. Units shorter than `min_len` or longer than `max_len`
/// characters are dropped.
pub struct SentenceSegmenter {
    min_len: usize,
    max_len: usize,
    memo: Mutex<HashMap<String, Vec<String>>>,
}

impl SentenceSegmenter {
    pub fn new(min_len: usize, max_len: usize) -> Self {
        Self {
            min_len,
            max_len,
            memo: Mutex::new(HashMap::new()),
        }
    }

    /// Clean and segment `text`.
    pub fn segment(&self, text: &str) -> Vec<String> {
        let cleaned = clean_text(text);
        split_sentences(&cleaned)
            .into_iter()
            .filter(|s| {
                let len = s.chars().count();
                len >= self.min_len && len <= self.max_len
            })
            .map(str::to_string)
            .collect()
    }

    /// Segment with memoization under a caller-chosen key. The caller owns
    /// key uniqueness: two texts under one key share a result.
    pub fn segment_keyed(&self, key: &str, text: &str) -> Vec<String> {
        if let Some(hit) = self.memo.lock().get(key) {
            return hit.clone();
        }

        let sentences = self.segment(text);

        let mut memo = self.memo.lock();
        if memo.len() >= MEMO_CAPACITY {
            debug!("Sentence memo full ({} keys), resetting", memo.len());
            memo.clear();
        }
        memo.insert(key.to_string(), sentences.clone());
        sentences
    }

    pub fn memo_len(&self) -> usize {
        self.memo.lock().len()
    }
}

impl Default for SentenceSegmenter {
    fn default() -> Self {
        Self::new(10, 500)
    }
}

/// Split already-cleaned text into trimmed, non-empty units.
fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let bytes = text.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        let boundary = b == b'\n'
            || ((b == b'.' || b == b'!' || b == b'?')
                && (i + 1 == bytes.len() || bytes[i + 1].is_ascii_whitespace())
                && !(b == b'.' && ends_with_abbreviation(&text[start..i])));
        if boundary {
            let s = text[start..=i].trim();
            if !s.is_empty() {
                sentences.push(s);
            }
            start = i + 1;
        }
    }
    if start < text.len() {
        let s = text[start..].trim();
        if !s.is_empty() {
            sentences.push(s);
        }
    }
    sentences
}

fn ends_with_abbreviation(fragment: &str) -> bool {
    fragment
        .split_whitespace()
        .last()
        .map(|word| ABBREVIATIONS.contains(&word.to_lowercase().as_str()))
        .unwrap_or(false)
}
