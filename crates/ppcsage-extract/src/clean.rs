//! Markdown stripping and whitespace normalization.

use once_cell::sync::Lazy;
use regex::Regex;

static CODE_BLOCK: Lazy<Regex> = Lazy::new(|| Regex::new(r"```[\s\S]*?```").unwrap());
static LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([^\[\]]+)\]\([^()]*\)").unwrap());
/// `*x*`, `**x**`, `***x***` with no whitespace just inside the markers, so
/// a lone `*` in "5 * 3" survives.
static STAR_EMPHASIS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*{1,3}([^*\s](?:[^*\n]*?[^*\s])?)\*{1,3}").unwrap());
static UNDERSCORE_EMPHASIS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"__([^_\s](?:[^_\n]*?[^_\s])?)__").unwrap());
static BACKTICKS: Lazy<Regex> = Lazy::new(|| Regex::new(r"`+").unwrap());
/// Stacked header / bullet / numbered markers at the start of a line.
static LINE_MARKERS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*(?:(?:[-+*]|\d+\.)[ \t]+|#+[ \t]*)+").unwrap());
static INLINE_HEADER: Lazy<Regex> = Lazy::new(|| Regex::new(r"#+[ \t]+").unwrap());
static HORIZONTAL_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\S\n]+").unwrap());
static LINE_BREAKS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*\n\s*").unwrap());

/// Strip markdown artifacts and normalize whitespace.
///
/// Runs of spaces/tabs become one space, any whitespace run containing a
/// newline becomes a single newline, and the result is trimmed.
pub fn clean_text(text: &str) -> String {
    if text.trim().is_empty() {
        return String::new();
    }

    // Removing one layer of markup can expose another (nested links,
    // "- # title"), so iterate to a fixpoint. Every changing pass shrinks the
    // text or replaces tabs, which bounds the loop.
    let mut current = clean_once(text);
    loop {
        let next = clean_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn clean_once(text: &str) -> String {
    let s = CODE_BLOCK.replace_all(text, " ");
    let s = LINK.replace_all(&s, "$1");
    let s = STAR_EMPHASIS.replace_all(&s, "$1");
    let s = UNDERSCORE_EMPHASIS.replace_all(&s, "$1");
    let s = BACKTICKS.replace_all(&s, "");
    let s = LINE_MARKERS.replace_all(&s, "");
    let s = INLINE_HEADER.replace_all(&s, "");
    let s = HORIZONTAL_WS.replace_all(&s, " ");
    let s = LINE_BREAKS.replace_all(&s, "\n");
    s.trim().to_string()
}
