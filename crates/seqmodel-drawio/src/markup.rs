//! Label text cleanup and bracketed predicate scanning.
//!
//! draw.io stores rich labels as HTML fragments (`opt<br>[x&gt;1]`,
//! `<div>Server</div>`). Extractors work on the plain text.

use std::sync::OnceLock;

use regex::Regex;

fn tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]*>").expect("valid regex"))
}

fn line_break_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)<br\s*/?>|</(div|p)>").expect("valid regex"))
}

fn predicate_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[(.*?)\]").expect("valid regex"))
}

/// Strip markup and decode entities, returning trimmed plain text.
///
/// Line breaks become spaces so that `opt<br>[x=1]` reads as `opt [x=1]`.
pub fn plain_text(label: &str) -> String {
    if label.is_empty() {
        return String::new();
    }
    let spaced = line_break_regex().replace_all(label, " ");
    let stripped = tag_regex().replace_all(&spaced, "");
    htmlize::unescape(stripped.as_ref())
        .replace('\u{a0}', " ")
        .trim()
        .to_string()
}

/// Every bracketed predicate in `text`, without the brackets, in order.
pub fn predicates(text: &str) -> impl Iterator<Item = &str> {
    predicate_regex()
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// The first bracketed predicate in `text`, normalized.
pub fn first_guard(text: &str) -> Option<String> {
    predicates(text).next().map(normalize_guard)
}

/// Trim a predicate and rewrite `==` and `:=` to `=`.
pub fn normalize_guard(raw: &str) -> String {
    raw.trim().replace("==", "=").replace(":=", "=")
}
