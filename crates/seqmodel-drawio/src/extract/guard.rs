//! Guard variables classified from bracketed predicates.

use std::sync::OnceLock;

use log::trace;
use regex::Regex;
use seqmodel_core::model::{GuardMode, GuardTable};

use crate::{document::Document, markup};

fn assignment_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*([A-Za-z_][A-Za-z0-9_]*)\s*(?:==|:=|=)\s*(-?\d+)\s*$").expect("valid regex")
    })
}

fn range_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^\s*([A-Za-z_][A-Za-z0-9_]*)\s*(?::∈|∈|:|\bin\b)\s*(-?\d+)\s*(?:\.\.|‥)\s*(-?\d+)\s*$",
        )
        .expect("valid regex")
    })
}

fn comparison_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*([A-Za-z_][A-Za-z0-9_]*)\s*(?:<=|>=|!=|<|>|≤|≥|≠)\s*(-?\d+)\s*$")
            .expect("valid regex")
    })
}

/// Classify one predicate (the text between brackets).
///
/// Tried in order: assignment (`n = 1`, `n == 1`, `n := 1`), range
/// (`n : 0..9`, `n in 0..9`, `n ∈ 0..9`, `n :∈ 0..9`), then comparison
/// (`n < 5` and friends), which only implies a zero default.
///
/// # Examples
///
/// ```
/// # use seqmodel_core::model::GuardMode;
/// # use seqmodel_drawio::extract::classify_predicate;
/// assert_eq!(classify_predicate("valid == 1"), Some(("valid", GuardMode::Deterministic(1))));
/// assert_eq!(
///     classify_predicate("amount in 0..2000"),
///     Some(("amount", GuardMode::NonDeterministic { low: 0, high: 2000 }))
/// );
/// assert_eq!(classify_predicate("retry < 5"), Some(("retry", GuardMode::Default)));
/// assert_eq!(classify_predicate("ready"), None);
/// ```
pub fn classify_predicate(predicate: &str) -> Option<(&str, GuardMode)> {
    if let Some(caps) = assignment_regex().captures(predicate) {
        let value = caps[2].parse().ok()?;
        return Some((caps.get(1)?.as_str(), GuardMode::Deterministic(value)));
    }
    if let Some(caps) = range_regex().captures(predicate) {
        let low = caps[2].parse().ok()?;
        let high = caps[3].parse().ok()?;
        return Some((caps.get(1)?.as_str(), GuardMode::NonDeterministic { low, high }));
    }
    comparison_regex()
        .captures(predicate)
        .and_then(|caps| caps.get(1))
        .map(|name| (name.as_str(), GuardMode::Default))
}

/// Scan every label in the document and build the guard variable table.
pub(crate) fn collect(document: &Document) -> GuardTable {
    let mut table = GuardTable::new();
    for node in document.nodes() {
        if node.label().is_empty() {
            continue;
        }
        let text = markup::plain_text(node.label());
        for (name, mode) in markup::predicates(&text).filter_map(classify_predicate) {
            if table.try_insert(name, mode) {
                trace!(name = name, mode:% = mode; "Classified guard variable");
            }
        }
    }
    table
}
