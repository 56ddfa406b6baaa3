//! Recover the interaction model from a loaded document.
//!
//! Extraction runs in a fixed order over one [`Document`]:
//!
//! 1. absolute geometry for every cell ([`GeometryIndex`])
//! 2. the system base name
//! 3. participants (lifelines and actors)
//! 4. scopes (combined fragments) and their guards
//! 5. message flows, sorted and attributed to scopes
//! 6. guard variables from every bracketed predicate
//!
//! Nothing here fails: elements that cannot be interpreted are skipped or
//! defaulted, and a warning is recorded for each.

mod flow;
mod guard;
mod lifeline;
mod name;
mod scope;

use std::sync::OnceLock;

use log::info;
use regex::Regex;
use seqmodel_core::model::{InteractionModel, order_flows};

use crate::{
    document::Document,
    error::{Diagnostic, DiagnosticCollector},
    geometry::GeometryIndex,
};

pub use guard::classify_predicate;
pub use name::{NameHints, to_pascal_case};

fn non_identifier_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^A-Za-z0-9_]+").expect("valid regex"))
}

/// Turn free label text into an Event-B identifier.
///
/// Runs of characters outside `[A-Za-z0-9_]` become a single `_`, and text
/// starting with a digit is prefixed with `<prefix>_`. Returns `None` when
/// nothing usable is left.
pub(crate) fn to_identifier(text: &str, prefix: &str) -> Option<String> {
    let sanitized = non_identifier_regex().replace_all(text.trim(), "_");
    let sanitized = sanitized.trim_matches('_');
    match sanitized.chars().next() {
        None => None,
        Some(first) if first.is_ascii_digit() => Some(format!("{prefix}_{sanitized}")),
        Some(_) => Some(sanitized.to_string()),
    }
}

/// Tuning knobs for spatial inference.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractConfig {
    distance_threshold: f32,
    guard_label_tolerance: f32,
}

impl ExtractConfig {
    /// Create a configuration.
    ///
    /// `distance_threshold` is the largest horizontal distance at which a
    /// message endpoint still snaps to a participant. `guard_label_tolerance`
    /// is how far above a frame's top edge a floating guard label may sit.
    pub fn new(distance_threshold: f32, guard_label_tolerance: f32) -> Self {
        Self {
            distance_threshold,
            guard_label_tolerance,
        }
    }

    pub fn distance_threshold(&self) -> f32 {
        self.distance_threshold
    }

    pub fn guard_label_tolerance(&self) -> f32 {
        self.guard_label_tolerance
    }
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            distance_threshold: 150.0,
            guard_label_tolerance: 40.0,
        }
    }
}

/// Build the interaction model for `document`.
///
/// Returns the model together with every warning raised along the way.
pub fn extract(
    document: &Document,
    config: &ExtractConfig,
    hints: NameHints<'_>,
) -> (InteractionModel, Vec<Diagnostic>) {
    let mut collector = DiagnosticCollector::new();

    let geometry = GeometryIndex::build(document, &mut collector);
    let base_name = name::resolve(document, hints, &mut collector);
    let registry = lifeline::collect(document, &geometry);

    let mut scopes = scope::collect(document, &geometry);
    scope::attach_floating_guards(
        document,
        &geometry,
        &mut scopes,
        config.guard_label_tolerance,
        &mut collector,
    );

    let flows = flow::collect(document, &geometry, &registry, config, &mut collector);
    let flows = order_flows(flows, &scopes);
    let guard_variables = guard::collect(document);

    info!(
        base_name = base_name.as_str(),
        lifelines = registry.len(),
        scopes = scopes.len(),
        flows = flows.len(),
        guard_variables = guard_variables.len();
        "Extracted interaction model"
    );

    let model = InteractionModel::new(
        base_name,
        registry.into_lifelines(),
        scopes,
        flows,
        guard_variables,
    );
    (model, collector.into_diagnostics())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_identifier() {
        assert_eq!(to_identifier("Order Service", "p").as_deref(), Some("Order_Service"));
        assert_eq!(to_identifier("  card.number ", "data").as_deref(), Some("card_number"));
        assert_eq!(to_identifier("2fa", "data").as_deref(), Some("data_2fa"));
        assert_eq!(to_identifier("already_ok", "p").as_deref(), Some("already_ok"));
        assert_eq!(to_identifier(" -> ", "p"), None);
    }
}
