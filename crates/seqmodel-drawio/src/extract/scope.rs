//! Combined fragments and their guards.

use std::collections::{HashMap, HashSet};

use log::{debug, trace};
use seqmodel_core::model::{Scope, ScopeKind};

use crate::{
    document::{DiagramNode, Document},
    error::{Diagnostic, DiagnosticCollector, ErrorCode},
    extract::lifeline::is_participant,
    geometry::GeometryIndex,
    markup,
};

const FRAME_MARKERS: [&str; 2] = ["umlFrame", "sysml.package"];

/// The fragment kind of a cell, if it is a frame.
///
/// A vertex is a frame when its caption starts with a fragment keyword or
/// its style marks it as a frame shape. Frame shapes without a keyword are
/// treated as `opt`.
fn frame_kind(node: &DiagramNode, caption: &str) -> Option<ScopeKind> {
    if !node.is_vertex() || is_participant(node) {
        return None;
    }
    let styled = FRAME_MARKERS.iter().any(|marker| node.style_contains(marker));
    match ScopeKind::from_caption(caption) {
        Some(kind) => Some(kind),
        None if styled => Some(ScopeKind::Optional),
        None => None,
    }
}

/// Collect every frame in document order.
///
/// Ordinals count per kind, so the first `alt` is `_alt1` even when an
/// `opt` precedes it. A guard written in the frame's own caption is
/// assigned immediately.
pub(crate) fn collect(document: &Document, geometry: &GeometryIndex) -> Vec<Scope> {
    let mut counters: HashMap<ScopeKind, usize> = HashMap::new();
    let mut scopes = Vec::new();

    for (position, node) in document.nodes().iter().enumerate() {
        let caption = markup::plain_text(node.label());
        let Some(kind) = frame_kind(node, &caption) else {
            continue;
        };

        let ordinal = counters.entry(kind).or_default();
        *ordinal += 1;

        let bounds = geometry.absolute_bounds(document, position);
        let mut scope = Scope::new(node.id(), kind, *ordinal, bounds);
        if let Some(guard) = markup::first_guard(&caption) {
            scope.try_set_guard(guard);
        }

        debug!(
            id = node.id(),
            suffix = scope.suffix(),
            guard:? = scope.guard();
            "Found scope"
        );
        scopes.push(scope);
    }
    scopes
}

/// Attach guard labels that float next to frames rather than inside their caption.
///
/// Every non-frame vertex whose text contains a bracketed predicate is a
/// candidate. A label parented to a frame goes to that frame and is
/// consumed even when the frame already has a guard. Any other label goes
/// to the first frame, in discovery order, that spatially captures it and
/// has no guard yet. Labels that land nowhere are reported as
/// [`ErrorCode::W202`].
pub(crate) fn attach_floating_guards(
    document: &Document,
    geometry: &GeometryIndex,
    scopes: &mut [Scope],
    tolerance: f32,
    collector: &mut DiagnosticCollector,
) {
    let frame_ids: HashSet<String> = scopes.iter().map(|s| s.id().to_string()).collect();

    for (position, node) in document.nodes().iter().enumerate() {
        if !node.is_vertex() || frame_ids.contains(node.id()) {
            continue;
        }
        let text = markup::plain_text(node.label());
        let Some(guard) = markup::first_guard(&text) else {
            continue;
        };

        let parent_scope = node
            .parent()
            .and_then(|parent| scopes.iter_mut().find(|scope| scope.id() == parent));
        if let Some(scope) = parent_scope {
            let attached = scope.try_set_guard(guard.as_str());
            trace!(label = node.id(), scope = scope.id(), attached = attached; "Parented guard label");
            continue;
        }

        let anchor = geometry.absolute_bounds(document, position).min_point();
        let target = scopes
            .iter_mut()
            .find(|scope| !scope.has_guard() && scope.captures_label(anchor, tolerance));
        match target {
            Some(scope) => {
                trace!(label = node.id(), scope = scope.id(); "Attached floating guard label");
                scope.try_set_guard(guard);
            }
            None => {
                let mut diagnostic =
                    Diagnostic::warning(format!("guard label `[{guard}]` is not attached to any frame"))
                        .with_code(ErrorCode::W202)
                        .with_label(node.span(), "floating label")
                        .with_help("place the label inside a frame that has no guard yet");
                let guarded = scopes
                    .iter()
                    .filter(|scope| scope.captures_label(anchor, tolerance))
                    .find_map(|scope| document.position(scope.id()));
                if let Some(frame) = guarded {
                    diagnostic = diagnostic.with_secondary_label(
                        document.nodes()[frame].span(),
                        "frame already guarded",
                    );
                }
                collector.emit(diagnostic);
            }
        }
    }
}
