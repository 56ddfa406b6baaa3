//! Message flows recovered from labelled edges.

use std::sync::OnceLock;

use log::{debug, warn};
use regex::Regex;
use seqmodel_core::{
    geometry::Point,
    model::{Lifeline, MessageFlow, UNKNOWN_PARTICIPANT},
};

use crate::{
    document::{DiagramNode, Document},
    error::{Diagnostic, DiagnosticCollector, ErrorCode},
    extract::{ExtractConfig, lifeline::LifelineRegistry, to_identifier},
    geometry::GeometryIndex,
    markup,
};

const FALLBACK_CALL: &str = "message";
const DATA_PREFIX: &str = "data";

fn call_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)\s*\((.*?)\)").expect("valid regex"))
}

/// Split a message label into its call name and first data argument.
///
/// `login(user, pass)` yields `("login", Some("user"))`, and an argument
/// such as `card.number` becomes `card_number`. Labels that are not a call
/// are turned into an identifier: `place order` becomes `place_order`, and
/// text with nothing usable becomes `message`.
pub(crate) fn split_label(text: &str) -> (String, Option<String>) {
    let text = text.trim();
    if let Some(caps) = call_regex().captures(text) {
        let call = caps[1].to_string();
        let data = caps[2]
            .split(',')
            .next()
            .and_then(|arg| to_identifier(arg, DATA_PREFIX));
        return (call, data);
    }

    let call = to_identifier(text, FALLBACK_CALL).unwrap_or_else(|| FALLBACK_CALL.to_string());
    (call, None)
}

/// Which end of an edge is being resolved.
#[derive(Debug, Clone, Copy)]
enum End {
    Source,
    Target,
}

/// Collect flows from every labelled edge, in document order and unnumbered.
pub(crate) fn collect(
    document: &Document,
    geometry: &GeometryIndex,
    registry: &LifelineRegistry,
    config: &ExtractConfig,
    collector: &mut DiagnosticCollector,
) -> Vec<MessageFlow> {
    let mut flows = Vec::new();

    for (position, edge) in document.nodes().iter().enumerate() {
        if !edge.is_edge() {
            continue;
        }
        let text = markup::plain_text(edge.label());
        if text.is_empty() {
            continue;
        }
        let (call, data) = split_label(&text);

        let resolver = EndpointResolver {
            document,
            geometry,
            registry,
            threshold: config.distance_threshold(),
            position,
            edge,
        };

        let Some(sender) = resolver.resolve(End::Source) else {
            warn!(edge = edge.id(), call = call.as_str(); "Dropping message without sender");
            collector.emit(
                Diagnostic::warning(format!("message `{call}` has no resolvable sender"))
                    .with_code(ErrorCode::W200)
                    .with_label(edge.span(), "message dropped")
                    .with_help(resolver.help()),
            );
            continue;
        };

        let receiver = match resolver.resolve(End::Target) {
            Some(receiver) => receiver.name().to_string(),
            None => {
                collector.emit(
                    Diagnostic::warning(format!("message `{call}` has no resolvable receiver"))
                        .with_code(ErrorCode::W201)
                        .with_label(edge.span(), format!("receiver recorded as `{UNKNOWN_PARTICIPANT}`"))
                        .with_help(resolver.help()),
                );
                UNKNOWN_PARTICIPANT.to_string()
            }
        };

        let y = resolver.vertical_position();
        debug!(
            edge = edge.id(),
            call = call.as_str(),
            sender = sender.name(),
            receiver = receiver.as_str(),
            y = y;
            "Found message flow"
        );
        flows.push(MessageFlow::new(call, data, sender.name(), receiver, y));
    }
    flows
}

/// Resolves the participants at either end of one edge.
struct EndpointResolver<'a> {
    document: &'a Document,
    geometry: &'a GeometryIndex,
    registry: &'a LifelineRegistry,
    threshold: f32,
    position: usize,
    edge: &'a DiagramNode,
}

impl<'a> EndpointResolver<'a> {
    /// Explicit connection first, then the nearest participant by x.
    fn resolve(&self, end: End) -> Option<&'a Lifeline> {
        let connected = self.connected(end);
        if let Some(lifeline) = connected.and_then(|cell| self.registry.by_node(self.document, cell)) {
            return Some(lifeline);
        }

        let x = self
            .terminal(end)
            .map(Point::x)
            .or_else(|| {
                connected.map(|cell| {
                    self.geometry
                        .absolute_bounds(self.document, cell)
                        .center()
                        .x()
                })
            })?;
        self.registry.nearest(x, self.threshold)
    }

    /// Document position of the cell the edge is attached to at `end`.
    fn connected(&self, end: End) -> Option<usize> {
        let id = match end {
            End::Source => self.edge.source(),
            End::Target => self.edge.target(),
        };
        id.and_then(|id| self.document.position(id))
    }

    /// Absolute terminal point at `end`, if the edge records one.
    fn terminal(&self, end: End) -> Option<Point> {
        let points = self.edge.points();
        let point = match end {
            End::Source => points.source(),
            End::Target => points.target(),
        };
        point.map(|point| self.geometry.absolute_point(self.position, point))
    }

    /// Absolute y used to order the message.
    ///
    /// Source terminal, then target terminal, then the first waypoint,
    /// then zero.
    fn vertical_position(&self) -> f32 {
        self.terminal(End::Source)
            .or_else(|| self.terminal(End::Target))
            .or_else(|| {
                self.edge
                    .points()
                    .waypoints()
                    .first()
                    .map(|point| self.geometry.absolute_point(self.position, *point))
            })
            .map_or(0.0, Point::y)
    }

    fn help(&self) -> String {
        format!(
            "attach the edge to a participant or end it within {} units of one",
            self.threshold
        )
    }
}

#[cfg(test)]
mod tests {
    use seqmodel_core::geometry::Size;

    use super::*;
    use crate::{
        document::{EdgePoints, RawGeometry},
        extract::lifeline,
    };

    fn lifeline_node(id: &str, label: &str, x: f32) -> DiagramNode {
        DiagramNode::vertex(
            id,
            label,
            "shape=umlLifeline;",
            Some("1"),
            RawGeometry::new(Point::new(x, 0.0), Size::new(100.0, 400.0), false),
        )
    }

    fn floating_edge(id: &str, label: &str, from_x: f32, to_x: f32, y: f32) -> DiagramNode {
        DiagramNode::edge(
            id,
            label,
            Some("1"),
            (None, None),
            EdgePoints::new(
                Some(Point::new(from_x, y)),
                Some(Point::new(to_x, y)),
                vec![],
            ),
        )
    }

    fn run(nodes: Vec<DiagramNode>) -> (Vec<MessageFlow>, Vec<Diagnostic>) {
        let doc = Document::from_nodes(nodes);
        let mut collector = DiagnosticCollector::new();
        let geometry = GeometryIndex::build(&doc, &mut collector);
        let registry = lifeline::collect(&doc, &geometry);
        let flows = collect(
            &doc,
            &geometry,
            &registry,
            &ExtractConfig::default(),
            &mut collector,
        );
        (flows, collector.into_diagnostics())
    }

    #[test]
    fn test_split_label() {
        assert_eq!(split_label("login(user)"), ("login".into(), Some("user".into())));
        assert_eq!(
            split_label("pay( card , amount )"),
            ("pay".into(), Some("card".into()))
        );
        assert_eq!(split_label("ack"), ("ack".into(), None));
        assert_eq!(split_label("ping()"), ("ping".into(), None));
        assert_eq!(split_label("place order"), ("place_order".into(), None));
        assert_eq!(split_label("1. start"), ("message_1_start".into(), None));
        assert_eq!(split_label("->"), ("message".into(), None));
        assert_eq!(
            split_label("pay(card.number)"),
            ("pay".into(), Some("card_number".into()))
        );
        assert_eq!(split_label("pay( , amount)"), ("pay".into(), None));
    }

    #[test]
    fn test_nearest_resolution() {
        let (flows, warnings) = run(vec![
            lifeline_node("a", "A", 0.0),
            lifeline_node("b", "B", 200.0),
            floating_edge("e", "login(user)", 55.0, 245.0, 40.0),
        ]);
        assert!(warnings.is_empty());
        assert_eq!(flows.len(), 1);
        assert_eq!(flows[0].call(), "login");
        assert_eq!(flows[0].data(), Some("user"));
        assert_eq!(flows[0].sender(), "A");
        assert_eq!(flows[0].receiver(), "B");
        assert_eq!(flows[0].y(), 40.0);
    }

    #[test]
    fn test_explicit_connections_win() {
        let edge = DiagramNode::edge(
            "e",
            "notify",
            Some("1"),
            (Some("b"), Some("a")),
            EdgePoints::new(None, None, vec![Point::new(120.0, 90.0)]),
        );
        let (flows, _) = run(vec![
            lifeline_node("a", "A", 0.0),
            lifeline_node("b", "B", 200.0),
            edge,
        ]);
        assert_eq!(flows[0].sender(), "B");
        assert_eq!(flows[0].receiver(), "A");
        assert_eq!(flows[0].y(), 90.0);
    }

    #[test]
    fn test_sender_beyond_threshold_is_dropped() {
        let (flows, warnings) = run(vec![
            lifeline_node("a", "A", 0.0),
            floating_edge("e", "lost", 500.0, 50.0, 10.0),
        ]);
        assert!(flows.is_empty());
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].code(), Some(ErrorCode::W200));
    }

    #[test]
    fn test_unresolved_receiver_is_unknown() {
        let (flows, warnings) = run(vec![
            lifeline_node("a", "A", 0.0),
            floating_edge("e", "shout", 50.0, 900.0, 10.0),
        ]);
        assert_eq!(flows[0].receiver(), UNKNOWN_PARTICIPANT);
        assert_eq!(warnings[0].code(), Some(ErrorCode::W201));
    }

    #[test]
    fn test_unlabelled_edges_are_ignored() {
        let (flows, warnings) = run(vec![
            lifeline_node("a", "A", 0.0),
            floating_edge("e", "<br>", 50.0, 50.0, 10.0),
        ]);
        assert!(flows.is_empty());
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_terminal_points_follow_parent_frame() {
        let group = DiagramNode::vertex(
            "g",
            "",
            "group",
            Some("1"),
            RawGeometry::new(Point::new(0.0, 300.0), Size::new(400.0, 100.0), false),
        );
        let mut edge = floating_edge("e", "inner", 50.0, 250.0, 10.0);
        edge.parent = Some("g".into());
        let (flows, _) = run(vec![
            lifeline_node("a", "A", 0.0),
            lifeline_node("b", "B", 200.0),
            group,
            edge,
        ]);
        assert_eq!(flows[0].y(), 310.0);
    }
}

#[cfg(test)]
mod proptest_tests {
    use proptest::prelude::*;
    use seqmodel_core::geometry::Size;

    use super::*;
    use crate::{
        document::{EdgePoints, RawGeometry},
        extract::lifeline,
    };

    proptest! {
        #[test]
        fn sender_is_never_matched_beyond_threshold(
            center in 0.0f32..1000.0,
            start in -500.0f32..1500.0,
        ) {
            let doc = Document::from_nodes(vec![
                DiagramNode::vertex(
                    "a",
                    "A",
                    "shape=umlLifeline;",
                    None,
                    RawGeometry::new(Point::new(center - 50.0, 0.0), Size::new(100.0, 400.0), false),
                ),
                DiagramNode::edge(
                    "e",
                    "m",
                    None,
                    (None, None),
                    EdgePoints::new(Some(Point::new(start, 0.0)), Some(Point::new(center, 0.0)), vec![]),
                ),
            ]);
            let mut collector = DiagnosticCollector::new();
            let geometry = GeometryIndex::build(&doc, &mut collector);
            let registry = lifeline::collect(&doc, &geometry);
            let config = ExtractConfig::default();
            let flows = collect(&doc, &geometry, &registry, &config, &mut collector);

            let center_x = registry.into_lifelines()[0].center_x();
            let within = (center_x - start).abs() <= config.distance_threshold();
            prop_assert_eq!(flows.len() == 1, within);
        }
    }
}
