//! Participant registry.

use log::debug;
use seqmodel_core::model::Lifeline;

use crate::{
    document::{DiagramNode, Document},
    extract::to_identifier,
    geometry::GeometryIndex,
    markup,
};

const PARTICIPANT_PREFIX: &str = "participant";
const PARTICIPANT_MARKERS: [&str; 3] = ["umlLifeline", "participant", "shape=umlActor"];

/// True if the cell is drawn as a lifeline, participant box, or actor.
pub(crate) fn is_participant(node: &DiagramNode) -> bool {
    PARTICIPANT_MARKERS
        .iter()
        .any(|marker| node.style_contains(marker))
}

/// Identifier of a participant label: the text after the last `:`.
///
/// `:OrderService` and `svc : OrderService` both resolve to `OrderService`,
/// and `Order Service` becomes `Order_Service`. Returns `None` for labels
/// with no usable text.
pub(crate) fn participant_name(label: &str) -> Option<String> {
    let text = markup::plain_text(label);
    text.rsplit(':')
        .find_map(|segment| to_identifier(segment, PARTICIPANT_PREFIX))
}

/// Participants in discovery order, keyed by resolved name.
#[derive(Debug, Default)]
pub(crate) struct LifelineRegistry {
    lifelines: Vec<Lifeline>,
}

impl LifelineRegistry {
    pub(crate) fn len(&self) -> usize {
        self.lifelines.len()
    }

    /// The participant owning the cell at `position`, directly or through
    /// an ancestor such as the lifeline an activation bar sits on.
    pub(crate) fn by_node(&self, document: &Document, position: usize) -> Option<&Lifeline> {
        std::iter::once(position)
            .chain(document.ancestors(position))
            .find_map(|candidate| {
                let id = document.nodes()[candidate].id();
                self.lifelines.iter().find(|lifeline| lifeline.has_node(id))
            })
    }

    /// The participant whose center is closest to `x`, if within `threshold`.
    ///
    /// Ties go to the participant discovered first.
    pub(crate) fn nearest(&self, x: f32, threshold: f32) -> Option<&Lifeline> {
        let mut best: Option<(&Lifeline, f32)> = None;
        for lifeline in &self.lifelines {
            let distance = (lifeline.center_x() - x).abs();
            match best {
                Some((_, best_distance)) if distance >= best_distance => {}
                _ => best = Some((lifeline, distance)),
            }
        }
        best.filter(|(_, distance)| *distance <= threshold)
            .map(|(lifeline, _)| lifeline)
    }

    pub(crate) fn into_lifelines(self) -> Vec<Lifeline> {
        self.lifelines
    }

    fn register(&mut self, name: String, center_x: f32, node_id: &str) {
        match self.lifelines.iter_mut().find(|l| l.name() == name) {
            Some(existing) => existing.merge_node(node_id),
            None => {
                debug!(name = name.as_str(), center_x = center_x; "Registered participant");
                self.lifelines.push(Lifeline::new(name, center_x, node_id));
            }
        }
    }
}

/// Collect every participant in document order.
pub(crate) fn collect(document: &Document, geometry: &GeometryIndex) -> LifelineRegistry {
    let mut registry = LifelineRegistry::default();
    for (position, node) in document.nodes().iter().enumerate() {
        if !is_participant(node) {
            continue;
        }
        let Some(name) = participant_name(node.label()) else {
            continue;
        };
        let center_x = geometry.absolute_bounds(document, position).center().x();
        registry.register(name, center_x, node.id());
    }
    registry
}
