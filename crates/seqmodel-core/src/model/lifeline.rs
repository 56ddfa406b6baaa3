//! Participants recovered from lifeline and actor shapes.

use std::fmt;

/// Receiver name used when a message target cannot be matched to any participant.
pub const UNKNOWN_PARTICIPANT: &str = "Unknown";

/// A participant appearing as a vertical track in the diagram.
///
/// The resolved display name is the identity key: several diagram nodes that
/// resolve to the same name are merged into one lifeline, and every merged
/// node id is kept so explicit edge endpoints can still be matched.
#[derive(Debug, Clone, PartialEq)]
pub struct Lifeline {
    name: String,
    center_x: f32,
    node_ids: Vec<String>,
}

impl Lifeline {
    /// Create a lifeline for a single diagram node.
    pub fn new(name: impl Into<String>, center_x: f32, node_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            center_x,
            node_ids: vec![node_id.into()],
        }
    }

    /// The resolved display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Absolute horizontal center of the participant shape.
    pub fn center_x(&self) -> f32 {
        self.center_x
    }

    /// Ids of every diagram node merged into this lifeline.
    pub fn node_ids(&self) -> &[String] {
        &self.node_ids
    }

    /// Returns true if `id` belongs to one of the merged nodes.
    pub fn has_node(&self, id: &str) -> bool {
        self.node_ids.iter().any(|node_id| node_id == id)
    }

    /// Record another node that resolved to the same name.
    ///
    /// The first node's center is kept.
    pub fn merge_node(&mut self, node_id: impl Into<String>) {
        let node_id = node_id.into();
        if !self.has_node(&node_id) {
            self.node_ids.push(node_id);
        }
    }
}

impl fmt::Display for Lifeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
