//! Absolute geometry of diagram cells.
//!
//! Cell coordinates are relative to the parent cell. The absolute position
//! of a cell is its own offset plus the offsets of every ancestor; only the
//! x/y of ancestors accumulate, never their size. Ancestors whose geometry
//! is relative (edges) contribute nothing.

use std::collections::HashSet;

use log::warn;
use seqmodel_core::geometry::{Bounds, Point};

use crate::{
    document::{DiagramNode, Document},
    error::{Diagnostic, DiagnosticCollector, ErrorCode},
};

/// Memoized absolute origins, indexed by document position.
///
/// Built once per document; every parent chain is walked at most once.
#[derive(Debug, Clone)]
pub struct GeometryIndex {
    /// Absolute origin of the coordinate frame each cell is expressed in,
    /// i.e. the accumulated offset of its ancestors.
    frames: Vec<Point>,
}

impl GeometryIndex {
    /// Resolve the frame origin of every cell in `document`.
    ///
    /// A parent chain that loops back on itself is cut at the repeated cell
    /// and reported as [`ErrorCode::W203`].
    pub fn build(document: &Document, collector: &mut DiagnosticCollector) -> Self {
        let nodes = document.nodes();
        let mut frames: Vec<Option<Point>> = vec![None; nodes.len()];

        for start in 0..nodes.len() {
            if frames[start].is_some() {
                continue;
            }

            let mut chain = Vec::new();
            let mut on_chain = HashSet::new();
            let mut cursor = start;
            let base = loop {
                chain.push(cursor);
                on_chain.insert(cursor);

                let Some(parent) = nodes[cursor].parent().and_then(|id| document.position(id))
                else {
                    break Point::default();
                };
                if let Some(frame) = frames[parent] {
                    break frame.add_point(offset_of(&nodes[parent]));
                }
                if on_chain.contains(&parent) {
                    report_cycle(&nodes[parent], collector);
                    break Point::default();
                }
                cursor = parent;
            };

            let mut frame = base;
            for (depth, &position) in chain.iter().enumerate().rev() {
                frames[position] = Some(frame);
                if depth > 0 {
                    frame = frame.add_point(offset_of(&nodes[position]));
                }
            }
        }

        Self {
            frames: frames.into_iter().map(Option::unwrap_or_default).collect(),
        }
    }

    /// Absolute origin of the frame the cell at `position` is expressed in.
    pub fn frame_origin(&self, position: usize) -> Point {
        self.frames.get(position).copied().unwrap_or_default()
    }

    /// Absolute bounding box of a cell.
    pub fn absolute_bounds(&self, document: &Document, position: usize) -> Bounds {
        let node = &document.nodes()[position];
        let geometry = node.geometry();
        Bounds::new_from_top_left(
            self.frame_origin(position).add_point(geometry.origin()),
            geometry.size(),
        )
    }

    /// Translate a point given in a cell's frame into absolute coordinates.
    ///
    /// Used for edge terminal points and waypoints, which are expressed in
    /// the frame of the edge's parent.
    pub fn absolute_point(&self, position: usize, point: Point) -> Point {
        self.frame_origin(position).add_point(point)
    }
}

/// Offset a cell contributes to its children.
fn offset_of(node: &DiagramNode) -> Point {
    let geometry = node.geometry();
    if geometry.is_relative() {
        Point::default()
    } else {
        geometry.origin()
    }
}

fn report_cycle(node: &DiagramNode, collector: &mut DiagnosticCollector) {
    warn!(id = node.id(); "Parent chain loops back on itself");
    collector.emit(
        Diagnostic::warning(format!("parent chain of cell `{}` forms a cycle", node.id()))
            .with_code(ErrorCode::W203)
            .with_label(node.span(), "cell revisited here")
            .with_help("positions inside this chain are computed up to the repeated cell"),
    );
}
