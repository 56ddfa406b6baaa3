//! The normalized node tree produced by the loader.
//!
//! Every optional attribute is resolved to an explicit default when the
//! document is loaded, so extractors never deal with missing values: an
//! absent label or style is the empty string and absent geometry is a zero
//! box at the parent's origin.

use std::collections::HashMap;

use seqmodel_core::geometry::{Point, Size};

use crate::span::Span;

/// Whether a cell is drawn as a shape, a connector, or neither.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Vertex,
    Edge,
    /// Structural cells such as the layer roots `0` and `1`.
    Other,
}

/// Geometry as written in the document, relative to the parent cell.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RawGeometry {
    origin: Point,
    size: Size,
    relative: bool,
}

impl RawGeometry {
    pub fn new(origin: Point, size: Size, relative: bool) -> Self {
        Self {
            origin,
            size,
            relative,
        }
    }

    pub fn origin(&self) -> Point {
        self.origin
    }

    pub fn size(&self) -> Size {
        self.size
    }

    /// Relative geometries (edges and edge labels) are expressed in terms of
    /// their own cell and contribute no offset to their children.
    pub fn is_relative(&self) -> bool {
        self.relative
    }
}

/// Terminal and waypoint coordinates of an edge, relative to the edge's parent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgePoints {
    source: Option<Point>,
    target: Option<Point>,
    waypoints: Vec<Point>,
}

impl EdgePoints {
    pub fn new(source: Option<Point>, target: Option<Point>, waypoints: Vec<Point>) -> Self {
        Self {
            source,
            target,
            waypoints,
        }
    }

    pub fn source(&self) -> Option<Point> {
        self.source
    }

    pub fn target(&self) -> Option<Point> {
        self.target
    }

    pub fn waypoints(&self) -> &[Point] {
        &self.waypoints
    }
}

/// One cell of the diagram.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagramNode {
    pub(crate) id: String,
    pub(crate) label: String,
    pub(crate) style: String,
    pub(crate) parent: Option<String>,
    pub(crate) kind: NodeKind,
    pub(crate) source: Option<String>,
    pub(crate) target: Option<String>,
    pub(crate) geometry: RawGeometry,
    pub(crate) points: EdgePoints,
    pub(crate) span: Span,
}

impl DiagramNode {
    /// Create a vertex node. Mostly useful for tests.
    pub fn vertex(
        id: impl Into<String>,
        label: impl Into<String>,
        style: impl Into<String>,
        parent: Option<&str>,
        geometry: RawGeometry,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            style: style.into(),
            parent: parent.map(str::to_string),
            kind: NodeKind::Vertex,
            source: None,
            target: None,
            geometry,
            points: EdgePoints::default(),
            span: Span::default(),
        }
    }

    /// Create an edge node. Mostly useful for tests.
    pub fn edge(
        id: impl Into<String>,
        label: impl Into<String>,
        parent: Option<&str>,
        endpoints: (Option<&str>, Option<&str>),
        points: EdgePoints,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            style: String::new(),
            parent: parent.map(str::to_string),
            kind: NodeKind::Edge,
            source: endpoints.0.map(str::to_string),
            target: endpoints.1.map(str::to_string),
            geometry: RawGeometry::new(Point::default(), Size::default(), true),
            points,
            span: Span::default(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The raw label, possibly containing HTML markup.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn style(&self) -> &str {
        &self.style
    }

    /// True if the style descriptor mentions `marker` anywhere.
    pub fn style_contains(&self, marker: &str) -> bool {
        self.style.contains(marker)
    }

    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn is_vertex(&self) -> bool {
        self.kind == NodeKind::Vertex
    }

    pub fn is_edge(&self) -> bool {
        self.kind == NodeKind::Edge
    }

    /// Explicit source cell id of an edge.
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Explicit target cell id of an edge.
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    pub fn geometry(&self) -> RawGeometry {
        self.geometry
    }

    pub fn points(&self) -> &EdgePoints {
        &self.points
    }

    /// Byte range of the element in [`Document::source`].
    pub fn span(&self) -> Span {
        self.span
    }
}

/// A loaded diagram: every cell in document order plus the page metadata.
#[derive(Debug, Clone, Default)]
pub struct Document {
    nodes: Vec<DiagramNode>,
    index: HashMap<String, usize>,
    page_names: Vec<String>,
    root_name: Option<String>,
    source: String,
}

impl Document {
    /// Assemble a document. The first node with a given id wins the index.
    pub fn new(
        nodes: Vec<DiagramNode>,
        page_names: Vec<String>,
        root_name: Option<String>,
        source: impl Into<String>,
    ) -> Self {
        let mut index = HashMap::with_capacity(nodes.len());
        for (position, node) in nodes.iter().enumerate() {
            index.entry(node.id.clone()).or_insert(position);
        }
        Self {
            nodes,
            index,
            page_names,
            root_name,
            source: source.into(),
        }
    }

    /// Build a document from nodes alone, without page metadata.
    pub fn from_nodes(nodes: Vec<DiagramNode>) -> Self {
        Self::new(nodes, Vec::new(), None, String::new())
    }

    /// All cells in document order.
    pub fn nodes(&self) -> &[DiagramNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&DiagramNode> {
        self.position(id).map(|position| &self.nodes[position])
    }

    /// Document-order position of the cell with `id`.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Positions of the ancestors of the cell at `position`, nearest first.
    ///
    /// The walk visits at most as many cells as the document holds, so a
    /// parent cycle cannot loop forever.
    pub fn ancestors(&self, position: usize) -> impl Iterator<Item = usize> + '_ {
        std::iter::successors(Some(position), move |&current| {
            self.nodes[current]
                .parent()
                .and_then(|parent| self.position(parent))
        })
        .skip(1)
        .take(self.nodes.len())
    }

    /// Names of the `<diagram>` pages, in document order.
    pub fn page_names(&self) -> &[String] {
        &self.page_names
    }

    /// The `name` attribute of the document root element.
    pub fn root_name(&self) -> Option<&str> {
        self.root_name.as_deref()
    }

    /// The text the node spans refer to.
    ///
    /// This is the decoded payload when the page was stored compressed and
    /// the document text as given otherwise.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Consume the document, keeping only its source text.
    pub fn into_source(self) -> String {
        self.source
    }
}
