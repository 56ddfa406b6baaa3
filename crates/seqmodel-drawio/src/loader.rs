//! Parse draw.io / mxGraph XML into a [`Document`].
//!
//! A draw.io file is either a bare `<mxGraphModel>` or an `<mxfile>` holding
//! one `<diagram>` element per page. Each page carries its model inline or
//! as a compressed payload: the model XML is percent-encoded, raw-deflated
//! and base64-encoded into the `<diagram>` element's text.
//!
//! When the first page is compressed the loader decodes it and extracts
//! cells from the decoded model only. If any decode stage fails, a
//! [`ErrorCode::W100`] warning is recorded and cells are taken from the
//! outer tree instead, which for a compressed file is usually empty.

use std::io::Read;

use base64::{Engine, engine::general_purpose::STANDARD};
use flate2::read::DeflateDecoder;
use log::{debug, trace};
use percent_encoding::percent_decode_str;
use seqmodel_core::geometry::{Point, Size};

use crate::{
    document::{DiagramNode, Document, EdgePoints, NodeKind, RawGeometry},
    error::{Diagnostic, DiagnosticCollector, ErrorCode, LoadError},
    span::Span,
};

const CELL_TAG: &str = "mxCell";
const GEOMETRY_TAG: &str = "mxGeometry";
const POINT_TAG: &str = "mxPoint";
const PAGE_TAG: &str = "diagram";
const WRAPPER_TAGS: [&str; 2] = ["UserObject", "object"];

/// Failure of one stage of the compressed payload decode chain.
#[derive(Debug, thiserror::Error)]
enum PayloadError {
    #[error("payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("payload could not be inflated: {0}")]
    Inflate(#[from] std::io::Error),

    #[error("decoded payload is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("decoded payload is not well-formed XML: {0}")]
    Markup(#[from] roxmltree::Error),
}

/// Load a document from its text.
///
/// Returns the normalized document together with any warnings. Fails only
/// when `text` is not well-formed XML.
///
/// # Errors
///
/// Returns a [`LoadError`] carrying an [`ErrorCode::E001`] diagnostic that
/// points at the position the XML parser rejected.
pub fn load_str(text: &str) -> Result<(Document, Vec<Diagnostic>), LoadError> {
    let outer = match roxmltree::Document::parse(text) {
        Ok(outer) => outer,
        Err(err) => {
            let pos = err.pos();
            let offset = byte_offset(text, pos.row, pos.col);
            let end = text[offset..]
                .chars()
                .next()
                .map_or(offset, |c| offset + c.len_utf8());
            let diagnostic = Diagnostic::error(format!("malformed diagram markup: {err}"))
                .with_code(ErrorCode::E001)
                .with_label(Span::new(offset..end), "parsing stopped here")
                .with_help("the file must be a draw.io diagram saved as XML");
            return Err(LoadError::new(vec![diagnostic], text));
        }
    };

    let mut collector = DiagnosticCollector::new();
    let root = outer.root_element();
    let root_name = non_empty(root.attribute("name"));
    let pages: Vec<_> = root
        .descendants()
        .filter(|node| node.has_tag_name(PAGE_TAG))
        .collect();
    let page_names = pages
        .iter()
        .filter_map(|page| non_empty(page.attribute("name")))
        .collect();

    let first_page = pages.first().copied();
    let decoded = first_page.and_then(|page| {
        let payload = compressed_payload(page)?;
        decode_payload(payload)
            .inspect_err(|err| report_payload_failure(err, page, &mut collector))
            .ok()
    });

    let inner = decoded.as_deref().map(roxmltree::Document::parse);
    let document = match (inner, decoded.as_deref()) {
        (Some(Ok(inner)), Some(decoded)) => {
            debug!(bytes = decoded.len(); "Decoded compressed diagram payload");
            let nodes = collect_nodes(inner.root_element(), &mut collector);
            Document::new(nodes, page_names, root_name, decoded)
        }
        (Some(Err(err)), _) => {
            if let Some(page) = first_page {
                report_payload_failure(&PayloadError::from(err), page, &mut collector);
            }
            let nodes = collect_nodes(root, &mut collector);
            Document::new(nodes, page_names, root_name, text)
        }
        _ => {
            let nodes = collect_nodes(root, &mut collector);
            Document::new(nodes, page_names, root_name, text)
        }
    };

    debug!(cells = document.len(); "Loaded diagram document");
    let warnings = collector.finish(document.source())?;
    Ok((document, warnings))
}

/// The payload text of a page that stores its model compressed.
fn compressed_payload<'a>(page: roxmltree::Node<'a, '_>) -> Option<&'a str> {
    if page.children().any(|child| child.is_element()) {
        return None;
    }
    page.text().map(str::trim).filter(|text| !text.is_empty())
}

/// Run the decode chain: base64, raw inflate, percent-decode.
fn decode_payload(payload: &str) -> Result<String, PayloadError> {
    let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    let deflated = STANDARD.decode(compact)?;

    let mut inflated = Vec::new();
    DeflateDecoder::new(deflated.as_slice()).read_to_end(&mut inflated)?;
    let encoded = std::str::from_utf8(&inflated)?;

    let decoded = percent_decode_str(encoded).decode_utf8()?;
    Ok(decoded.into_owned())
}

fn report_payload_failure(
    err: &PayloadError,
    page: roxmltree::Node<'_, '_>,
    collector: &mut DiagnosticCollector,
) {
    collector.emit(
        Diagnostic::warning(format!("could not decode the compressed diagram: {err}"))
            .with_code(ErrorCode::W100)
            .with_label(Span::new(page.range()), "compressed page")
            .with_help("re-save the diagram uncompressed (File > Properties > Compressed)"),
    );
}

/// Collect every cell under `root` in document order.
fn collect_nodes(
    root: roxmltree::Node<'_, '_>,
    collector: &mut DiagnosticCollector,
) -> Vec<DiagramNode> {
    root.descendants()
        .filter(|node| node.has_tag_name(CELL_TAG))
        .filter_map(|cell| read_cell(cell, collector))
        .collect()
}

/// Normalize one `mxCell`, flattening a `UserObject`/`object` wrapper.
///
/// The wrapper carries the id and the label; the cell carries everything else.
fn read_cell(
    cell: roxmltree::Node<'_, '_>,
    collector: &mut DiagnosticCollector,
) -> Option<DiagramNode> {
    let wrapper = cell
        .parent_element()
        .filter(|parent| WRAPPER_TAGS.contains(&parent.tag_name().name()));

    let id = wrapper
        .and_then(|w| w.attribute("id"))
        .or_else(|| cell.attribute("id"));
    let Some(id) = id else {
        trace!(pos = cell.range().start; "Skipping cell without id");
        return None;
    };

    let label = match wrapper {
        Some(w) => w.attribute("label").or_else(|| w.attribute("value")),
        None => cell.attribute("value"),
    }
    .unwrap_or_default();

    let kind = if cell.attribute("edge") == Some("1") {
        NodeKind::Edge
    } else if cell.attribute("vertex") == Some("1") {
        NodeKind::Vertex
    } else {
        NodeKind::Other
    };

    let (geometry, points) = cell
        .children()
        .find(|child| child.has_tag_name(GEOMETRY_TAG))
        .map(|geometry| read_geometry(geometry, id, collector))
        .unwrap_or_default();

    Some(DiagramNode {
        id: id.to_string(),
        label: label.to_string(),
        style: cell.attribute("style").unwrap_or_default().to_string(),
        parent: non_empty(cell.attribute("parent")),
        kind,
        source: non_empty(cell.attribute("source")),
        target: non_empty(cell.attribute("target")),
        geometry,
        points,
        span: Span::new(wrapper.unwrap_or(cell).range()),
    })
}

fn read_geometry(
    geometry: roxmltree::Node<'_, '_>,
    id: &str,
    collector: &mut DiagnosticCollector,
) -> (RawGeometry, EdgePoints) {
    let origin = Point::new(
        read_number(geometry, "x", id, collector),
        read_number(geometry, "y", id, collector),
    );
    let size = Size::new(
        read_number(geometry, "width", id, collector),
        read_number(geometry, "height", id, collector),
    );
    let relative = geometry.attribute("relative") == Some("1");

    let mut source = None;
    let mut target = None;
    let mut waypoints = Vec::new();
    for child in geometry.children().filter(roxmltree::Node::is_element) {
        match (child.tag_name().name(), child.attribute("as")) {
            (POINT_TAG, Some("sourcePoint")) => source = Some(read_point(child, id, collector)),
            (POINT_TAG, Some("targetPoint")) => target = Some(read_point(child, id, collector)),
            ("Array", Some("points")) => {
                for point in child.children().filter(|c| c.has_tag_name(POINT_TAG)) {
                    waypoints.push(read_point(point, id, collector));
                }
            }
            _ => {}
        }
    }

    (
        RawGeometry::new(origin, size, relative),
        EdgePoints::new(source, target, waypoints),
    )
}

fn read_point(node: roxmltree::Node<'_, '_>, id: &str, collector: &mut DiagnosticCollector) -> Point {
    Point::new(
        read_number(node, "x", id, collector),
        read_number(node, "y", id, collector),
    )
}

/// Read a numeric attribute, treating absent as zero and invalid as zero
/// with a [`ErrorCode::W204`] warning.
fn read_number(
    node: roxmltree::Node<'_, '_>,
    name: &str,
    id: &str,
    collector: &mut DiagnosticCollector,
) -> f32 {
    let Some(raw) = node.attribute(name) else {
        return 0.0;
    };
    match raw.trim().parse::<f32>() {
        Ok(value) if value.is_finite() => value,
        _ => {
            collector.emit(
                Diagnostic::warning(format!(
                    "attribute `{name}` of cell `{id}` is not a number: `{raw}`"
                ))
                .with_code(ErrorCode::W204)
                .with_label(Span::new(node.range()), "treated as 0"),
            );
            0.0
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Convert a 1-based row/column position into a byte offset into `text`.
fn byte_offset(text: &str, row: u32, col: u32) -> usize {
    let mut offset = 0;
    for (index, line) in text.split_inclusive('\n').enumerate() {
        if index + 1 == row as usize {
            let column = col.saturating_sub(1) as usize;
            let within = line
                .char_indices()
                .nth(column)
                .map_or(line.len(), |(position, _)| position);
            return offset + within;
        }
        offset += line.len();
    }
    text.len()
}
