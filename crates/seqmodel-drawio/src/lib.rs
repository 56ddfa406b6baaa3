//! draw.io sequence diagram front end for seqmodel.
//!
//! This crate turns draw.io / mxGraph XML into a
//! [`seqmodel_core::model::InteractionModel`]:
//!
//! 1. **Load**: parse the XML, decoding a compressed page if present
//!    ([`load_str`])
//! 2. **Extract**: recover participants, scopes, ordered messages and
//!    guard variables from geometry and labels ([`extract::extract`])
//!
//! Loading fails only on malformed XML. Everything after that degrades
//! gracefully and reports [`error::Diagnostic`] warnings instead.
//!
//! # Example
//!
//! ```
//! use seqmodel_drawio::{ExtractConfig, NameHints, parse};
//!
//! let xml = r#"<mxGraphModel><root>
//!   <mxCell id="0"/><mxCell id="1" parent="0"/>
//!   <mxCell id="a" value="Client" style="shape=umlLifeline;" vertex="1" parent="1">
//!     <mxGeometry x="0" y="0" width="100" height="300" as="geometry"/>
//!   </mxCell>
//!   <mxCell id="b" value="Server" style="shape=umlLifeline;" vertex="1" parent="1">
//!     <mxGeometry x="200" y="0" width="100" height="300" as="geometry"/>
//!   </mxCell>
//!   <mxCell id="e" value="ping()" edge="1" parent="1" source="a" target="b">
//!     <mxGeometry relative="1" as="geometry">
//!       <mxPoint x="50" y="60" as="sourcePoint"/>
//!     </mxGeometry>
//!   </mxCell>
//! </root></mxGraphModel>"#;
//!
//! let hints = NameHints { explicit: Some("ping pong"), file_stem: None };
//! let parsed = parse(xml, &ExtractConfig::default(), hints).unwrap();
//!
//! assert!(parsed.warnings().is_empty());
//! assert_eq!(parsed.model().base_name(), "PingPong");
//! assert_eq!(parsed.model().flows()[0].instance_id(), "ping_1");
//! ```

pub mod error;
pub mod extract;

mod document;
mod geometry;
mod loader;
mod markup;
mod span;

pub use document::{DiagramNode, Document, EdgePoints, NodeKind, RawGeometry};
pub use extract::{ExtractConfig, NameHints};
pub use geometry::GeometryIndex;
pub use loader::load_str;
pub use span::Span;

use seqmodel_core::model::InteractionModel;

use crate::error::{Diagnostic, LoadError};

/// The result of [`parse`]: the model, its warnings, and the text the
/// warning spans refer to.
#[derive(Debug)]
pub struct ParsedDiagram {
    model: InteractionModel,
    warnings: Vec<Diagnostic>,
    source_text: String,
}

impl ParsedDiagram {
    pub fn model(&self) -> &InteractionModel {
        &self.model
    }

    /// Warnings from loading and extraction, in emission order.
    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    /// The effective document text; the decoded payload for compressed pages.
    pub fn source_text(&self) -> &str {
        &self.source_text
    }
}

/// Load `text` and extract its interaction model in one step.
///
/// # Errors
///
/// Returns a [`LoadError`] when `text` is not well-formed XML.
pub fn parse(
    text: &str,
    config: &ExtractConfig,
    hints: NameHints<'_>,
) -> Result<ParsedDiagram, LoadError> {
    let (document, mut warnings) = load_str(text)?;
    let (model, extraction_warnings) = extract::extract(&document, config, hints);
    warnings.extend(extraction_warnings);
    Ok(ParsedDiagram {
        model,
        warnings,
        source_text: document.into_source(),
    })
}
