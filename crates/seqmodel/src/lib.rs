//! seqmodel - Compile draw.io sequence diagrams into Event-B models.
//!
//! A sequence diagram drawn in draw.io is read back as an interaction
//! (participants, ordered messages, guarded frames) and synthesized into an
//! Event-B context and machine describing the message protocol.

pub mod advisory;
pub mod config;
pub mod export;
pub mod formal;

mod error;

pub use seqmodel_core::{geometry, model};
pub use seqmodel_drawio::{ParsedDiagram, error::Diagnostic};

pub use error::SeqModelError;

use std::{fs, path::Path};

use log::{debug, info, trace};

use seqmodel_drawio::NameHints;

use config::AppConfig;
use export::{Exporter, eventb::EventBWriter};
use formal::FormalModel;
use model::InteractionModel;

/// Builder for compiling diagrams into Event-B text.
///
/// This provides an API for processing diagrams through the loading,
/// synthesis and rendering stages.
///
/// # Examples
///
/// ```rust
/// use seqmodel::{ModelBuilder, config::AppConfig};
///
/// let source = r#"<mxGraphModel><root>
///   <mxCell id="0"/><mxCell id="1" parent="0"/>
///   <mxCell id="a" value="Client" style="shape=umlLifeline;" vertex="1" parent="1">
///     <mxGeometry x="0" y="0" width="100" height="300" as="geometry"/>
///   </mxCell>
///   <mxCell id="b" value="Server" style="shape=umlLifeline;" vertex="1" parent="1">
///     <mxGeometry x="200" y="0" width="100" height="300" as="geometry"/>
///   </mxCell>
///   <mxCell id="e" value="ping()" edge="1" parent="1" source="a" target="b">
///     <mxGeometry relative="1" as="geometry">
///       <mxPoint x="50" y="60" as="sourcePoint"/>
///     </mxGeometry>
///   </mxCell>
/// </root></mxGraphModel>"#;
///
/// let builder = ModelBuilder::new(AppConfig::default());
///
/// // Recover the interaction from the diagram
/// let parsed = builder.parse(source).expect("Failed to parse");
///
/// // Synthesize and render the Event-B model
/// let formal = builder.synthesize(parsed.model());
/// let text = builder.render(&formal).expect("Failed to render");
///
/// assert!(text.contains("EVENT sendping_1"));
///
/// // Or use default config
/// let builder = ModelBuilder::default();
/// ```
#[derive(Default)]
pub struct ModelBuilder {
    config: AppConfig,
}

impl ModelBuilder {
    /// Create a new model builder with the given configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Application configuration including extraction thresholds
    ///   and output settings
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// The configuration this builder was created with.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Read a diagram file and recover its interaction model.
    ///
    /// The file stem is used as the system name when neither the
    /// configuration nor the diagram provides one.
    ///
    /// # Errors
    ///
    /// Returns [`SeqModelError::Io`] if the file cannot be read and
    /// [`SeqModelError::Decode`] if it is not a well-formed document.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<ParsedDiagram, SeqModelError> {
        let path = path.as_ref();
        info!(path:? = path; "Loading diagram");

        let source = fs::read_to_string(path)?;
        trace!(bytes = source.len(); "File read");

        let file_stem = path.file_stem().and_then(|stem| stem.to_str());
        self.parse_source(&source, file_stem)
    }

    /// Recover the interaction model from diagram text.
    ///
    /// Soft problems such as unresolved message endpoints do not fail the
    /// call; they are available from [`ParsedDiagram::warnings`].
    ///
    /// # Arguments
    ///
    /// * `source` - draw.io / mxGraph XML, optionally with a compressed page
    ///
    /// # Errors
    ///
    /// Returns [`SeqModelError::Decode`] if the text is not well-formed XML.
    pub fn parse(&self, source: &str) -> Result<ParsedDiagram, SeqModelError> {
        self.parse_source(source, None)
    }

    fn parse_source(
        &self,
        source: &str,
        file_stem: Option<&str>,
    ) -> Result<ParsedDiagram, SeqModelError> {
        info!("Parsing diagram");

        let hints = NameHints {
            explicit: self.config.output().name(),
            file_stem,
        };
        let extract_config = self.config.extraction().to_extract_config();
        let parsed = seqmodel_drawio::parse(source, &extract_config, hints)?;

        debug!(
            base_name = parsed.model().base_name(),
            flows = parsed.model().flows().len(),
            warnings = parsed.warnings().len();
            "Diagram parsed successfully"
        );
        trace!(model:? = parsed.model(); "Interaction model");

        Ok(parsed)
    }

    /// Synthesize the Event-B context and machine for an interaction.
    ///
    /// The machine version comes from the output configuration. Renamed
    /// identifiers are reported by [`FormalModel::warnings`].
    pub fn synthesize(&self, model: &InteractionModel) -> FormalModel {
        info!(version = self.config.output().version().get(); "Synthesizing formal model");
        formal::synthesize(model, self.config.output().version())
    }

    /// Render a formal model as Event-B text in the configured notation.
    ///
    /// # Errors
    ///
    /// Returns [`SeqModelError::Export`] if rendering fails.
    pub fn render(&self, model: &FormalModel) -> Result<String, SeqModelError> {
        let writer = EventBWriter::new(self.config.output().notation());
        let text = writer.export_model(model)?;
        info!(bytes = text.len(); "Event-B text rendered");
        Ok(text)
    }
}
