//! CLI logic for the seqmodel compiler.
//!
//! This module contains the core CLI logic: configuration loading, applying
//! command-line overrides, compiling the diagram and writing the outputs.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use std::fs;

use log::{info, warn};

use seqmodel::{
    Diagnostic, ModelBuilder, SeqModelError,
    advisory::{AdvisoryRequest, CommandAdvisor, advise},
    config::AppConfig,
};

use error_adapter::DiagnosticAdapter;

/// Run the seqmodel CLI application
///
/// This function compiles the input diagram into Event-B text and writes it
/// to the output file. When `--advice` is given, the configured advisory
/// command is asked for property suggestions afterwards; its failure only
/// changes the note that is written, never the compiled output.
///
/// # Arguments
///
/// * `args` - Command-line arguments
///
/// # Errors
///
/// Returns `SeqModelError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Malformed diagram documents
/// - Rendering errors
pub fn run(args: &Args) -> Result<(), SeqModelError> {
    info!(
        input_path = args.input,
        output_path = args.output;
        "Processing diagram"
    );

    let app_config = apply_overrides(config::load_config(args.config.as_ref())?, args);

    let builder = ModelBuilder::new(app_config);
    let parsed = builder.load(&args.input)?;
    report_warnings(parsed.warnings(), parsed.source_text());

    let formal = builder.synthesize(parsed.model());
    report_warnings(formal.warnings(), parsed.source_text());
    let text = builder.render(&formal)?;

    fs::write(&args.output, text)?;
    info!(output_file = args.output; "Event-B model exported successfully");

    if let Some(advice_path) = &args.advice {
        let request = AdvisoryRequest::from_formal(parsed.model().base_name(), &formal);
        let advisor = CommandAdvisor::from_config(builder.config().advisory());
        let note = advise(&advisor, &request);

        fs::write(advice_path, note.to_string())?;
        info!(advice_file = advice_path, proposed = note.is_proposed(); "Advisory note written");
    }

    Ok(())
}

/// Layer command-line flags over the loaded configuration.
fn apply_overrides(config: AppConfig, args: &Args) -> AppConfig {
    let mut output = config.output().clone();
    if let Some(version) = args.version_number {
        output = output.with_version(version);
    }
    if let Some(notation) = args.notation {
        output = output.with_notation(notation);
    }
    if let Some(name) = &args.name {
        output = output.with_name(name.as_str());
    }
    config.with_output(output)
}

fn report_warnings(warnings: &[Diagnostic], source_text: &str) {
    for diagnostic in warnings {
        let adapter = DiagnosticAdapter::new(diagnostic, source_text);
        warn!("{}", error_adapter::render(&adapter));
    }
}
