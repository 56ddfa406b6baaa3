//! miette rendering for compiler errors and warnings.
//!
//! A fatal [`SeqModelError::Decode`] is shown as one report per diagnostic,
//! each with a snippet of the document. Every other error becomes a single
//! report carrying a `seqmodel::*` code. Non-fatal warnings from loading,
//! extraction and synthesis go through [`DiagnosticAdapter`] as well.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, GraphicalReportHandler, LabeledSpan, SourceSpan};

use seqmodel::SeqModelError;
use seqmodel_drawio::{Span, error::Diagnostic};

/// A seqmodel [`Diagnostic`] paired with the document text its spans point into.
///
/// Synthesis warnings carry no labels and render without a snippet.
#[derive(Debug)]
pub struct DiagnosticAdapter<'a> {
    diag: &'a Diagnostic,
    src: &'a str,
}

impl<'a> DiagnosticAdapter<'a> {
    pub fn new(diag: &'a Diagnostic, src: &'a str) -> Self {
        Self { diag, src }
    }
}

impl fmt::Display for DiagnosticAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.diag.message())
    }
}

impl std::error::Error for DiagnosticAdapter<'_> {}

impl MietteDiagnostic for DiagnosticAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = self.diag.code()?;
        Some(Box::new(code))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(if self.diag.severity().is_error() {
            miette::Severity::Error
        } else {
            miette::Severity::Warning
        })
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = self.diag.help()?;
        Some(Box::new(help))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        if self.diag.labels().is_empty() {
            None
        } else {
            Some(&self.src as &dyn miette::SourceCode)
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        if self.diag.labels().is_empty() {
            return None;
        }

        Some(Box::new(self.diag.labels().iter().map(|label| {
            let span = source_span(label.span());
            let text = Some(label.message().to_string());
            if label.is_primary() {
                LabeledSpan::new_primary_with_span(text, span)
            } else {
                LabeledSpan::new_with_span(text, span)
            }
        })))
    }
}

/// One report for the terminal.
#[derive(Debug)]
pub enum Reportable<'a> {
    /// A located diagnostic from a document that failed to load.
    Diagnostic(DiagnosticAdapter<'a>),
    /// Any other failure: I/O, configuration or rendering.
    Error(&'a SeqModelError),
}

impl fmt::Display for Reportable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reportable::Diagnostic(adapter) => fmt::Display::fmt(adapter, f),
            Reportable::Error(err) => fmt::Display::fmt(err, f),
        }
    }
}

impl std::error::Error for Reportable<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Reportable::Diagnostic(_) => None,
            Reportable::Error(err) => std::error::Error::source(*err),
        }
    }
}

impl MietteDiagnostic for Reportable<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match self {
            Reportable::Diagnostic(adapter) => return adapter.code(),
            Reportable::Error(SeqModelError::Decode(_)) => return None,
            Reportable::Error(SeqModelError::Io(_)) => "seqmodel::io",
            Reportable::Error(SeqModelError::Config(_)) => "seqmodel::config",
            Reportable::Error(SeqModelError::Export(_)) => "seqmodel::export",
        };
        Some(Box::new(code))
    }

    fn severity(&self) -> Option<miette::Severity> {
        match self {
            Reportable::Diagnostic(adapter) => adapter.severity(),
            Reportable::Error(_) => Some(miette::Severity::Error),
        }
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Diagnostic(adapter) => adapter.help(),
            Reportable::Error(SeqModelError::Config(_)) => Some(Box::new(
                "check the [extraction], [output] and [advisory] sections of the configuration file",
            )),
            Reportable::Error(_) => None,
        }
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        match self {
            Reportable::Diagnostic(adapter) => adapter.source_code(),
            Reportable::Error(_) => None,
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        match self {
            Reportable::Diagnostic(adapter) => adapter.labels(),
            Reportable::Error(_) => None,
        }
    }
}

fn source_span(span: Span) -> SourceSpan {
    SourceSpan::new(span.start().into(), span.len())
}

/// Split an error into the reports to print, in order.
pub fn to_reportables(err: &SeqModelError) -> Vec<Reportable<'_>> {
    match err {
        SeqModelError::Decode(load_err) => load_err
            .diagnostics()
            .iter()
            .map(|diag| Reportable::Diagnostic(DiagnosticAdapter::new(diag, load_err.source_text())))
            .collect(),
        _ => vec![Reportable::Error(err)],
    }
}

/// Render a report with miette's graphical handler, or as its bare message
/// if that fails.
pub fn render(report: &dyn MietteDiagnostic) -> String {
    let mut out = String::new();
    match GraphicalReportHandler::new().render_report(&mut out, report) {
        Ok(()) => out,
        Err(_) => report.to_string(),
    }
}
