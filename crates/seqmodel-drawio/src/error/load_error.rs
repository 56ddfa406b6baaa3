//! The fatal error returned when a document cannot be loaded.

use std::fmt;

use crate::error::Diagnostic;

/// A document could not be loaded.
///
/// Carries the fatal diagnostic together with any warnings emitted before
/// it, and the text the spans refer to so the caller can render snippets.
#[derive(Debug)]
pub struct LoadError {
    diagnostics: Vec<Diagnostic>,
    source_text: String,
}

impl LoadError {
    pub fn new(diagnostics: Vec<Diagnostic>, source_text: impl Into<String>) -> Self {
        Self {
            diagnostics,
            source_text: source_text.into(),
        }
    }

    /// All diagnostics, fatal and advisory, in emission order.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// The text that diagnostic spans refer to.
    pub fn source_text(&self) -> &str {
        &self.source_text
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut errors = self.diagnostics.iter().filter(|d| d.severity().is_error());
        let first = errors.next().or_else(|| self.diagnostics.first());
        if let Some(first) = first {
            write!(f, "{}", first)?;
            if self.diagnostics.len() > 1 {
                write!(f, " (+{} more)", self.diagnostics.len() - 1)?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for LoadError {}
