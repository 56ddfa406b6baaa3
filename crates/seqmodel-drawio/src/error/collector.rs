//! Collector for accumulating diagnostics during loading and extraction.

use crate::error::{Diagnostic, LoadError};

/// Accumulates diagnostics so a stage can report every problem it finds.
///
/// Warnings are kept on success; callers surface them alongside the
/// produced model.
#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
    has_errors: bool,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic.
    pub fn emit(&mut self, diagnostic: Diagnostic) {
        if diagnostic.severity().is_error() {
            self.has_errors = true;
        }
        self.diagnostics.push(diagnostic);
    }

    /// Finish collection.
    ///
    /// - If an error was emitted, returns `Err(LoadError)` with all diagnostics.
    /// - Otherwise returns the warnings in emission order.
    pub fn finish(self, source_text: &str) -> Result<Vec<Diagnostic>, LoadError> {
        if self.has_errors {
            Err(LoadError::new(self.diagnostics, source_text))
        } else {
            Ok(self.diagnostics)
        }
    }

    /// Return the diagnostics regardless of severity.
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::ErrorCode, span::Span};

    #[test]
    fn test_empty_collector_finishes_ok() {
        let collector = DiagnosticCollector::new();
        assert!(collector.finish("").unwrap().is_empty());
    }

    #[test]
    fn test_warnings_survive_success() {
        let mut collector = DiagnosticCollector::new();
        collector.emit(Diagnostic::warning("one").with_code(ErrorCode::W201));
        collector.emit(Diagnostic::warning("two"));

        let warnings = collector.finish("").unwrap();
        assert_eq!(warnings.len(), 2);
        assert_eq!(warnings[0].code(), Some(ErrorCode::W201));
    }

    #[test]
    fn test_error_fails_with_everything() {
        let mut collector = DiagnosticCollector::new();
        collector.emit(Diagnostic::warning("first"));
        collector.emit(
            Diagnostic::error("broken")
                .with_code(ErrorCode::E001)
                .with_label(Span::new(3..4), "here"),
        );

        let err = collector.finish("<a>").unwrap_err();
        assert_eq!(err.diagnostics().len(), 2);
        assert_eq!(err.source_text(), "<a>");
    }
}
