//! Diagnostic codes.
//!
//! Codes are grouped by the stage that reports them:
//! - `E0xx` - Fatal markup errors
//! - `W1xx` - Loader warnings
//! - `W2xx` - Extraction warnings
//! - `W3xx` - Synthesis warnings

use std::fmt;

/// Codes for categorizing diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Fatal Errors (E0xx)
    // =========================================================================
    /// Malformed markup.
    ///
    /// The document is not well-formed XML and cannot be loaded.
    E001,

    // =========================================================================
    // Loader Warnings (W1xx)
    // =========================================================================
    /// Embedded payload could not be decoded.
    ///
    /// The `<diagram>` element carried text that failed base64 decoding,
    /// inflation, percent-decoding, or re-parsing. The outer tree is used
    /// instead, which usually contains no cells.
    W100,

    /// No usable diagram name.
    ///
    /// Neither the page name, the root name, nor the file name produced a
    /// usable identifier, so the generic system name was used.
    W101,

    // =========================================================================
    // Extraction Warnings (W2xx)
    // =========================================================================
    /// Unresolved sender.
    ///
    /// A message edge could not be attributed to a sending participant
    /// and was dropped.
    W200,

    /// Unresolved receiver.
    ///
    /// A message edge could not be attributed to a receiving participant;
    /// the receiver was recorded as `Unknown`.
    W201,

    /// Guard label not attached.
    ///
    /// A bracketed predicate label did not fall within any frame that
    /// still lacked a guard.
    W202,

    /// Parent cycle.
    ///
    /// The parent chain of a node loops back on itself. Accumulation of
    /// geometry stopped at the repeated node.
    W203,

    /// Invalid numeric attribute.
    ///
    /// A geometry attribute was present but not a valid number; zero was
    /// used instead.
    W204,

    // =========================================================================
    // Synthesis Warnings (W3xx)
    // =========================================================================
    /// Identifier clash.
    ///
    /// A participant, message, data parameter or guard variable has the
    /// same name as something already declared in the context or machine.
    /// The later declaration was renamed.
    W300,
}

impl ErrorCode {
    /// Returns the code as a string (e.g., "W200").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "E001",
            ErrorCode::W100 => "W100",
            ErrorCode::W101 => "W101",
            ErrorCode::W200 => "W200",
            ErrorCode::W201 => "W201",
            ErrorCode::W202 => "W202",
            ErrorCode::W203 => "W203",
            ErrorCode::W204 => "W204",
            ErrorCode::W300 => "W300",
        }
    }

    /// Returns a short description of what this code means.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "malformed markup",
            ErrorCode::W100 => "undecodable diagram payload",
            ErrorCode::W101 => "missing diagram name",
            ErrorCode::W200 => "unresolved sender",
            ErrorCode::W201 => "unresolved receiver",
            ErrorCode::W202 => "unattached guard label",
            ErrorCode::W203 => "parent cycle",
            ErrorCode::W204 => "invalid numeric attribute",
            ErrorCode::W300 => "identifier clash",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::E001.to_string(), "E001");
        assert_eq!(ErrorCode::W100.to_string(), "W100");
        assert_eq!(ErrorCode::W203.to_string(), "W203");
        assert_eq!(ErrorCode::W300.to_string(), "W300");
    }

    #[test]
    fn test_error_code_description() {
        assert_eq!(ErrorCode::E001.description(), "malformed markup");
        assert_eq!(ErrorCode::W200.description(), "unresolved sender");
        assert_eq!(ErrorCode::W202.description(), "unattached guard label");
    }
}
