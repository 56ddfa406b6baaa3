//! Diagnostics reported while loading and extracting a diagram.
//!
//! Loading a document can fail outright only when the markup itself is
//! malformed ([`ErrorCode::E001`]). Everything else the loader or the
//! extractors find questionable is reported as a warning and the pipeline
//! keeps going with a best-effort result.
//!
//! # Example
//!
//! ```
//! # use seqmodel_drawio::error::{Diagnostic, ErrorCode};
//! # use seqmodel_drawio::Span;
//!
//! let diag = Diagnostic::warning("message `ack` has no resolvable sender")
//!     .with_code(ErrorCode::W200)
//!     .with_label(Span::new(120..180), "edge starts here")
//!     .with_help("attach the edge to a lifeline or move it closer");
//!
//! assert_eq!(diag.to_string(), "warning[W200]: message `ack` has no resolvable sender");
//! ```

mod collector;
mod diagnostic;
mod error_code;
mod label;
mod load_error;
mod severity;

pub(crate) use collector::DiagnosticCollector;

pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use label::Label;
pub use load_error::LoadError;
pub use severity::Severity;
