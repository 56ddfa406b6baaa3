//! Export functionality for formal models.
//!
//! This module provides the [`Exporter`] trait that defines the interface for
//! turning a synthesized [`FormalModel`] into text. It is the final stage of
//! the seqmodel pipeline.
//!
//! # Pipeline Position
//!
//! ```text
//! Diagram document
//!     ↓ load + extract
//! Interaction Model
//!     ↓ synthesize
//! Formal Model
//!     ↓ export (this module)
//! Event-B text
//! ```
//!
//! # Available Backends
//!
//! - [`eventb`]: Rodin-style Event-B text via [`eventb::EventBWriter`]
//!
//! # Error Handling
//!
//! Export operations return [`Error`]. [`Error`] converts into
//! [`SeqModelError::Export`] at the crate boundary.
//!
//! [`SeqModelError::Export`]: crate::SeqModelError::Export

/// Event-B text backend.
pub mod eventb;

use std::fmt;

use crate::formal::FormalModel;

/// Abstraction for formal model export backends.
pub trait Exporter {
    /// Renders a formal model to the backend's textual format.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Render`] if the model cannot be written out.
    fn export_model(&self, model: &FormalModel) -> Result<String, Error>;
}

/// Errors that can occur during export.
#[derive(Debug)]
pub enum Error {
    /// A rendering failure described by `message`.
    Render(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Render(msg) => write!(f, "Render error: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<fmt::Error> for Error {
    fn from(err: fmt::Error) -> Self {
        Self::Render(err.to_string())
    }
}
