//! Error types for seqmodel operations.
//!
//! This module provides the main error type [`SeqModelError`] which wraps
//! the error conditions that can occur while compiling a diagram.

use std::io;

use thiserror::Error;

use seqmodel_drawio::error::LoadError;

/// The main error type for seqmodel operations.
///
/// # Diagnostic Variants
///
/// The `Decode` variant carries structured diagnostics with spans into the
/// document text, which the CLI renders as source snippets.
#[derive(Debug, Error)]
pub enum SeqModelError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{0}")]
    Decode(#[from] LoadError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Export error: {0}")]
    Export(#[from] crate::export::Error),
}
