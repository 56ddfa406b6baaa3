//! Command-line argument definitions for the seqmodel CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments control input/output paths, configuration file
//! selection, output overrides, and logging verbosity.

use std::num::NonZeroU32;

use clap::Parser;

use seqmodel::export::eventb::Notation;

/// Command-line arguments for the seqmodel compiler
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input draw.io file
    #[arg(help = "Path to the input diagram")]
    pub input: String,

    /// Path to the output Event-B file
    #[arg(short, long, default_value = "out.eventb")]
    pub output: String,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Machine version appended to the machine name
    #[arg(long)]
    pub version_number: Option<NonZeroU32>,

    /// System name, overriding the one taken from the diagram
    #[arg(long)]
    pub name: Option<String>,

    /// Operator notation (ascii, unicode)
    #[arg(long)]
    pub notation: Option<Notation>,

    /// Write property suggestions from the configured advisory command to this path
    #[arg(long)]
    pub advice: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
