//! Command-line argument definitions for the Compass replay harness.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments control the session and report paths,
//! configuration file selection, and logging verbosity.

use clap::Parser;

/// Command-line arguments for the Compass replay harness
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the session file (JSON)
    #[arg(help = "Path to the session file")]
    pub input: String,

    /// Path to the JSON report
    #[arg(short, long, default_value = "report.json")]
    pub output: String,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
