//! CLI logic for the Compass replay harness.
//!
//! The harness loads a recorded grading session, replays it through a
//! [`CompassEngine`] and writes the resulting grades as a JSON report.

pub mod error_adapter;
pub mod report;
pub mod session;

mod args;
mod config;
mod error;

pub use args::Args;
pub use error::CliError;

use std::fs;

use log::{info, warn};

use compass::CompassEngine;

use report::Report;
use session::Session;

/// Run the Compass replay harness
///
/// This function replays the session file through a fresh engine and writes
/// the report to the output file.
///
/// # Errors
///
/// Returns `CliError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Malformed session files
/// - Models or payloads the engine rejects
pub fn run(args: &Args) -> Result<(), CliError> {
    info!(
        input_path = args.input,
        output_path = args.output;
        "Replaying session"
    );

    let app_config = config::load_config(args.config.as_ref())?;

    let source = fs::read_to_string(&args.input)?;
    let session = Session::from_json(&source)?;

    let engine = CompassEngine::new(app_config);
    let warnings = session.replay(&engine)?;
    let reporter = miette::GraphicalReportHandler::new();
    for reportable in error_adapter::warnings_to_reportables(&warnings) {
        let mut writer = String::new();
        if reporter.render_report(&mut writer, &reportable).is_ok() {
            warn!("{writer}");
        }
    }

    let report = Report::collect(&engine, warnings)?;
    fs::write(&args.output, report.to_json()?)?;

    info!(
        output_file = args.output,
        models = report.models.len(),
        warnings = report.warnings.len();
        "Report written"
    );

    Ok(())
}
