//! spxsift: CLI for analyzing speech SDK diagnostic logs.
//!
//! Indexes the sessions a trace file mentions, correlates the threads
//! each session runs across, and reconstructs per-session log excerpts
//! with performance and recognition reports.

use std::process::ExitCode;

use spxsift::cli;

fn main() -> ExitCode {
    // Logging is initialized by cli::run based on --log-level and --log-format
    match cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");

            if std::env::var("RUST_BACKTRACE").is_ok() {
                if let Some(source) = std::error::Error::source(&e) {
                    eprintln!("Caused by: {source}");
                }
            }

            ExitCode::from(e.exit_code() as u8)
        }
    }
}
