//! Implementation of the simulate command for testing time-based behavior.
//!
//! This command installs a fast-forwarded time source, allowing the daemon to replay a
//! stretch of the solar day in seconds without waiting for real time to pass.

use anyhow::Result;
use std::sync::Arc;

use crate::logger::{Log, LoggerGuard};
use crate::time_source::{self, SimulatedTimeSource};

/// Set up the simulated time source.
///
/// Returns control to main.rs, which then runs the daemon normally against the simulated
/// clock. With `log_file` all output goes to that file instead of stdout; the returned guard
/// must stay alive until the run is over.
///
/// # Arguments
/// * `start_time` - Start time in format "YYYY-MM-DD HH:MM:SS"
/// * `end_time` - End time in format "YYYY-MM-DD HH:MM:SS"
/// * `log_file` - Optional path receiving the log output (ANSI codes stripped)
pub fn handle_simulate_command(
    start_time: &str,
    end_time: &str,
    debug_enabled: bool,
    log_file: Option<&str>,
) -> Result<Option<LoggerGuard>> {
    let start = time_source::parse_datetime(start_time)
        .map_err(|e| anyhow::anyhow!("Invalid start time: {e}"))?;
    let end = time_source::parse_datetime(end_time)
        .map_err(|e| anyhow::anyhow!("Invalid end time: {e}"))?;
    if end <= start {
        anyhow::bail!("End time must be after start time");
    }

    // Initialize before any logging so every line carries the simulated timestamp
    time_source::init_time_source(Arc::new(SimulatedTimeSource::new(start, end)));

    let guard = match log_file {
        Some(path) => {
            println!("Writing simulation output to {path}");
            Some(Log::start_file_logging(path.to_string())?)
        }
        None => None,
    };

    log_version!();
    log_block_start!("Simulation Mode");
    let duration = end.signed_duration_since(start);
    log_decorated!(
        "Simulating from {} to {}",
        start.format("%Y-%m-%d %H:%M:%S"),
        end.format("%Y-%m-%d %H:%M:%S")
    );
    log_indented!(
        "Total simulated time: {} hours {} minutes",
        duration.num_hours(),
        duration.num_minutes() % 60
    );

    if debug_enabled {
        log_pipe!();
        log_debug!("Simulated time source initialized");
    }
    Ok(guard)
}

/// Display help for the simulate command
pub fn display_help() {
    log_version!();
    log_block_start!("simulate - Run the daemon against a fast-forwarded clock");
    log_block_start!("Usage: daylightr simulate <start> <end> [--app <name>] [--log <file>]");
    log_block_start!("Arguments:");
    log_indented!("start  \"YYYY-MM-DD HH:MM:SS\"");
    log_indented!("end    \"YYYY-MM-DD HH:MM:SS\"");
    log_block_start!("Options:");
    log_indented!("-a, --app <name>   Apply an [[app]] override for the whole run");
    log_indented!("-l, --log <file>   Write the output to a file instead of the terminal");
    log_block_start!("Examples:");
    log_indented!("daylightr simulate \"2024-06-21 04:00:00\" \"2024-06-21 23:00:00\"");
    log_end!();
}
