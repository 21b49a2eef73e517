//! Help command implementation for daylightr.
//!
//! This module provides a dispatcher for the help command that shows
//! command-specific help or general help based on the arguments provided.

use anyhow::Result;

/// Run the help command (dispatcher)
///
/// # Arguments
/// * `command` - Optional command name to get help for (None = general help)
pub fn run_help_command(command: Option<&str>) -> Result<()> {
    match command {
        None => display_general_help(),
        Some("run") | Some("r") => display_run_help(),
        Some("preview") | Some("p") => super::preview::display_help(),
        Some("set") | Some("s") => super::set::display_help(),
        Some("simulate") | Some("S") => super::simulate::display_help(),
        Some("help") | Some("h") => display_help_help(),
        Some(unknown) => {
            log_pipe!();
            log_warning!("Unknown command: {}", unknown);
            display_general_help();
        }
    }
    Ok(())
}

/// Display general help focused on commands (for the help command)
fn display_general_help() {
    log_version!();
    log_block_start!("Available Commands:");
    log_indented!("run, r                  Adapt displays continuously (default)");
    log_indented!("preview, p              Print brightness and contrast across a day");
    log_indented!("set, s <b> <c>          Write brightness and contrast once");
    log_indented!("simulate, S <start> <end>  Run against a fast-forwarded clock");
    log_indented!("help, h [COMMAND]       Show detailed help for a command");
    log_pipe!();
    log_info!("Use 'daylightr help <command>' to see detailed help for a specific command.");
    log_end!();
}

fn display_run_help() {
    log_version!();
    log_block_start!("run - Adapt displays continuously");
    log_block_start!("Usage: daylightr run [--app <name>]");
    log_block_start!("Modes (from the configuration):");
    log_indented!("location  Follow the sun for the configured coordinates or times");
    log_indented!("sync      Follow a reference backlight");
    log_indented!("manual    Do nothing; use 'daylightr set'");
    log_block_start!("Signals:");
    log_indented!("SIGINT, SIGTERM, SIGHUP  Finish pending transitions and exit");
    log_indented!("SIGUSR2                  Adapt immediately");
    log_end!();
}

/// Display help for the help command itself
fn display_help_help() {
    log_version!();
    log_block_start!("help - Display help information");
    log_block_start!("Usage: daylightr help [COMMAND]");
    log_block_start!("Examples:");
    log_indented!("daylightr help");
    log_indented!("daylightr help preview");
    log_end!();
}
