//! Implementation of the set command.
//!
//! Writes the given brightness and contrast once to the selected displays through the
//! configured backend. Adaptive flags and locks do not apply to manual values.

use anyhow::{Context, Result};

use crate::backend::create_backend;
use crate::config::{AdaptationConfig, Config};
use crate::core::AdaptationController;

use super::select_displays;

/// Handle the set command.
pub fn handle_set_command(brightness: u8, contrast: u8, display: Option<&str>) -> Result<()> {
    log_version!();

    let config = Config::load().context("Configuration failed")?;
    let backend = create_backend(&config)?;
    log_block_start!("Using {} backend", backend.backend_name());

    // The current hardware value is unknown, so write the target directly
    let adaptation = AdaptationConfig {
        smooth_transition: false,
        ..AdaptationConfig::from_config(&config)
    };
    let controller = AdaptationController::new(adaptation, backend);
    for state in select_displays(&config, display)? {
        controller.register(state)?;
    }

    let mut failed = 0;
    for state in controller.displays() {
        if let Err(e) = controller.set_manual(&state.id, brightness, contrast) {
            log_pipe!();
            log_error!("{e:#}");
            failed += 1;
        }
    }
    log_end!();

    if failed > 0 {
        anyhow::bail!("Failed to set {failed} display(s)");
    }
    Ok(())
}

/// Display help for the set command
pub fn display_help() {
    log_version!();
    log_block_start!("set - Write brightness and contrast once");
    log_block_start!("Usage: daylightr set <brightness> <contrast> [--display <id>]");
    log_block_start!("Arguments:");
    log_indented!("brightness  0-100");
    log_indented!("contrast    0-100");
    log_block_start!("Options:");
    log_indented!("--display <id>  Only write to this display (default: all configured)");
    log_block_start!("Examples:");
    log_indented!("daylightr set 70 60");
    log_indented!("daylightr set 30 50 --display 2");
    log_end!();
}
