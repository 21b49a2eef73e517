//! Main application entry point and high-level flow coordination.
//!
//! Parses the command line and dispatches to the daemon runner or one of the one-shot
//! commands. Everything else lives in the library crate.

use anyhow::Result;

use daylightr::args::{self, CliAction, ParsedArgs};
use daylightr::commands;
use daylightr::commands::preview::PreviewOptions;
use daylightr::common::constants::EXIT_FAILURE;
use daylightr::config;
use daylightr::logger::Log;
use daylightr::{Daylightr, log_error_exit};

fn main() -> Result<()> {
    let parsed_args = ParsedArgs::from_env();

    let result = match parsed_args.action {
        CliAction::ShowVersion => {
            args::display_version_info();
            Ok(())
        }
        CliAction::ShowHelp => {
            args::display_help();
            Ok(())
        }
        CliAction::ShowHelpDueToError => {
            args::display_help();
            std::process::exit(EXIT_FAILURE);
        }
        CliAction::Help { command } => commands::help::run_help_command(command.as_deref()),
        CliAction::Run {
            debug_enabled,
            config_dir,
            app,
        } => {
            config::set_config_dir(config_dir)?;
            Daylightr::new(debug_enabled).with_app(app).run()
        }
        CliAction::Preview {
            debug_enabled,
            config_dir,
            date,
            step_minutes,
            display,
            app,
            reference,
            json,
        } => {
            config::set_config_dir(config_dir)?;
            Log::set_debug(debug_enabled);
            commands::preview::handle_preview_command(PreviewOptions {
                date: date.as_deref(),
                step_minutes,
                display: display.as_deref(),
                app: app.as_deref(),
                reference,
                json,
            })
        }
        CliAction::Set {
            debug_enabled,
            config_dir,
            brightness,
            contrast,
            display,
        } => {
            config::set_config_dir(config_dir)?;
            Log::set_debug(debug_enabled);
            commands::set::handle_set_command(brightness, contrast, display.as_deref())
        }
        CliAction::Simulate {
            debug_enabled,
            config_dir,
            start_time,
            end_time,
            app,
            log_file,
        } => {
            config::set_config_dir(config_dir)?;
            // Keep the file sink alive for the duration of the simulation
            let _log_guard = commands::simulate::handle_simulate_command(
                &start_time,
                &end_time,
                debug_enabled,
                log_file.as_deref(),
            )?;
            Daylightr::new(debug_enabled)
                .without_headers()
                .with_app(app)
                .run()
        }
    };

    if let Err(e) = result {
        log_error_exit!("{e}");
        // The full error chain in the default format
        eprintln!("{e:?}");
        std::process::exit(EXIT_FAILURE);
    }
    Ok(())
}
