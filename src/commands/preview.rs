//! Implementation of the preview command.
//!
//! Prints the brightness and contrast every configured display would get across a whole day,
//! or for a single reference reading with `--reference`. Nothing is written to hardware.
//! `--json` prints the same data as a JSON document instead of the log view.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;

use crate::backend::DryRunBackend;
use crate::common::constants::*;
use crate::config::{AdaptationConfig, Config};
use crate::core::AdaptationController;
use crate::core::period::{CurvePoint, PhaseWindows, ScheduleParams, day_curve};
use crate::geo::{log_solar_moment, moment_from_config};
use crate::logger::Log;
use crate::sensor::FixedSensor;
use crate::state::display::{DisplayId, DisplayState};
use crate::time_source;

use super::{resolve_app, select_displays};

/// Options of `daylightr preview`.
#[derive(Debug, Default)]
pub struct PreviewOptions<'a> {
    pub date: Option<&'a str>,
    pub step_minutes: Option<u32>,
    pub display: Option<&'a str>,
    pub app: Option<&'a str>,
    pub reference: Option<f64>,
    pub json: bool,
}

#[derive(Serialize)]
struct DayReport {
    date: NaiveDate,
    windows: PhaseWindows,
    displays: Vec<DisplayCurve>,
}

#[derive(Serialize)]
struct DisplayCurve {
    id: DisplayId,
    name: String,
    points: Vec<CurvePoint>,
}

#[derive(Serialize)]
struct ReferenceReport {
    reference: f64,
    displays: Vec<DisplayState>,
}

fn print_json(report: &impl Serialize) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("Failed to serialize preview")?;
    println!("{json}");
    Ok(())
}

/// Handle the preview command.
pub fn handle_preview_command(options: PreviewOptions<'_>) -> Result<()> {
    if options.json {
        // Keep stdout a single JSON document
        Log::set_enabled(false);
    }
    log_version!();

    let config = Config::load().context("Configuration failed")?;
    let app = resolve_app(&config, options.app);
    let displays = select_displays(&config, options.display)?;
    let adaptation = AdaptationConfig {
        smooth_transition: false,
        ..AdaptationConfig::from_config(&config)
    };

    if let Some(percent) = options.reference {
        // Run the real controller against a dry-run backend
        let controller = AdaptationController::new(adaptation, Arc::new(DryRunBackend::new()));
        for display in displays {
            controller.register(display)?;
        }
        controller.adapt_from_sensor(&FixedSensor::new(percent), app.as_ref());

        if options.json {
            return print_json(&ReferenceReport {
                reference: percent,
                displays: controller.displays(),
            });
        }

        log_block_start!("Reference reading {percent:.1}%");
        for display in controller.displays() {
            log_indented!(
                "{} ({}): brightness {}, contrast {}",
                display.name,
                display.id,
                display.brightness,
                display.contrast
            );
        }
        log_end!();
        return Ok(());
    }

    let date = match options.date {
        Some(date) => NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .with_context(|| format!("Invalid date '{date}', expected YYYY-MM-DD"))?,
        None => time_source::now().date_naive(),
    };
    let moment = moment_from_config(&config, date)?;
    log_solar_moment(&moment);

    let params = ScheduleParams::new(&adaptation, app.as_ref());
    let windows = params.windows(&moment);
    let step = options.step_minutes.unwrap_or(DEFAULT_PREVIEW_STEP);

    if options.json {
        let displays = displays
            .into_iter()
            .map(|display| DisplayCurve {
                points: day_curve(&moment, &display.bounds(), &params, step),
                id: display.id,
                name: display.name,
            })
            .collect();
        return print_json(&DayReport {
            date,
            windows,
            displays,
        });
    }

    log_block_start!("Phases");
    log_indented!(
        "Rising:  {} - {}",
        windows.daylight_start.format("%H:%M"),
        windows.noon_start.format("%H:%M")
    );
    log_indented!(
        "Plateau: {} - {}",
        windows.noon_start.format("%H:%M"),
        windows.noon_end.format("%H:%M")
    );
    log_indented!(
        "Falling: {} - {}",
        windows.noon_end.format("%H:%M"),
        windows.daylight_end.format("%H:%M")
    );

    for display in displays {
        log_block_start!("{} (display {})", display.name, display.id);
        log_indented!("Time   Phase     Brightness  Contrast");
        for point in day_curve(&moment, &display.bounds(), &params, step) {
            log_indented!(
                "{}  {:<8}  {:>10}  {:>8}",
                point.time.format("%H:%M"),
                point.phase.display_name(),
                point.brightness,
                point.contrast
            );
        }
    }
    log_end!();
    Ok(())
}

/// Display help for the preview command
pub fn display_help() {
    log_version!();
    log_block_start!("preview - Print brightness and contrast across a day");
    log_block_start!("Usage: daylightr preview [OPTIONS]");
    log_block_start!("Options:");
    log_indented!("--date <YYYY-MM-DD>    Day to preview (default: today)");
    log_indented!("--step <minutes>       Minutes between rows (default: 60)");
    log_indented!("--display <id>         Only show this display");
    log_indented!("--app <name>           Apply an [[app]] override");
    log_indented!("--reference <percent>  Show values for one sync-mode reading instead");
    log_indented!("--json                 Print JSON instead of the log view");
    log_block_start!("Examples:");
    log_indented!("daylightr preview --date 2024-12-21 --step 30");
    log_indented!("daylightr preview --reference 40");
    log_end!();
}
