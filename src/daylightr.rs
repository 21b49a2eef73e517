//! Application coordinator that manages the complete lifecycle of the daemon.
//!
//! This module handles resource acquisition, initialization, and orchestration
//! of the adaptation loop. It manages:
//! - Configuration loading
//! - Backend creation and display registration
//! - Signal handler setup
//! - The periodic adaptation loop (solar clock or reference sensor)
//! - Draining pending transitions on shutdown
//!
//! The `Daylightr` struct uses a builder pattern to support different startup contexts:
//! - Normal startup: `Daylightr::new(debug_enabled).run()`
//! - Simulation mode: `Daylightr::new(debug_enabled).without_headers().run()`

use anyhow::{Context, Result};
use std::time::Duration;

use crate::{
    backend::create_backend,
    commands::resolve_app,
    common::{constants::*, utils::private_path},
    config::{self, AdaptationConfig, AdaptiveMode, AppOverride, Config},
    core::{AdaptationController, CycleReport, Signal},
    geo::{SolarMoment, log_solar_moment, moment_from_config},
    logger::Log,
    sensor::{BacklightSensor, ReferenceSensor},
    signals::{SignalState, setup_signal_handler},
    time_source,
};

/// Builder for configuring and running the daylightr daemon.
///
/// # Examples
///
/// ```no_run
/// use daylightr::Daylightr;
///
/// # fn main() -> anyhow::Result<()> {
/// Daylightr::new(false).with_app(Some("mpv".to_string())).run()?;
/// # Ok(())
/// # }
/// ```
pub struct Daylightr {
    debug_enabled: bool,
    show_headers: bool,
    app: Option<String>,
}

impl Daylightr {
    /// Create a new runner with defaults matching normal run
    pub fn new(debug_enabled: bool) -> Self {
        Self {
            debug_enabled,
            show_headers: true,
            app: None,
        }
    }

    /// Skip header display (headers already shown by the simulate command)
    pub fn without_headers(mut self) -> Self {
        self.show_headers = false;
        self
    }

    /// Apply the `[[app]]` override with this name to every target
    pub fn with_app(mut self, app: Option<String>) -> Self {
        self.app = app;
        self
    }

    /// Execute the daemon until a shutdown signal arrives or the simulation ends.
    pub fn run(self) -> Result<()> {
        if self.show_headers {
            log_version!();
        }
        if self.debug_enabled {
            Log::set_debug(true);
            log_pipe!();
            log_debug!("Debug mode enabled - showing transition timings");
        }

        if let Some(custom_dir) = config::get_custom_config_dir() {
            log_block_start!("Base directory: {}", private_path(&custom_dir));
        }

        let config = Config::load().context("Configuration failed")?;
        config.log_config();
        let app = resolve_app(&config, self.app.as_deref());

        let backend = create_backend(&config)?;
        log_block_start!("Using {} backend", backend.backend_name());

        let controller = AdaptationController::new(AdaptationConfig::from_config(&config), backend);
        for display in config.display_states() {
            controller.register(display)?;
        }

        let signal_state = setup_signal_handler()?;
        let result = run_loop(&controller, &config, app.as_ref(), &signal_state);

        log_block_start!("Shutting down daylightr...");
        controller.wait_idle();
        controller.shutdown();
        log_end!();

        result
    }
}

/// Where each tick's signal comes from.
enum SignalSource {
    Solar(Option<SolarMoment>),
    Sensor(Box<dyn ReferenceSensor>),
}

fn open_sensor(config: &Config) -> Result<BacklightSensor> {
    let sensor = match config.sensor_path.as_deref() {
        Some(path) => BacklightSensor::new(path),
        None => BacklightSensor::detect(),
    };
    sensor.context("Sync mode needs a reference backlight")
}

fn run_loop(
    controller: &AdaptationController,
    config: &Config,
    app: Option<&AppOverride>,
    signals: &SignalState,
) -> Result<()> {
    let mut source = match config.mode.unwrap_or(DEFAULT_MODE) {
        AdaptiveMode::Location => SignalSource::Solar(None),
        AdaptiveMode::Sync => {
            let sensor = open_sensor(config)?;
            log_block_start!("Following backlight {}", sensor.device().display());
            SignalSource::Sensor(Box::new(sensor))
        }
        AdaptiveMode::Manual => {
            log_block_start!("Manual mode: use 'daylightr set' to change values");
            return Ok(());
        }
    };

    let interval = Duration::from_secs(config.update_interval.unwrap_or(DEFAULT_UPDATE_INTERVAL));

    while signals.is_running() && !time_source::simulation_ended() {
        let report = match &mut source {
            SignalSource::Solar(cached) => {
                let moment = current_moment(config, cached)?;
                controller.adapt_all(&Signal::solar(moment), app)
            }
            SignalSource::Sensor(sensor) => controller.adapt_from_sensor(sensor.as_ref(), app),
        };
        log_report(&report);

        // Keep simulated output in order with the worker threads
        if time_source::is_simulated() {
            controller.wait_idle();
        }

        sleep_until_next_tick(interval, signals);
    }
    Ok(())
}

/// Solar times for today, recalculated when the date changes.
fn current_moment(config: &Config, cached: &mut Option<SolarMoment>) -> Result<SolarMoment> {
    let today = time_source::now().date_naive();
    match cached {
        Some(moment) if moment.date == today => Ok(*moment),
        _ => {
            let moment = moment_from_config(config, today)?;
            log_solar_moment(&moment);
            *cached = Some(moment);
            Ok(moment)
        }
    }
}

fn log_report(report: &CycleReport) {
    let written = report
        .iter()
        .filter(|(_, result)| matches!(result, Ok(outcome) if outcome.is_write()))
        .count();
    let failed = report.iter().filter(|(_, result)| result.is_err()).count();
    log_debug!(
        "Adaptation tick: {} displays, {written} changed, {failed} failed",
        report.len()
    );
}

/// Sleep one update interval, waking early for shutdown or a refresh request.
fn sleep_until_next_tick(interval: Duration, signals: &SignalState) {
    if time_source::is_simulated() {
        time_source::sleep(interval);
        return;
    }

    let check = Duration::from_secs(CHECK_INTERVAL_SECS);
    let mut remaining = interval;
    while !remaining.is_zero() && signals.is_running() {
        if signals.take_refresh() {
            break;
        }
        let chunk = remaining.min(check);
        time_source::sleep(chunk);
        remaining -= chunk;
    }
}
