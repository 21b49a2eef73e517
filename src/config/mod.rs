//! Configuration system for daylightr.
//!
//! Handles the TOML configuration file, defaults, validation and conversion into the runtime
//! types used by the adaptation engine.
//!
//! ## Configuration Source
//!
//! The configuration lives at `$XDG_CONFIG_HOME/daylightr/daylightr.toml`. A different
//! directory can be selected with `--config DIR`. When no file exists, a commented default
//! configuration is written on first load.
//!
//! ## Configuration Structure
//!
//! ```toml
//! #[Adaptation]
//! mode = "location"          # Select: "location", "sync", "manual"
//! brightness_offset = 0      # Curve offset for brightness (-100 to 100)
//! contrast_offset = 0        # Curve offset for contrast (-100 to 100)
//! daylight_extension = 180   # Minutes the ramp starts before sunrise / ends after sunset (0-240)
//! noon_duration = 240        # Minutes of full brightness around solar noon (0-480)
//! smooth_transition = true   # Step values gradually instead of jumping
//! update_interval = 60       # Seconds between adaptation ticks (5-3600)
//!
//! #[Location]
//! latitude = 52.52
//! longitude = 13.405
//! sunrise = "07:00:00"       # Used when no coordinates are configured
//! sunset = "19:00:00"
//!
//! #[Hardware]
//! backend = "command"        # Select: "dry-run", "command"
//! write_command = "ddcutil --display {id} setvcp {vcp} {value}"
//!
//! [[display]]
//! id = "1"
//! name = "Dell U2720Q"
//! min_brightness = 10
//!
//! [[app]]
//! name = "mpv"
//! brightness = 20
//! ```
//!
//! ## Validation and Error Handling
//!
//! Every field is optional. Values are range checked on load; inverted display bounds,
//! duplicate display ids, malformed times and half-specified coordinates are rejected with a
//! message naming the offending field.

pub mod builder;
pub mod loading;
pub mod validation;

use serde::{Deserialize, Serialize};

use crate::common::constants::*;
use crate::state::display::{DisplayBounds, DisplayState};

// Re-export public API
pub use builder::create_default_config;
pub use loading::{get_config_path, get_custom_config_dir, load, load_from_path, set_config_dir};

/// Where adaptation targets come from.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AdaptiveMode {
    /// Follow the sun's position for the configured location or manual times.
    Location,
    /// Follow a reference sensor, typically a built-in panel's backlight.
    Sync,
    /// No automatic adaptation; values change only through `daylightr set`.
    Manual,
}

impl AdaptiveMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdaptiveMode::Location => "location",
            AdaptiveMode::Sync => "sync",
            AdaptiveMode::Manual => "manual",
        }
    }
}

/// Hardware write implementation.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
    /// Log writes without touching hardware.
    DryRun,
    /// Run `write_command` for every write.
    Command,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::DryRun => "dry-run",
            BackendKind::Command => "command",
        }
    }
}

/// One `[[display]]` table.
#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
pub struct DisplayConfig {
    pub id: String,
    pub name: Option<String>,
    pub serial: Option<String>,
    pub adaptive: Option<bool>,
    pub locked_brightness: Option<bool>,
    pub locked_contrast: Option<bool>,
    pub min_brightness: Option<u8>,
    pub max_brightness: Option<u8>,
    pub min_contrast: Option<u8>,
    pub max_contrast: Option<u8>,
    pub brightness: Option<u8>, // value assumed to be on the display at startup
    pub contrast: Option<u8>,
}

impl DisplayConfig {
    pub fn bounds(&self) -> DisplayBounds {
        DisplayBounds {
            min_brightness: self.min_brightness.unwrap_or(MIN_BRIGHTNESS),
            max_brightness: self.max_brightness.unwrap_or(MAX_BRIGHTNESS),
            min_contrast: self.min_contrast.unwrap_or(MIN_CONTRAST),
            max_contrast: self.max_contrast.unwrap_or(MAX_CONTRAST),
        }
    }

    /// Build the runtime record for this display.
    pub fn to_state(&self) -> DisplayState {
        let name = self
            .name
            .clone()
            .unwrap_or_else(|| format!("Display {}", self.id));
        let mut state = DisplayState::new(self.id.as_str(), name)
            .with_bounds(self.bounds())
            .with_values(
                self.brightness.unwrap_or(DEFAULT_INITIAL_BRIGHTNESS),
                self.contrast.unwrap_or(DEFAULT_INITIAL_CONTRAST),
            );
        state.serial = self.serial.clone();
        state.adaptive = self.adaptive.unwrap_or(true);
        state.locked_brightness = self.locked_brightness.unwrap_or(false);
        state.locked_contrast = self.locked_contrast.unwrap_or(false);
        state
    }
}

/// Per-application offsets, one `[[app]]` table.
///
/// While the named application is active its offsets are added on top of computed targets.
/// Only positive offsets have an effect.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq, Default)]
pub struct AppOverride {
    pub name: String,
    #[serde(default)]
    pub brightness: i32,
    #[serde(default)]
    pub contrast: i32,
}

impl AppOverride {
    pub fn new(name: impl Into<String>, brightness: i32, contrast: i32) -> Self {
        Self {
            name: name.into(),
            brightness,
            contrast,
        }
    }
}

/// Global parameters of the adaptation engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdaptationConfig {
    pub brightness_offset: i32,
    pub contrast_offset: i32,
    pub daylight_extension_minutes: u32,
    pub noon_duration_minutes: u32,
    pub smooth_transition: bool,
}

impl Default for AdaptationConfig {
    fn default() -> Self {
        Self {
            brightness_offset: DEFAULT_BRIGHTNESS_OFFSET,
            contrast_offset: DEFAULT_CONTRAST_OFFSET,
            daylight_extension_minutes: DEFAULT_DAYLIGHT_EXTENSION,
            noon_duration_minutes: DEFAULT_NOON_DURATION,
            smooth_transition: DEFAULT_SMOOTH_TRANSITION,
        }
    }
}

impl AdaptationConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            brightness_offset: config
                .brightness_offset
                .unwrap_or(DEFAULT_BRIGHTNESS_OFFSET),
            contrast_offset: config.contrast_offset.unwrap_or(DEFAULT_CONTRAST_OFFSET),
            daylight_extension_minutes: config
                .daylight_extension
                .unwrap_or(DEFAULT_DAYLIGHT_EXTENSION),
            noon_duration_minutes: config.noon_duration.unwrap_or(DEFAULT_NOON_DURATION),
            smooth_transition: config
                .smooth_transition
                .unwrap_or(DEFAULT_SMOOTH_TRANSITION),
        }
    }
}

/// Configuration structure for daylightr, loaded from `daylightr.toml`.
///
/// ## Configuration Categories
///
/// - **Adaptation**: `mode`, `brightness_offset`, `contrast_offset`, `daylight_extension`,
///   `noon_duration`, `smooth_transition`, `update_interval`
/// - **Location**: `latitude`, `longitude` (preferred), or manual `sunrise`/`sunset`
/// - **Sync mode**: `sensor_path` (a sysfs backlight directory)
/// - **Hardware**: `backend`, `write_command`
/// - **Tables**: `[[display]]` and `[[app]]`
#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
pub struct Config {
    pub mode: Option<AdaptiveMode>,
    pub brightness_offset: Option<i32>,
    pub contrast_offset: Option<i32>,
    pub daylight_extension: Option<u32>, // minutes
    pub noon_duration: Option<u32>,      // minutes
    pub smooth_transition: Option<bool>,
    pub update_interval: Option<u64>, // seconds
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub sunrise: Option<String>,
    pub sunset: Option<String>,
    pub sensor_path: Option<String>,
    pub backend: Option<BackendKind>,
    pub write_command: Option<String>,
    #[serde(default, rename = "display")]
    pub displays: Vec<DisplayConfig>,
    #[serde(default, rename = "app")]
    pub apps: Vec<AppOverride>,
}

impl Config {
    /// Load configuration using the module's load function
    pub fn load() -> anyhow::Result<Self> {
        load()
    }

    /// Look up the `[[app]]` override for an application name (case-insensitive).
    pub fn app_override(&self, name: &str) -> Option<&AppOverride> {
        self.apps
            .iter()
            .find(|app| app.name.eq_ignore_ascii_case(name))
    }

    /// Runtime records for every configured display.
    ///
    /// Without `[[display]]` tables a single display with id `1` is assumed.
    pub fn display_states(&self) -> Vec<DisplayState> {
        if self.displays.is_empty() {
            return vec![DisplayState::new("1", "Display 1")];
        }
        self.displays.iter().map(DisplayConfig::to_state).collect()
    }

    pub fn has_coordinates(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }

    pub fn log_config(&self) {
        let mode = self.mode.unwrap_or(DEFAULT_MODE);
        let backend = self.backend.unwrap_or(DEFAULT_BACKEND);

        log_block_start!("Loaded configuration");
        log_indented!("Backend: {}", backend.as_str());
        log_indented!("Mode: {}", mode.as_str());

        match mode {
            AdaptiveMode::Location => {
                if let (Some(lat), Some(lon)) = (self.latitude, self.longitude) {
                    let lat_dir = if lat >= 0.0 { "N" } else { "S" };
                    let lon_dir = if lon >= 0.0 { "E" } else { "W" };
                    log_indented!(
                        "Location: {:.3}°{}, {:.3}°{}",
                        lat.abs(),
                        lat_dir,
                        lon.abs(),
                        lon_dir
                    );
                } else {
                    log_indented!(
                        "Sunrise: {}, sunset: {}",
                        self.sunrise.as_deref().unwrap_or(DEFAULT_SUNRISE),
                        self.sunset.as_deref().unwrap_or(DEFAULT_SUNSET)
                    );
                }
                log_indented!(
                    "Daylight extension: {} minutes, noon duration: {} minutes",
                    self.daylight_extension.unwrap_or(DEFAULT_DAYLIGHT_EXTENSION),
                    self.noon_duration.unwrap_or(DEFAULT_NOON_DURATION)
                );
            }
            AdaptiveMode::Sync => {
                log_indented!(
                    "Sensor: {}",
                    self.sensor_path.as_deref().unwrap_or("auto-detect backlight")
                );
            }
            AdaptiveMode::Manual => {}
        }

        if mode != AdaptiveMode::Manual {
            log_indented!(
                "Offsets: brightness {}, contrast {}",
                self.brightness_offset.unwrap_or(DEFAULT_BRIGHTNESS_OFFSET),
                self.contrast_offset.unwrap_or(DEFAULT_CONTRAST_OFFSET)
            );
            log_indented!(
                "Update interval: {} seconds",
                self.update_interval.unwrap_or(DEFAULT_UPDATE_INTERVAL)
            );
        }

        if !self.smooth_transition.unwrap_or(DEFAULT_SMOOTH_TRANSITION) {
            log_indented!("Smooth transitions: disabled");
        }

        let displays = self.display_states();
        log_indented!(
            "Displays: {}",
            displays
                .iter()
                .map(|d| format!("{} ({})", d.name, d.id))
                .collect::<Vec<_>>()
                .join(", ")
        );
        if !self.apps.is_empty() {
            log_indented!("App overrides: {}", self.apps.len());
        }
    }
}
