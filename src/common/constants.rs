//! Application constants and default values for daylightr.
//!
//! This module contains the configuration defaults, validation limits,
//! and operational constants used throughout the application.

use crate::config::{AdaptiveMode, BackendKind};

// ═══ Application Configuration Defaults ═══
// These values are used when config options are not specified by the user

pub const DEFAULT_MODE: AdaptiveMode = AdaptiveMode::Location;
pub const DEFAULT_BACKEND: BackendKind = BackendKind::DryRun;
pub const DEFAULT_BRIGHTNESS_OFFSET: i32 = 0;
pub const DEFAULT_CONTRAST_OFFSET: i32 = 0;
pub const DEFAULT_DAYLIGHT_EXTENSION: u32 = 180; // minutes before sunrise / after sunset
pub const DEFAULT_NOON_DURATION: u32 = 240; // minutes of full brightness around solar noon
pub const DEFAULT_SMOOTH_TRANSITION: bool = true;
pub const DEFAULT_UPDATE_INTERVAL: u64 = 60; // seconds between adaptation ticks
pub const DEFAULT_SUNRISE: &str = "07:00:00";
pub const DEFAULT_SUNSET: &str = "19:00:00";
pub const DEFAULT_WRITE_COMMAND: &str = "ddcutil --display {id} setvcp {vcp} {value}";
pub const DEFAULT_PREVIEW_STEP: u32 = 60; // minutes between preview rows

// ═══ Display Bounds ═══

pub const MIN_BRIGHTNESS: u8 = 0;
pub const MAX_BRIGHTNESS: u8 = 100;
pub const MIN_CONTRAST: u8 = 0;
pub const MAX_CONTRAST: u8 = 100;
pub const DEFAULT_INITIAL_BRIGHTNESS: u8 = 50;
pub const DEFAULT_INITIAL_CONTRAST: u8 = 50;

/// Placeholder display id; the generic display never receives hardware writes.
pub const GENERIC_DISPLAY_ID: &str = "0";

// ═══ VCP Codes ═══
// MCCS feature codes passed to external write commands

pub const VCP_BRIGHTNESS: u8 = 0x10;
pub const VCP_CONTRAST: u8 = 0x12;

// ═══ Transition Stepper ═══

pub const MAX_SMOOTH_STEP_TIME_MS: u64 = 10; // per-write latency budget
pub const MIN_STEP_SIZE: u32 = 1;
pub const MAX_STEP_SIZE: u32 = 100;

// ═══ Validation Limits ═══
// These limits keep user inputs within reasonable and safe ranges

pub const MINIMUM_OFFSET: i32 = -100;
pub const MAXIMUM_OFFSET: i32 = 100;
pub const MAXIMUM_DAYLIGHT_EXTENSION: u32 = 240; // minutes
pub const MAXIMUM_NOON_DURATION: u32 = 480; // minutes
pub const MINIMUM_UPDATE_INTERVAL: u64 = 5; // seconds
pub const MAXIMUM_UPDATE_INTERVAL: u64 = 3600; // seconds
pub const MAXIMUM_SOLAR_LATITUDE: f64 = 65.0; // beyond this the sun may not rise or set

// ═══ Operational Timing Constants ═══

pub const CHECK_INTERVAL_SECS: u64 = 1; // How often to check the running flag during sleep

// ═══ Exit Codes ═══

pub const EXIT_FAILURE: i32 = 1; // General failure

// ═══ Test Constants ═══
// Common values used in tests for consistency
#[cfg(test)]
pub mod test_constants {
    use super::*;

    pub const TEST_STANDARD_SUNRISE: &str = "06:00:00";
    pub const TEST_STANDARD_SUNSET: &str = "18:00:00";
    pub const TEST_STANDARD_DAYLIGHT_EXTENSION: u32 = 60;
    pub const TEST_STANDARD_NOON_DURATION: u32 = 120;
    pub const TEST_STANDARD_UPDATE_INTERVAL: u64 = DEFAULT_UPDATE_INTERVAL;
}
