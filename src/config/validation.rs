//! Configuration validation functionality.
//!
//! Rejects values the engine cannot honor: out-of-range offsets and durations, inverted
//! display bounds, duplicate ids, malformed times and half-specified coordinates.

use anyhow::{Context, Result};
use chrono::NaiveTime;
use std::collections::HashSet;

use super::{BackendKind, Config, DisplayConfig};
use crate::common::constants::*;

/// Comprehensive configuration validation
pub fn validate_config(config: &Config) -> Result<()> {
    validate_offset(config.brightness_offset, "brightness_offset")?;
    validate_offset(config.contrast_offset, "contrast_offset")?;

    if let Some(extension) = config.daylight_extension
        && extension > MAXIMUM_DAYLIGHT_EXTENSION
    {
        anyhow::bail!(
            "daylight_extension ({} minutes) must be between 0 and {} minutes",
            extension,
            MAXIMUM_DAYLIGHT_EXTENSION
        );
    }

    if let Some(noon) = config.noon_duration
        && noon > MAXIMUM_NOON_DURATION
    {
        anyhow::bail!(
            "noon_duration ({} minutes) must be between 0 and {} minutes",
            noon,
            MAXIMUM_NOON_DURATION
        );
    }

    if let Some(interval) = config.update_interval
        && !(MINIMUM_UPDATE_INTERVAL..=MAXIMUM_UPDATE_INTERVAL).contains(&interval)
    {
        anyhow::bail!(
            "update_interval ({} seconds) must be between {} and {} seconds",
            interval,
            MINIMUM_UPDATE_INTERVAL,
            MAXIMUM_UPDATE_INTERVAL
        );
    }

    validate_coordinates(config)?;
    validate_manual_times(config)?;

    if config.backend == Some(BackendKind::Command)
        && let Some(command) = config.write_command.as_deref()
        && command.trim().is_empty()
    {
        anyhow::bail!("write_command must not be empty when backend = \"command\"");
    }

    if let Some(path) = config.sensor_path.as_deref()
        && path.trim().is_empty()
    {
        anyhow::bail!("sensor_path must not be empty");
    }

    let mut seen_ids = HashSet::new();
    for display in &config.displays {
        validate_display(display)?;
        if !seen_ids.insert(display.id.as_str()) {
            anyhow::bail!("Duplicate display id \"{}\"", display.id);
        }
    }

    let mut seen_apps = HashSet::new();
    for app in &config.apps {
        if app.name.trim().is_empty() {
            anyhow::bail!("[[app]] entries require a non-empty name");
        }
        validate_offset(Some(app.brightness), "app brightness")?;
        validate_offset(Some(app.contrast), "app contrast")?;
        if !seen_apps.insert(app.name.to_lowercase()) {
            anyhow::bail!("Duplicate app override \"{}\"", app.name);
        }
    }

    Ok(())
}

fn validate_offset(offset: Option<i32>, field: &str) -> Result<()> {
    if let Some(offset) = offset
        && !(MINIMUM_OFFSET..=MAXIMUM_OFFSET).contains(&offset)
    {
        anyhow::bail!(
            "{} ({}) must be between {} and {}",
            field,
            offset,
            MINIMUM_OFFSET,
            MAXIMUM_OFFSET
        );
    }
    Ok(())
}

fn validate_coordinates(config: &Config) -> Result<()> {
    match (config.latitude, config.longitude) {
        (Some(_), None) | (None, Some(_)) => {
            anyhow::bail!("latitude and longitude must be specified together")
        }
        _ => {}
    }

    if let Some(lat) = config.latitude
        && !(-90.0..=90.0).contains(&lat)
    {
        anyhow::bail!("latitude must be between -90 and 90 degrees (got {})", lat);
    }

    if let Some(lon) = config.longitude
        && !(-180.0..=180.0).contains(&lon)
    {
        anyhow::bail!(
            "longitude must be between -180 and 180 degrees (got {})",
            lon
        );
    }

    Ok(())
}

fn validate_manual_times(config: &Config) -> Result<()> {
    let sunrise_str = config.sunrise.as_deref().unwrap_or(DEFAULT_SUNRISE);
    let sunset_str = config.sunset.as_deref().unwrap_or(DEFAULT_SUNSET);

    let sunrise = NaiveTime::parse_from_str(sunrise_str, "%H:%M:%S")
        .context("Invalid sunrise time format. Use HH:MM:SS format")?;
    let sunset = NaiveTime::parse_from_str(sunset_str, "%H:%M:%S")
        .context("Invalid sunset time format. Use HH:MM:SS format")?;

    if sunrise >= sunset {
        anyhow::bail!(
            "sunrise ({}) must be earlier than sunset ({})",
            sunrise_str,
            sunset_str
        );
    }

    Ok(())
}

fn validate_display(display: &DisplayConfig) -> Result<()> {
    if display.id.trim().is_empty() {
        anyhow::bail!("[[display]] entries require a non-empty id");
    }

    let bounds = display.bounds();
    let ranges = [
        ("brightness", bounds.min_brightness, bounds.max_brightness),
        ("contrast", bounds.min_contrast, bounds.max_contrast),
    ];
    for (field, min, max) in ranges {
        if max > 100 {
            anyhow::bail!(
                "Display \"{}\": max_{} ({}) must not exceed 100",
                display.id,
                field,
                max
            );
        }
        if min > max {
            anyhow::bail!(
                "Display \"{}\": min_{} ({}) must not exceed max_{} ({})",
                display.id,
                field,
                min,
                field,
                max
            );
        }
    }

    for (field, value) in [("brightness", display.brightness), ("contrast", display.contrast)] {
        if let Some(value) = value
            && value > 100
        {
            anyhow::bail!(
                "Display \"{}\": initial {} ({}) must be between 0 and 100",
                display.id,
                field,
                value
            );
        }
    }

    Ok(())
}
