//! Default configuration file generation.
//!
//! Writes a commented `daylightr.toml` with every setting at its default value, aligned so the
//! comments form a column.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::common::constants::*;

/// Commented examples appended after the generated settings.
const TABLE_EXAMPLES: &str = "\
#[Displays]
# One table per external display. Without any, a single display with id \"1\" is assumed.
# [[display]]
# id = \"1\"                  # Passed to write_command as {id}
# name = \"Main monitor\"
# min_brightness = 0
# max_brightness = 100
# min_contrast = 0
# max_contrast = 100
# locked_contrast = false     # Keep contrast where it is

#[App overrides]
# Extra brightness/contrast while an application is active (daylightr run --app NAME).
# [[app]]
# name = \"mpv\"
# brightness = 20
# contrast = 10
";

/// Create a default config file at `path`, creating parent directories as needed.
pub fn create_default_config(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    let settings = ConfigBuilder::new()
        .add_section("Adaptation")
        .add_setting(
            "mode",
            &format!("\"{}\"", DEFAULT_MODE.as_str()),
            "Select: \"location\", \"sync\", \"manual\"",
        )
        .add_setting(
            "brightness_offset",
            &DEFAULT_BRIGHTNESS_OFFSET.to_string(),
            &format!("Brightness curve offset ({MINIMUM_OFFSET} to {MAXIMUM_OFFSET})"),
        )
        .add_setting(
            "contrast_offset",
            &DEFAULT_CONTRAST_OFFSET.to_string(),
            &format!("Contrast curve offset ({MINIMUM_OFFSET} to {MAXIMUM_OFFSET})"),
        )
        .add_setting(
            "daylight_extension",
            &DEFAULT_DAYLIGHT_EXTENSION.to_string(),
            &format!(
                "Minutes the ramp starts before sunrise and ends after sunset (0-{MAXIMUM_DAYLIGHT_EXTENSION})"
            ),
        )
        .add_setting(
            "noon_duration",
            &DEFAULT_NOON_DURATION.to_string(),
            &format!("Minutes of maximum values around solar noon (0-{MAXIMUM_NOON_DURATION})"),
        )
        .add_setting(
            "smooth_transition",
            &DEFAULT_SMOOTH_TRANSITION.to_string(),
            "Step values gradually instead of jumping",
        )
        .add_setting(
            "update_interval",
            &DEFAULT_UPDATE_INTERVAL.to_string(),
            &format!(
                "Seconds between adaptation ticks ({MINIMUM_UPDATE_INTERVAL}-{MAXIMUM_UPDATE_INTERVAL})"
            ),
        )
        .add_section("Location")
        .add_setting(
            "sunrise",
            &format!("\"{DEFAULT_SUNRISE}\""),
            "Used when latitude/longitude are not set (HH:MM:SS)",
        )
        .add_setting(
            "sunset",
            &format!("\"{DEFAULT_SUNSET}\""),
            "Used when latitude/longitude are not set (HH:MM:SS)",
        )
        .add_section("Hardware")
        .add_setting(
            "backend",
            &format!("\"{}\"", DEFAULT_BACKEND.as_str()),
            "Select: \"dry-run\" (log only), \"command\"",
        )
        .add_setting(
            "write_command",
            &format!("\"{DEFAULT_WRITE_COMMAND}\""),
            "Run per write when backend = \"command\"",
        )
        .build();

    let content = format!("{settings}\n\n{TABLE_EXAMPLES}");
    fs::write(path, content)
        .with_context(|| format!("Failed to write default config to {}", path.display()))?;

    Ok(())
}

struct ConfigBuilder {
    entries: Vec<ConfigEntry>,
}

#[derive(Clone)]
enum ConfigEntry {
    Section(String),
    Setting { line: String, comment: String },
}

impl ConfigBuilder {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn add_section(mut self, title: &str) -> Self {
        self.entries.push(ConfigEntry::Section(format!("#[{title}]")));
        self
    }

    fn add_setting(mut self, key: &str, value: &str, comment: &str) -> Self {
        self.entries.push(ConfigEntry::Setting {
            line: format!("{key} = {value}"),
            comment: format!("# {comment}"),
        });
        self
    }

    fn build(self) -> String {
        // Align all comments one space past the longest setting line
        let max_width = self
            .entries
            .iter()
            .filter_map(|entry| match entry {
                ConfigEntry::Setting { line, .. } => Some(line.len()),
                ConfigEntry::Section(_) => None,
            })
            .max()
            .unwrap_or(0)
            + 1;

        let mut result = Vec::new();
        let mut first_section = true;

        for entry in self.entries {
            match entry {
                ConfigEntry::Section(title) => {
                    if !first_section {
                        result.push(String::new());
                    }
                    result.push(title);
                    first_section = false;
                }
                ConfigEntry::Setting { line, comment } => {
                    let padding = " ".repeat(max_width - line.len());
                    result.push(format!("{line}{padding}{comment}"));
                }
            }
        }

        result.join("\n")
    }
}
