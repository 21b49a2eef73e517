//! Command-line command handlers for daylightr.
//!
//! This module contains implementations for one-shot CLI commands like preview and set.
//! Each command is implemented in its own submodule; helpers shared between them live here.

pub mod help;
pub mod preview;
pub mod set;
pub mod simulate;

use anyhow::Result;

use crate::config::{AppOverride, Config};
use crate::state::display::DisplayState;

/// Look up the `[[app]]` override named on the command line.
///
/// An unknown name is reported and ignored rather than treated as an error, so a launcher
/// script can pass any application name.
pub(crate) fn resolve_app(config: &Config, name: Option<&str>) -> Option<AppOverride> {
    let name = name?;
    match config.app_override(name) {
        Some(app) => {
            log_block_start!(
                "App override {}: brightness {:+}, contrast {:+}",
                app.name,
                app.brightness,
                app.contrast
            );
            Some(app.clone())
        }
        None => {
            log_pipe!();
            log_warning!("No [[app]] override named '{name}', ignoring");
            None
        }
    }
}

/// Displays selected by `--display`, or every configured display.
pub(crate) fn select_displays(config: &Config, display: Option<&str>) -> Result<Vec<DisplayState>> {
    let displays = config.display_states();
    let Some(id) = display else {
        return Ok(displays);
    };

    let selected: Vec<_> = displays
        .into_iter()
        .filter(|d| d.id.as_str() == id)
        .collect();
    if selected.is_empty() {
        let known = config
            .display_states()
            .iter()
            .map(|d| d.id.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        anyhow::bail!("Display '{id}' is not configured (known displays: {known})");
    }
    Ok(selected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DisplayConfig;

    fn config() -> Config {
        Config {
            displays: vec![
                DisplayConfig {
                    id: "1".to_string(),
                    ..DisplayConfig::default()
                },
                DisplayConfig {
                    id: "DP-2".to_string(),
                    name: Some("Side".to_string()),
                    ..DisplayConfig::default()
                },
            ],
            apps: vec![AppOverride::new("Firefox", 10, 0)],
            ..Config::default()
        }
    }

    #[test]
    fn test_select_displays() {
        let config = config();
        assert_eq!(select_displays(&config, None).unwrap().len(), 2);

        let side = select_displays(&config, Some("DP-2")).unwrap();
        assert_eq!(side.len(), 1);
        assert_eq!(side[0].name, "Side");

        let err = select_displays(&config, Some("HDMI-1")).unwrap_err();
        assert!(err.to_string().contains("known displays: 1, DP-2"));
    }

    #[test]
    fn test_resolve_app_is_case_insensitive() {
        let config = config();
        assert_eq!(
            resolve_app(&config, Some("firefox")).map(|a| a.brightness),
            Some(10)
        );
        assert!(resolve_app(&config, Some("vlc")).is_none());
        assert!(resolve_app(&config, None).is_none());
    }
}
