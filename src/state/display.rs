//! Per-display runtime state.
//!
//! A [`DisplayState`] is created by the caller (usually from a `[[display]]` table in the
//! configuration) and handed to the controller at registration. From then on the controller
//! owns it: the adaptation path mutates the current brightness, contrast and step size, while
//! bounds, locks and the adaptive flag change only through explicit setters.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::common::constants::*;
use crate::core::error::AdaptError;

/// Opaque display identifier.
///
/// Backends receive it verbatim; for the command backend this is typically the ddcutil display
/// number or an I2C bus. The id `"0"` is reserved for the generic placeholder display.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DisplayId(String);

impl DisplayId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the placeholder display that never receives hardware writes.
    pub fn is_generic(&self) -> bool {
        self.0 == GENERIC_DISPLAY_ID
    }
}

impl fmt::Display for DisplayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DisplayId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for DisplayId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Inclusive brightness and contrast ranges of one display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayBounds {
    pub min_brightness: u8,
    pub max_brightness: u8,
    pub min_contrast: u8,
    pub max_contrast: u8,
}

impl Default for DisplayBounds {
    fn default() -> Self {
        Self {
            min_brightness: MIN_BRIGHTNESS,
            max_brightness: MAX_BRIGHTNESS,
            min_contrast: MIN_CONTRAST,
            max_contrast: MAX_CONTRAST,
        }
    }
}

impl DisplayBounds {
    /// Check `min <= max` for both ranges and that no bound exceeds 100.
    pub fn validate(&self, display: &DisplayId) -> Result<(), AdaptError> {
        let ranges = [
            ("brightness", self.min_brightness, self.max_brightness),
            ("contrast", self.min_contrast, self.max_contrast),
        ];
        for (field, min, max) in ranges {
            if min > max || max > 100 {
                return Err(AdaptError::InvalidBounds {
                    display: display.clone(),
                    field,
                    min,
                    max,
                });
            }
        }
        Ok(())
    }
}

/// Runtime record for one physical display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayState {
    pub id: DisplayId,
    pub name: String,
    /// Informational only
    pub serial: Option<String>,

    /// When false, adaptation skips this display entirely
    pub adaptive: bool,
    pub locked_brightness: bool,
    pub locked_contrast: bool,

    pub min_brightness: u8,
    pub max_brightness: u8,
    pub min_contrast: u8,
    pub max_contrast: u8,

    /// Last value committed to hardware
    pub brightness: u8,
    pub contrast: u8,

    /// Stepper step size, carried between transitions (always >= 1)
    pub step_size: u32,
}

impl DisplayState {
    /// Create an adaptive, unlocked display with full 0..=100 ranges.
    pub fn new(id: impl Into<DisplayId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            serial: None,
            adaptive: true,
            locked_brightness: false,
            locked_contrast: false,
            min_brightness: MIN_BRIGHTNESS,
            max_brightness: MAX_BRIGHTNESS,
            min_contrast: MIN_CONTRAST,
            max_contrast: MAX_CONTRAST,
            brightness: DEFAULT_INITIAL_BRIGHTNESS,
            contrast: DEFAULT_INITIAL_CONTRAST,
            step_size: MIN_STEP_SIZE,
        }
    }

    pub fn with_bounds(mut self, bounds: DisplayBounds) -> Self {
        self.set_bounds(bounds);
        self
    }

    pub fn with_values(mut self, brightness: u8, contrast: u8) -> Self {
        self.brightness = brightness;
        self.contrast = contrast;
        self
    }

    pub fn bounds(&self) -> DisplayBounds {
        DisplayBounds {
            min_brightness: self.min_brightness,
            max_brightness: self.max_brightness,
            min_contrast: self.min_contrast,
            max_contrast: self.max_contrast,
        }
    }

    pub fn set_bounds(&mut self, bounds: DisplayBounds) {
        self.min_brightness = bounds.min_brightness;
        self.max_brightness = bounds.max_brightness;
        self.min_contrast = bounds.min_contrast;
        self.max_contrast = bounds.max_contrast;
    }

    /// Current (brightness, contrast) pair.
    pub fn values(&self) -> (u8, u8) {
        (self.brightness, self.contrast)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generic_display_id() {
        assert!(DisplayId::from("0").is_generic());
        assert!(!DisplayId::from("1").is_generic());
        assert_eq!(DisplayId::new("DP-1").to_string(), "DP-1");
    }

    #[test]
    fn test_new_display_defaults() {
        let display = DisplayState::new("1", "Dell U2720Q");
        assert!(display.adaptive);
        assert!(!display.locked_brightness && !display.locked_contrast);
        assert_eq!(display.bounds(), DisplayBounds::default());
        assert_eq!(display.values(), (50, 50));
        assert_eq!(display.step_size, 1);
    }

    #[test]
    fn test_bounds_validation() {
        let id = DisplayId::from("1");
        assert!(DisplayBounds::default().validate(&id).is_ok());

        let inverted = DisplayBounds {
            min_brightness: 80,
            max_brightness: 20,
            ..DisplayBounds::default()
        };
        match inverted.validate(&id) {
            Err(AdaptError::InvalidBounds {
                field, min, max, ..
            }) => {
                assert_eq!(field, "brightness");
                assert_eq!((min, max), (80, 20));
            }
            other => panic!("expected InvalidBounds, got {other:?}"),
        }

        let too_high = DisplayBounds {
            max_contrast: 120,
            ..DisplayBounds::default()
        };
        assert!(too_high.validate(&id).is_err());
    }

    #[test]
    fn test_display_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&DisplayId::from("2")).unwrap();
        assert_eq!(json, "\"2\"");
    }
}
