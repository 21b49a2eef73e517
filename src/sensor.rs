//! Reference brightness sensors for sync mode.
//!
//! In sync mode external monitors follow a reference, usually the laptop panel whose backlight
//! is already driven by the desktop. A sensor reports that reference as a percent; `None` means
//! no reading is available right now and the adaptation cycle is skipped.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::common::utils::percent_of;

const BACKLIGHT_CLASS_DIR: &str = "/sys/class/backlight";

/// Source of a reference brightness percent (0..=100).
pub trait ReferenceSensor: Send + Sync {
    fn read_percent(&self) -> Option<f64>;
}

/// Reads a sysfs backlight device (`brightness` relative to `max_brightness`).
#[derive(Debug, Clone)]
pub struct BacklightSensor {
    device: PathBuf,
}

impl BacklightSensor {
    /// Use the backlight device directory at `device`.
    pub fn new(device: impl Into<PathBuf>) -> Result<Self> {
        let device = device.into();
        if !device.join("max_brightness").is_file() {
            anyhow::bail!(
                "{} is not a backlight device (no max_brightness file)",
                device.display()
            );
        }
        Ok(Self { device })
    }

    /// Pick the first device under `/sys/class/backlight`.
    pub fn detect() -> Result<Self> {
        Self::detect_in(Path::new(BACKLIGHT_CLASS_DIR))
    }

    pub(crate) fn detect_in(class_dir: &Path) -> Result<Self> {
        let mut devices: Vec<PathBuf> = fs::read_dir(class_dir)
            .with_context(|| format!("Failed to list {}", class_dir.display()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .collect();
        devices.sort();

        let device = devices
            .into_iter()
            .next()
            .with_context(|| format!("No backlight device found in {}", class_dir.display()))?;
        Self::new(device)
    }

    pub fn device(&self) -> &Path {
        &self.device
    }

    fn read_value(&self, file: &str) -> Result<u64> {
        let path = self.device.join(file);
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        raw.trim()
            .parse()
            .with_context(|| format!("Unexpected content in {}", path.display()))
    }

    fn try_read(&self) -> Result<Option<f64>> {
        let brightness = self.read_value("brightness")?;
        let max = self.read_value("max_brightness")?;
        Ok(percent_of(brightness, max))
    }
}

impl ReferenceSensor for BacklightSensor {
    fn read_percent(&self) -> Option<f64> {
        match self.try_read() {
            Ok(percent) => percent,
            Err(e) => {
                log_debug!("Backlight reading unavailable: {e:#}");
                None
            }
        }
    }
}

/// Sensor with a constant reading, used by `daylightr preview --reference` and tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedSensor(Option<f64>);

impl FixedSensor {
    pub fn new(percent: f64) -> Self {
        Self(Some(percent))
    }

    /// A sensor that never has a reading.
    pub fn empty() -> Self {
        Self(None)
    }
}

impl ReferenceSensor for FixedSensor {
    fn read_percent(&self) -> Option<f64> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn fake_device(root: &Path, name: &str, brightness: &str, max: &str) -> PathBuf {
        let device = root.join(name);
        fs::create_dir_all(&device).unwrap();
        fs::write(device.join("brightness"), brightness).unwrap();
        fs::write(device.join("max_brightness"), max).unwrap();
        device
    }

    #[test]
    fn test_backlight_percent() {
        let dir = tempdir().unwrap();
        let device = fake_device(dir.path(), "intel_backlight", "24000\n", "96000\n");
        let sensor = BacklightSensor::new(device).unwrap();
        assert_eq!(sensor.read_percent(), Some(25.0));
    }

    #[test]
    fn test_backlight_zero_max_has_no_reading() {
        let dir = tempdir().unwrap();
        let device = fake_device(dir.path(), "acpi_video0", "0", "0");
        let sensor = BacklightSensor::new(device).unwrap();
        assert_eq!(sensor.read_percent(), None);
    }

    #[test]
    fn test_backlight_garbage_has_no_reading() {
        let dir = tempdir().unwrap();
        let device = fake_device(dir.path(), "panel", "bright", "255");
        let sensor = BacklightSensor::new(device).unwrap();
        assert_eq!(sensor.read_percent(), None);
    }

    #[test]
    fn test_detect_picks_first_device() {
        let dir = tempdir().unwrap();
        fake_device(dir.path(), "nvidia_0", "10", "100");
        fake_device(dir.path(), "amdgpu_bl0", "200", "255");

        let sensor = BacklightSensor::detect_in(dir.path()).unwrap();
        assert!(sensor.device().ends_with("amdgpu_bl0"));
    }

    #[test]
    fn test_detect_without_devices_fails() {
        let dir = tempdir().unwrap();
        assert!(BacklightSensor::detect_in(dir.path()).is_err());
        assert!(BacklightSensor::new(dir.path().join("missing")).is_err());
    }

    #[test]
    fn test_fixed_sensor() {
        assert_eq!(FixedSensor::new(70.0).read_percent(), Some(70.0));
        assert_eq!(FixedSensor::empty().read_percent(), None);
    }
}
