//! Backend that performs no hardware writes.

use anyhow::Result;
use std::collections::HashMap;
use std::sync::Mutex;

use super::{BrightnessBackend, Control};
use crate::state::display::DisplayId;

/// Logs writes at debug level and records the last value written per display and control.
#[derive(Debug, Default)]
pub struct DryRunBackend {
    written: Mutex<HashMap<(DisplayId, &'static str), u8>>,
}

impl DryRunBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last value written to `control` on `display`, if any.
    pub fn last_written(&self, display: &DisplayId, control: Control) -> Option<u8> {
        self.written
            .lock()
            .ok()?
            .get(&(display.clone(), control.as_str()))
            .copied()
    }

    fn record(&self, display: &DisplayId, control: Control, value: u8) -> Result<()> {
        log_debug!("[dry-run] {} {} -> {}", display, control.as_str(), value);
        self.written
            .lock()
            .map_err(|_| anyhow::anyhow!("dry-run write log poisoned"))?
            .insert((display.clone(), control.as_str()), value);
        Ok(())
    }
}

impl BrightnessBackend for DryRunBackend {
    fn write_brightness(&self, display: &DisplayId, value: u8) -> Result<()> {
        self.record(display, Control::Brightness, value)
    }

    fn write_contrast(&self, display: &DisplayId, value: u8) -> Result<()> {
        self.record(display, Control::Contrast, value)
    }

    fn backend_name(&self) -> &'static str {
        "Dry-run"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_last_value() {
        let backend = DryRunBackend::new();
        let id = DisplayId::from("1");
        assert_eq!(backend.last_written(&id, Control::Brightness), None);

        backend.write_brightness(&id, 30).unwrap();
        backend.write_brightness(&id, 35).unwrap();
        backend.write_contrast(&id, 70).unwrap();

        assert_eq!(backend.last_written(&id, Control::Brightness), Some(35));
        assert_eq!(backend.last_written(&id, Control::Contrast), Some(70));
        assert_eq!(backend.last_written(&DisplayId::from("2"), Control::Contrast), None);
    }
}
