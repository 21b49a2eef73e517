//! Hardware write layer for display brightness and contrast.
//!
//! The controller never talks to hardware directly. It goes through the [`BrightnessBackend`]
//! trait, whose only contract is "set this control on this display to this value, or fail".
//!
//! ## Supported Backends
//!
//! - **Dry-run backend**: logs every write and remembers the last value per display. Default
//!   until a real write command is configured, and used by `daylightr preview`.
//! - **Command backend**: runs an external tool per write (e.g. `ddcutil setvcp`), built from a
//!   template with `{id}`, `{vcp}` and `{value}` placeholders.
//!
//! Backends are shared between the caller thread and the per-display transition workers, so
//! they must be `Send + Sync` and take `&self`.

use anyhow::Result;
use std::sync::Arc;

use crate::common::constants::*;
use crate::config::{BackendKind, Config};
use crate::state::display::DisplayId;

pub mod command;
pub mod dry_run;

pub use command::CommandBackend;
pub use dry_run::DryRunBackend;

/// Trait for backends that can set display brightness and contrast.
#[cfg_attr(test, mockall::automock)]
pub trait BrightnessBackend: Send + Sync {
    /// Set the brightness of `display` to `value` (0..=100).
    fn write_brightness(&self, display: &DisplayId, value: u8) -> Result<()>;

    /// Set the contrast of `display` to `value` (0..=100).
    fn write_contrast(&self, display: &DisplayId, value: u8) -> Result<()>;

    /// Get a human-readable name for this backend.
    fn backend_name(&self) -> &'static str;
}

/// One of the two controls the engine drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Brightness,
    Contrast,
}

impl Control {
    pub fn as_str(&self) -> &'static str {
        match self {
            Control::Brightness => "brightness",
            Control::Contrast => "contrast",
        }
    }

    /// MCCS VCP feature code for this control.
    pub fn vcp_code(&self) -> u8 {
        match self {
            Control::Brightness => VCP_BRIGHTNESS,
            Control::Contrast => VCP_CONTRAST,
        }
    }

    /// Dispatch a write for this control to `backend`.
    pub fn write(
        &self,
        backend: &dyn BrightnessBackend,
        display: &DisplayId,
        value: u8,
    ) -> Result<()> {
        match self {
            Control::Brightness => backend.write_brightness(display, value),
            Control::Contrast => backend.write_contrast(display, value),
        }
    }
}

/// Create the backend selected by the configuration.
pub fn create_backend(config: &Config) -> Result<Arc<dyn BrightnessBackend>> {
    match config.backend.unwrap_or(DEFAULT_BACKEND) {
        BackendKind::DryRun => Ok(Arc::new(DryRunBackend::new())),
        BackendKind::Command => {
            let template = config
                .write_command
                .as_deref()
                .unwrap_or(DEFAULT_WRITE_COMMAND);
            Ok(Arc::new(CommandBackend::new(template)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;

    #[test]
    fn test_control_dispatch() {
        let mut backend = MockBrightnessBackend::new();
        backend
            .expect_write_brightness()
            .with(eq(DisplayId::from("1")), eq(40))
            .times(1)
            .returning(|_, _| Ok(()));
        backend
            .expect_write_contrast()
            .with(eq(DisplayId::from("1")), eq(75))
            .times(1)
            .returning(|_, _| Err(anyhow::anyhow!("bus busy")));

        let id = DisplayId::from("1");
        assert!(Control::Brightness.write(&backend, &id, 40).is_ok());
        assert!(Control::Contrast.write(&backend, &id, 75).is_err());
    }

    #[test]
    fn test_vcp_codes() {
        assert_eq!(Control::Brightness.vcp_code(), 0x10);
        assert_eq!(Control::Contrast.vcp_code(), 0x12);
    }

    #[test]
    fn test_create_backend_from_config() {
        let config = Config::default();
        assert_eq!(create_backend(&config).unwrap().backend_name(), "Dry-run");

        let config = Config {
            backend: Some(BackendKind::Command),
            write_command: Some("true {id} {vcp} {value}".to_string()),
            ..Config::default()
        };
        assert_eq!(create_backend(&config).unwrap().backend_name(), "Command");
    }
}
