//! Backend that shells out to an external tool for every write.
//!
//! The configured template is split on whitespace once at construction. Each write substitutes
//! `{id}`, `{vcp}` (hex MCCS code, e.g. `10`) and `{value}` into the arguments and runs the
//! program directly, without a shell. With the default template this becomes
//! `ddcutil --display 1 setvcp 10 55`.

use anyhow::{Context, Result};
use std::process::Command;

use super::{BrightnessBackend, Control};
use crate::state::display::DisplayId;

#[derive(Debug, Clone)]
pub struct CommandBackend {
    program: String,
    args: Vec<String>,
}

impl CommandBackend {
    /// Parse a write command template.
    ///
    /// # Errors
    /// Fails if the template is empty or lacks a `{value}` placeholder.
    pub fn new(template: &str) -> Result<Self> {
        let mut parts = template.split_whitespace().map(str::to_string);
        let program = parts
            .next()
            .context("write_command is empty; expected e.g. \"ddcutil --display {id} setvcp {vcp} {value}\"")?;
        let args: Vec<String> = parts.collect();

        if !args.iter().any(|arg| arg.contains("{value}")) {
            anyhow::bail!("write_command must contain a {{value}} placeholder (got \"{template}\")");
        }

        Ok(Self { program, args })
    }

    /// Arguments for one write, with placeholders substituted.
    pub fn render_args(&self, display: &DisplayId, control: Control, value: u8) -> Vec<String> {
        let vcp = format!("{:x}", control.vcp_code());
        let value = value.to_string();
        self.args
            .iter()
            .map(|arg| {
                arg.replace("{id}", display.as_str())
                    .replace("{vcp}", &vcp)
                    .replace("{value}", &value)
            })
            .collect()
    }

    fn run(&self, display: &DisplayId, control: Control, value: u8) -> Result<()> {
        let args = self.render_args(display, control, value);
        log_debug!("Running {} {}", self.program, args.join(" "));

        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .with_context(|| format!("Failed to run '{}'", self.program))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!(
                "'{}' exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            );
        }
        Ok(())
    }
}

impl BrightnessBackend for CommandBackend {
    fn write_brightness(&self, display: &DisplayId, value: u8) -> Result<()> {
        self.run(display, Control::Brightness, value)
    }

    fn write_contrast(&self, display: &DisplayId, value: u8) -> Result<()> {
        self.run(display, Control::Contrast, value)
    }

    fn backend_name(&self) -> &'static str {
        "Command"
    }
}
