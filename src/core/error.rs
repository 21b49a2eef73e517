use thiserror::Error;

use crate::state::display::DisplayId;

/// Errors surfaced by the adaptation controller.
///
/// Only `InvalidBounds` is a configuration problem. Everything else is recoverable: the
/// controller keeps running and the next signal tries again.
#[derive(Error, Debug)]
pub enum AdaptError {
    /// A display's min bound exceeds its max bound (or a bound exceeds 100).
    #[error("Invalid {field} bounds for display {display}: min {min} > max {max}")]
    InvalidBounds {
        display: DisplayId,
        field: &'static str,
        min: u8,
        max: u8,
    },

    /// No display with this id is registered.
    #[error("Display {0} is not registered")]
    UnknownDisplay(DisplayId),

    /// The hardware write primitive failed; the stored value was left untouched.
    #[error("Failed to write {field} {value} to display {display}: {source}")]
    Write {
        display: DisplayId,
        field: &'static str,
        value: u8,
        #[source]
        source: anyhow::Error,
    },

    /// Sensor-driven adaptation was requested but the sensor had no reading.
    #[error("Reference sensor returned no reading")]
    MissingSensorReading,

    /// The display's transition worker has stopped.
    #[error("Transition worker for display {0} is no longer running")]
    WorkerUnavailable(DisplayId),
}

impl AdaptError {
    /// Whether the error is caused by configuration rather than a runtime failure.
    pub fn is_configuration(&self) -> bool {
        matches!(self, AdaptError::InvalidBounds { .. })
    }
}
