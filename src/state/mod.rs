//! Display records and the change notifications emitted when they are updated.

pub mod display;
pub mod events;

pub use display::{DisplayBounds, DisplayId, DisplayState};
pub use events::{ChangeEvent, ChangeListener};
