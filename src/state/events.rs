//! Change notifications.
//!
//! Every committed change (direct write, completed transition, manual set) produces one
//! [`ChangeEvent`] carrying the values now on the display. Events are delivered synchronously
//! to every registered [`ChangeListener`], on whichever thread committed the change.

use serde::{Deserialize, Serialize};
use std::sync::mpsc::Sender;

use crate::state::display::DisplayId;

/// Values committed to a display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub display_id: DisplayId,
    pub brightness: u8,
    pub contrast: u8,
}

impl ChangeEvent {
    pub fn new(display_id: DisplayId, brightness: u8, contrast: u8) -> Self {
        Self {
            display_id,
            brightness,
            contrast,
        }
    }
}

/// Receiver of change notifications.
///
/// Implemented for closures and for `mpsc::Sender<ChangeEvent>`, so callers can either react
/// inline or drain events on their own thread.
pub trait ChangeListener: Send + Sync {
    fn on_change(&self, event: &ChangeEvent);
}

impl<F> ChangeListener for F
where
    F: Fn(&ChangeEvent) + Send + Sync,
{
    fn on_change(&self, event: &ChangeEvent) {
        self(event)
    }
}

impl ChangeListener for Sender<ChangeEvent> {
    fn on_change(&self, event: &ChangeEvent) {
        // A dropped receiver just means nobody is listening anymore
        let _ = self.send(event.clone());
    }
}
