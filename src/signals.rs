//! Signal handling for the daemon loop.
//!
//! SIGINT, SIGTERM and SIGHUP clear the running flag so the loop can finish its current tick,
//! wait for pending transitions and exit. SIGUSR2 requests an immediate adaptation tick instead
//! of waiting for the next update interval.

use anyhow::{Context, Result};
use signal_hook::{
    consts::signal::{SIGHUP, SIGINT, SIGTERM, SIGUSR2},
    iterator::Signals,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, Sender, channel};
use std::sync::Arc;
use std::thread;

/// Messages forwarded from the signal thread to the daemon loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalMessage {
    /// SIGINT, SIGTERM or SIGHUP
    Shutdown,
    /// SIGUSR2
    Refresh,
}

/// Signal handling state shared with the daemon loop.
pub struct SignalState {
    /// Cleared once a shutdown signal arrives
    pub running: Arc<AtomicBool>,
    pub receiver: Receiver<SignalMessage>,
}

impl SignalState {
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Drain pending messages; returns true if a refresh was requested.
    pub fn take_refresh(&self) -> bool {
        let mut refresh = false;
        while let Ok(message) = self.receiver.try_recv() {
            if message == SignalMessage::Refresh {
                refresh = true;
            }
        }
        refresh
    }
}

/// Register handlers and spawn the thread that forwards signals.
pub fn setup_signal_handler() -> Result<SignalState> {
    let running = Arc::new(AtomicBool::new(true));
    let (sender, receiver) = channel();

    let mut signals = Signals::new([SIGINT, SIGTERM, SIGHUP, SIGUSR2])
        .context("failed to register signal handlers")?;

    let running_clone = Arc::clone(&running);
    thread::spawn(move || {
        for sig in signals.forever() {
            let message = match sig {
                SIGUSR2 => SignalMessage::Refresh,
                _ => SignalMessage::Shutdown,
            };
            handle_signal_message(message, &running_clone, &sender);
        }
    });

    Ok(SignalState { running, receiver })
}

fn handle_signal_message(message: SignalMessage, running: &AtomicBool, sender: &Sender<SignalMessage>) {
    match message {
        SignalMessage::Shutdown => {
            log_pipe!();
            log_info!("Received shutdown signal");
            running.store(false, Ordering::SeqCst);
        }
        SignalMessage::Refresh => {
            log_pipe!();
            log_info!("Received refresh signal");
        }
    }
    // The loop may already be gone during shutdown
    let _ = sender.send(message);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shutdown_clears_running_flag() {
        let running = AtomicBool::new(true);
        let (tx, rx) = channel();
        handle_signal_message(SignalMessage::Shutdown, &running, &tx);
        assert!(!running.load(Ordering::SeqCst));
        assert_eq!(rx.try_recv(), Ok(SignalMessage::Shutdown));
    }

    #[test]
    fn test_refresh_is_drained_once() {
        let running = Arc::new(AtomicBool::new(true));
        let (tx, rx) = channel();
        handle_signal_message(SignalMessage::Refresh, &running, &tx);
        handle_signal_message(SignalMessage::Refresh, &running, &tx);

        let state = SignalState {
            running,
            receiver: rx,
        };
        assert!(state.is_running());
        assert!(state.take_refresh());
        assert!(!state.take_refresh());
    }
}
