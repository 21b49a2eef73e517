//! Structured logging system with visual formatting.
//!
//! This module provides the logging system behind daylightr's box-drawing output style.
//! It includes semantic log levels and block formatting macros for structured output.
//!
//! The logger supports runtime enable/disable for quiet operation during tests, a separate
//! runtime switch for debug output, and an optional file sink fed by a background thread.

use std::io::Write;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Sender, channel};

static LOGGING_ENABLED: AtomicBool = AtomicBool::new(true);

// Debug output is opt-in (--debug); transition step timings are noisy.
static DEBUG_ENABLED: AtomicBool = AtomicBool::new(false);

// Channel for routing output to file when --log is active
static LOG_CHANNEL: OnceLock<Option<Sender<LogMessage>>> = OnceLock::new();

enum LogMessage {
    Formatted(String),
    Shutdown,
}

/// Main logging interface providing structured output formatting.
///
/// ## Logging Conventions
///
/// - **`log_block_start!`**: starts a new conceptual block (an applied change, a loaded
///   configuration, a detected phase). Prints `┃` for spacing, then `┣ message`.
/// - **`log_decorated!`**: a message that belongs to the current block. Prints `┣ message`.
/// - **`log_indented!`**: nested details of the current block. Prints `┃   message`.
/// - **`log_pipe!`**: an empty `┃` line, used before `log_warning!`/`log_error!` to separate
///   them from the previous block.
/// - **`log_version!`** / **`log_end!`**: the startup header and the final terminator.
/// - **`log_info!`, `log_warning!`, `log_error!`, `log_debug!`**: semantic
///   messages with a `[LEVEL]` prefix. `log_debug!` prints only when debug output is enabled.
pub struct Log;

impl Log {
    /// Enable or disable logging temporarily.
    ///
    /// This is useful for quiet operation during automated processes
    /// or testing where log output would interfere with results.
    pub fn set_enabled(enabled: bool) {
        LOGGING_ENABLED.store(enabled, Ordering::SeqCst);
    }

    /// Check if logging is currently enabled.
    pub fn is_enabled() -> bool {
        LOGGING_ENABLED.load(Ordering::SeqCst)
    }

    /// Enable or disable `log_debug!` output.
    pub fn set_debug(enabled: bool) {
        DEBUG_ENABLED.store(enabled, Ordering::SeqCst);
    }

    /// Check if debug output is enabled.
    pub fn is_debug() -> bool {
        DEBUG_ENABLED.load(Ordering::SeqCst)
    }

    /// Start file logging to the specified path.
    pub fn start_file_logging(file_path: String) -> anyhow::Result<LoggerGuard> {
        let (tx, rx) = channel();

        LOG_CHANNEL
            .set(Some(tx.clone()))
            .map_err(|_| anyhow::anyhow!("Logger channel already initialized"))?;

        let handle = std::thread::spawn(move || {
            let mut file = std::fs::File::create(&file_path)?;

            loop {
                match rx.recv() {
                    Ok(LogMessage::Formatted(text)) => {
                        file.write_all(text.as_bytes())?;
                    }
                    Ok(LogMessage::Shutdown) | Err(_) => {
                        file.flush()?;
                        break;
                    }
                }
            }

            Ok::<(), anyhow::Error>(())
        });

        Ok(LoggerGuard {
            tx,
            handle: Some(handle),
        })
    }

    /// Get timestamp prefix for simulated time.
    ///
    /// Shows `[HH:MM:SS] ` of the simulated clock so previews and simulated runs can be
    /// read against the solar schedule. Returns an empty string for real time.
    pub fn get_timestamp_prefix() -> String {
        // Only check without initializing the time source
        if crate::time_source::is_initialized() && crate::time_source::is_simulated() {
            format!("[{}] ", crate::time_source::now().format("%H:%M:%S"))
        } else {
            String::new()
        }
    }
}

/// Guard for file logging that ensures clean shutdown.
pub struct LoggerGuard {
    tx: Sender<LogMessage>,
    handle: Option<std::thread::JoinHandle<anyhow::Result<()>>>,
}

impl Drop for LoggerGuard {
    fn drop(&mut self) {
        let _ = self.tx.send(LogMessage::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
        // LOG_CHANNEL stays set; OnceLock can only be set once per process
    }
}

fn strip_ansi_codes(text: &str) -> String {
    // Matches ESC [ ... m where ... is any sequence of digits and semicolons
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\x1b' {
            if chars.peek() == Some(&'[') {
                chars.next();
                for ch in chars.by_ref() {
                    if ch == 'm' {
                        break;
                    }
                }
            } else {
                result.push(ch);
            }
        } else {
            result.push(ch);
        }
    }

    result
}

// Public function that routes output (needed by macros)
pub fn write_output(text: &str) {
    if let Some(Some(tx)) = LOG_CHANNEL.get() {
        let clean_text = strip_ansi_codes(text);
        let _ = tx.send(LogMessage::Formatted(clean_text));
    } else {
        print!("{text}");
        let _ = std::io::stdout().flush();
    }
}

/// Write one line: timestamp prefix, box-drawing lead, message.
///
/// Called by the `log_*!` macros; does nothing while logging is disabled.
#[doc(hidden)]
pub fn emit(lead: &str, message: std::fmt::Arguments<'_>) {
    if !Log::is_enabled() {
        return;
    }
    let prefix = Log::get_timestamp_prefix();
    write_output(&format!("{prefix}{lead}{message}\n"));
}

// # Logging Macros
//
// Every macro accepts either a format string with arguments or a single displayable
// expression.

/// Log a decorated message, typically as part of an existing block or for standalone emphasis.
#[macro_export]
macro_rules! log_decorated {
    ($fmt:literal $($arg:tt)*) => {
        $crate::logger::emit("┣ ", format_args!($fmt $($arg)*))
    };
    ($expr:expr) => {
        $crate::logger::emit("┣ ", format_args!("{}", $expr))
    };
}

/// Log an indented message for sub-items or details within a block.
#[macro_export]
macro_rules! log_indented {
    ($fmt:literal $($arg:tt)*) => {
        $crate::logger::emit("┃   ", format_args!($fmt $($arg)*))
    };
    ($expr:expr) => {
        $crate::logger::emit("┃   ", format_args!("{}", $expr))
    };
}

/// Log a visual pipe separator for vertical spacing.
#[macro_export]
macro_rules! log_pipe {
    () => {
        $crate::logger::emit("┃", format_args!(""))
    };
}

/// Log a block start message, initiating a new conceptual block of information.
#[macro_export]
macro_rules! log_block_start {
    ($($arg:tt)+) => {{
        $crate::log_pipe!();
        $crate::log_decorated!($($arg)+);
    }};
}

/// Log the application version header.
#[macro_export]
macro_rules! log_version {
    () => {
        $crate::logger::emit(
            "┏ ",
            format_args!("daylightr v{} ━━╸", env!("CARGO_PKG_VERSION")),
        )
    };
}

/// Log the final termination marker.
#[macro_export]
macro_rules! log_end {
    () => {
        $crate::logger::emit("╹", format_args!(""))
    };
}

/// Log a warning message with pipe prefix and yellow-colored text.
#[macro_export]
macro_rules! log_warning {
    ($fmt:literal $($arg:tt)*) => {
        $crate::logger::emit("┣[\x1b[33mWARNING\x1b[0m] ", format_args!($fmt $($arg)*))
    };
    ($expr:expr) => {
        $crate::logger::emit("┣[\x1b[33mWARNING\x1b[0m] ", format_args!("{}", $expr))
    };
}

/// Log an error message with pipe prefix and red-colored text.
#[macro_export]
macro_rules! log_error {
    ($fmt:literal $($arg:tt)*) => {
        $crate::logger::emit("┣[\x1b[31mERROR\x1b[0m] ", format_args!($fmt $($arg)*))
    };
    ($expr:expr) => {
        $crate::logger::emit("┣[\x1b[31mERROR\x1b[0m] ", format_args!("{}", $expr))
    };
}

/// Log an error that ends the run, closing the output with a terminal corner.
#[macro_export]
macro_rules! log_error_exit {
    ($fmt:literal $($arg:tt)*) => {{
        $crate::log_pipe!();
        $crate::logger::emit("┗[\x1b[31mERROR\x1b[0m] ", format_args!($fmt $($arg)*));
    }};
    ($expr:expr) => {{
        $crate::log_pipe!();
        $crate::logger::emit("┗[\x1b[31mERROR\x1b[0m] ", format_args!("{}", $expr));
    }};
}

/// Log an informational message with pipe prefix and green-colored text.
#[macro_export]
macro_rules! log_info {
    ($fmt:literal $($arg:tt)*) => {
        $crate::logger::emit("┣[\x1b[32mINFO\x1b[0m] ", format_args!($fmt $($arg)*))
    };
    ($expr:expr) => {
        $crate::logger::emit("┣[\x1b[32mINFO\x1b[0m] ", format_args!("{}", $expr))
    };
}

/// Log a debug message. Printed only when debug output is enabled.
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)+) => {
        if $crate::logger::Log::is_debug() {
            $crate::logger::emit("┣[\x1b[36mDEBUG\x1b[0m] ", format_args!($($arg)+));
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_ansi_codes() {
        let colored = "┣[\x1b[31mERROR\x1b[0m] write failed";
        assert_eq!(strip_ansi_codes(colored), "┣[ERROR] write failed");
        assert_eq!(strip_ansi_codes("plain"), "plain");
    }

    #[test]
    fn test_debug_toggle() {
        let previous = Log::is_debug();
        Log::set_debug(true);
        assert!(Log::is_debug());
        Log::set_debug(false);
        assert!(!Log::is_debug());
        Log::set_debug(previous);
    }
}
