//! Time source abstraction for supporting both real-time and simulated time.
//!
//! The controller asks this module for "now" when a solar signal carries no injected
//! time, and the daemon loop sleeps through it. Swapping in a simulated source lets a whole
//! solar day be replayed in seconds without touching the adaptation code.

use chrono::{DateTime, Duration as ChronoDuration, Local, TimeZone};
use once_cell::sync::OnceCell;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration as StdDuration;

/// Global time source instance, defaults to RealTimeSource
static TIME_SOURCE: OnceCell<Arc<dyn TimeSource>> = OnceCell::new();

/// Trait for abstracting time operations
pub trait TimeSource: Send + Sync {
    /// Get the current time
    fn now(&self) -> DateTime<Local>;

    /// Sleep for the specified duration (or simulate it)
    fn sleep(&self, duration: StdDuration);

    /// Check if this is a simulated time source
    fn is_simulated(&self) -> bool;

    /// Check if simulation has ended (always false for real time)
    fn is_ended(&self) -> bool {
        false
    }
}

/// Real-time implementation that uses actual system time
pub struct RealTimeSource;

impl TimeSource for RealTimeSource {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }

    fn sleep(&self, duration: StdDuration) {
        std::thread::sleep(duration);
    }

    fn is_simulated(&self) -> bool {
        false
    }
}

/// Fast-forward simulated time source.
///
/// Every sleep advances the simulated clock by exactly the requested duration and returns
/// almost immediately, capped at the end time.
pub struct SimulatedTimeSource {
    end_time: DateTime<Local>,
    current: Mutex<DateTime<Local>>,
}

impl SimulatedTimeSource {
    /// Create a new simulated time source running from `start_time` to `end_time`.
    pub fn new(start_time: DateTime<Local>, end_time: DateTime<Local>) -> Self {
        Self {
            end_time,
            current: Mutex::new(start_time),
        }
    }
}

impl TimeSource for SimulatedTimeSource {
    fn now(&self) -> DateTime<Local> {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn sleep(&self, duration: StdDuration) {
        {
            let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
            let step = ChronoDuration::milliseconds(duration.as_millis() as i64);
            *current = (*current + step).min(self.end_time);
        }
        // Minimal real sleep so worker threads and logs keep up
        std::thread::sleep(StdDuration::from_millis(1));
    }

    fn is_simulated(&self) -> bool {
        true
    }

    fn is_ended(&self) -> bool {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) >= self.end_time
    }
}

/// Initialize the global time source (call once at startup)
pub fn init_time_source(source: Arc<dyn TimeSource>) {
    TIME_SOURCE.set(source).ok();
}

/// Check if the time source has been initialized
pub fn is_initialized() -> bool {
    TIME_SOURCE.get().is_some()
}

/// Get the current time from the global time source
pub fn now() -> DateTime<Local> {
    TIME_SOURCE.get_or_init(|| Arc::new(RealTimeSource)).now()
}

/// Sleep for the specified duration using the global time source
pub fn sleep(duration: StdDuration) {
    TIME_SOURCE
        .get_or_init(|| Arc::new(RealTimeSource))
        .sleep(duration)
}

/// Check if we're running in simulation mode
pub fn is_simulated() -> bool {
    TIME_SOURCE
        .get_or_init(|| Arc::new(RealTimeSource))
        .is_simulated()
}

/// Check if simulation has reached its end time (always false for real time)
pub fn simulation_ended() -> bool {
    TIME_SOURCE
        .get_or_init(|| Arc::new(RealTimeSource))
        .is_ended()
}

/// Parse a datetime string in the format "YYYY-MM-DD HH:MM:SS"
pub fn parse_datetime(s: &str) -> Result<DateTime<Local>, String> {
    use chrono::NaiveDateTime;

    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map_err(|e| format!("Invalid datetime format: {e}. Use YYYY-MM-DD HH:MM:SS"))
        .and_then(|naive| {
            Local
                .from_local_datetime(&naive)
                .single()
                .ok_or_else(|| "Ambiguous or invalid local time".to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulated_sleep_advances_clock() {
        let start = parse_datetime("2024-06-21 05:00:00").unwrap();
        let end = parse_datetime("2024-06-21 06:00:00").unwrap();
        let source = SimulatedTimeSource::new(start, end);

        source.sleep(StdDuration::from_secs(600));
        assert_eq!(source.now(), start + ChronoDuration::minutes(10));
        assert!(!source.is_ended());

        source.sleep(StdDuration::from_secs(7200));
        assert_eq!(source.now(), end);
        assert!(source.is_ended());
    }

    #[test]
    fn test_parse_datetime_rejects_garbage() {
        assert!(parse_datetime("2024-06-21 25:00:00").is_err());
        assert!(parse_datetime("yesterday").is_err());
    }
}
