//! Shared utilities used across the application.

use std::path::Path;

/// Clamp `value` into `[min_val, max_val]`.
///
/// Works for any partially ordered scalar. The caller guarantees `min_val <= max_val`;
/// unlike [`Ord::clamp`] this never panics when that is violated, it simply returns
/// `min_val`. NaN inputs are returned unchanged.
pub fn cap<T: PartialOrd>(value: T, min_val: T, max_val: T) -> T {
    if value < min_val {
        min_val
    } else if value > max_val {
        max_val
    } else {
        value
    }
}

/// Convert a raw reading into a percentage of `max`, clamped to 0..=100.
///
/// Returns `None` when `max` is zero.
pub fn percent_of(value: u64, max: u64) -> Option<f64> {
    if max == 0 {
        return None;
    }
    Some(cap(value as f64 / max as f64 * 100.0, 0.0, 100.0))
}

/// Replace the home directory prefix with `~` for log output.
pub fn private_path(path: &Path) -> String {
    if let Some(home) = dirs::home_dir()
        && let Ok(stripped) = path.strip_prefix(&home)
    {
        return format!("~/{}", stripped.display());
    }
    path.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cap_integers() {
        assert_eq!(cap(5, 0, 10), 5);
        assert_eq!(cap(-3, 0, 10), 0);
        assert_eq!(cap(42, 0, 10), 10);
        assert_eq!(cap(-7, -10, -1), -7);
    }

    #[test]
    fn test_cap_floats() {
        assert_eq!(cap(0.5, 0.0, 1.0), 0.5);
        assert_eq!(cap(f64::INFINITY, 0.0, 100.0), 100.0);
        assert_eq!(cap(f64::NEG_INFINITY, 10.0, 100.0), 10.0);
    }

    #[test]
    fn test_percent_of() {
        assert_eq!(percent_of(50, 100), Some(50.0));
        assert_eq!(percent_of(960, 960), Some(100.0));
        assert_eq!(percent_of(2000, 1000), Some(100.0));
        assert_eq!(percent_of(1, 0), None);
    }

    #[test]
    fn test_private_path_without_home_prefix() {
        assert_eq!(private_path(Path::new("/etc/daylightr.toml")), "/etc/daylightr.toml");
    }
}
