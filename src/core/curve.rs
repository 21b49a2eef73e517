//! Brightness and contrast curves over the solar day.
//!
//! A curve maps a percent-of-phase input onto a display's `[min, max]` range and bends it with
//! a power law derived from the user's offset. Positive offsets raise the curve (brighter
//! earlier in the morning, later in the evening); negative offsets lower it.

use serde::{Deserialize, Serialize};

use crate::common::utils::cap;

/// Which curve to evaluate.
///
/// Brightness and contrast share the mapping but differ in how strongly a negative offset
/// bends the curve: brightness uses `1 - offset/10`, contrast the gentler `1 + |offset|/100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurveKind {
    Brightness,
    Contrast,
}

impl CurveKind {
    /// Exponent applied to the normalized value for a given offset.
    pub fn factor(self, offset: i32) -> f64 {
        let offset = offset as f64;
        if offset > 0.0 {
            1.0 - offset / 100.0
        } else if offset < 0.0 {
            match self {
                CurveKind::Brightness => 1.0 - offset / 10.0,
                CurveKind::Contrast => 1.0 + offset.abs() / 100.0,
            }
        } else {
            1.0
        }
    }
}

/// Compute a curve value for `percent` of the way through a phase.
///
/// # Arguments
/// * `percent` - Position in the phase, nominally 0..=100; values outside are extrapolated
/// * `offset` - Signed curve-shaping offset
/// * `app_offset` - Per-application additive offset, applied only when positive
/// * `min_val`, `max_val` - Display bounds, `min_val <= max_val`
/// * `kind` - Brightness or contrast curve
///
/// # Returns
/// An integer in `[min_val, max_val]` for every finite or non-finite input.
pub fn compute_value(
    percent: f64,
    offset: i32,
    app_offset: i32,
    min_val: u8,
    max_val: u8,
    kind: CurveKind,
) -> u8 {
    let min = min_val as f64;
    let max = max_val as f64;

    // Negative bases come from extrapolating below 0%; treat them as the bottom of the range
    let mapped = (percent / 100.0) * (max - min) + min;
    let normalized = if mapped > 0.0 { mapped / 100.0 } else { 0.0 };

    let raw = normalized.powf(kind.factor(offset)) * 100.0;
    let mut value = if raw.is_nan() { min } else { cap(raw, min, max) };

    if app_offset > 0 {
        value = cap(value + app_offset as f64, min, max);
    }

    value as u8
}

/// Brightness curve value; see [`compute_value`].
pub fn compute_brightness(percent: f64, offset: i32, app_offset: i32, min: u8, max: u8) -> u8 {
    compute_value(percent, offset, app_offset, min, max, CurveKind::Brightness)
}

/// Contrast curve value; see [`compute_value`].
pub fn compute_contrast(percent: f64, offset: i32, app_offset: i32, min: u8, max: u8) -> u8 {
    compute_value(percent, offset, app_offset, min, max, CurveKind::Contrast)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_linear_endpoints() {
        assert_eq!(compute_brightness(0.0, 0, 0, 0, 100), 0);
        assert_eq!(compute_brightness(100.0, 0, 0, 0, 100), 100);
        assert_eq!(compute_brightness(0.0, 0, 0, 20, 80), 20);
        assert_eq!(compute_brightness(100.0, 0, 0, 20, 80), 80);
    }

    #[test]
    fn test_linear_midpoint() {
        assert_eq!(compute_brightness(50.0, 0, 0, 0, 100), 50);
        assert_eq!(compute_contrast(50.0, 0, 0, 0, 100), 50);
        assert_eq!(compute_brightness(50.0, 0, 0, 20, 80), 50);
    }

    #[test]
    fn test_factor_asymmetry_for_negative_offsets() {
        assert_eq!(CurveKind::Brightness.factor(0), 1.0);
        assert_eq!(CurveKind::Brightness.factor(50), 0.5);
        assert_eq!(CurveKind::Contrast.factor(50), 0.5);
        assert_eq!(CurveKind::Brightness.factor(-10), 2.0);
        assert_eq!(CurveKind::Contrast.factor(-10), 1.1);
    }

    #[test]
    fn test_positive_offset_brightens_midday_ramp() {
        // 0.5^0.5 * 100 = 70.7
        assert_eq!(compute_brightness(50.0, 50, 0, 0, 100), 70);
        // 0.5^2 * 100 = 25
        assert_eq!(compute_brightness(50.0, -10, 0, 0, 100), 25);
        // 0.5^1.1 * 100 = 46.6
        assert_eq!(compute_contrast(50.0, -10, 0, 0, 100), 46);
    }

    #[test]
    fn test_app_offset_clamps_to_display_max() {
        assert_eq!(compute_brightness(50.0, 0, 10, 0, 100), 60);
        assert_eq!(compute_brightness(95.0, 0, 30, 0, 100), 100);
        assert_eq!(compute_brightness(100.0, 0, 30, 10, 70), 70);
        // Negative app offsets are ignored
        assert_eq!(compute_brightness(50.0, 0, -30, 0, 100), 50);
    }

    #[test]
    fn test_extrapolation_is_clamped() {
        assert_eq!(compute_brightness(-50.0, 0, 0, 10, 90), 10);
        assert_eq!(compute_brightness(250.0, 0, 0, 10, 90), 90);
        assert_eq!(compute_brightness(-50.0, 30, 0, 0, 100), 0);
        assert_eq!(compute_brightness(f64::NAN, 0, 0, 15, 90), 15);
        assert_eq!(compute_brightness(f64::INFINITY, 0, 0, 15, 90), 90);
    }

    #[test]
    fn test_extreme_offsets_stay_in_range() {
        // offset 100 gives a zero exponent, offset above 100 a negative one
        assert_eq!(compute_brightness(10.0, 100, 0, 0, 100), 100);
        assert_eq!(compute_brightness(0.0, 150, 0, 5, 95), 95);
        assert_eq!(compute_contrast(90.0, -100, 0, 0, 100), 81);
    }

    proptest! {
        #[test]
        fn test_linear_curve_is_monotonic(
            a in 0.0f64..=100.0,
            b in 0.0f64..=100.0,
            min in 0u8..=50,
            span in 0u8..=50,
        ) {
            let max = min + span;
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(compute_brightness(lo, 0, 0, min, max) <= compute_brightness(hi, 0, 0, min, max));
            prop_assert!(compute_contrast(lo, 0, 0, min, max) <= compute_contrast(hi, 0, 0, min, max));
        }

        #[test]
        fn test_positive_offset_lies_above_linear(
            percent in 1.0f64..100.0,
            offset in 1i32..=100,
        ) {
            for kind in [CurveKind::Brightness, CurveKind::Contrast] {
                let linear = compute_value(percent, 0, 0, 0, 100, kind);
                prop_assert!(compute_value(percent, offset, 0, 0, 100, kind) >= linear);
            }
        }

        #[test]
        fn test_negative_offset_lies_below_linear(
            percent in 1.0f64..100.0,
            offset in -100i32..=-1,
        ) {
            for kind in [CurveKind::Brightness, CurveKind::Contrast] {
                let linear = compute_value(percent, 0, 0, 0, 100, kind);
                prop_assert!(compute_value(percent, offset, 0, 0, 100, kind) <= linear);
            }
        }

        #[test]
        fn test_output_always_within_bounds(
            percent in -1.0e6f64..1.0e6,
            offset in -1000i32..=1000,
            app_offset in -100i32..=100,
            min in 0u8..=100,
            span in 0u8..=100,
        ) {
            let max = min.saturating_add(span).min(100);
            for kind in [CurveKind::Brightness, CurveKind::Contrast] {
                let value = compute_value(percent, offset, app_offset, min, max, kind);
                prop_assert!(value >= min && value <= max);
            }
        }
    }
}
