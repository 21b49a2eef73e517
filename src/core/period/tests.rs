use super::*;
use crate::common::constants::test_constants::*;
use proptest::prelude::*;

fn moment() -> SolarMoment {
    let date = NaiveDate::from_ymd_opt(2024, 3, 20).unwrap();
    SolarMoment::from_times(
        date,
        NaiveTime::parse_from_str(TEST_STANDARD_SUNRISE, "%H:%M:%S").unwrap(),
        NaiveTime::parse_from_str(TEST_STANDARD_SUNSET, "%H:%M:%S").unwrap(),
    )
    .unwrap()
}

// daylight 05:00-19:00, plateau 11:00-13:00
fn params() -> ScheduleParams {
    ScheduleParams {
        daylight_extension_minutes: TEST_STANDARD_DAYLIGHT_EXTENSION,
        noon_duration_minutes: TEST_STANDARD_NOON_DURATION,
        ..ScheduleParams::default()
    }
}

fn bounds(min_b: u8, max_b: u8, min_c: u8, max_c: u8) -> DisplayBounds {
    DisplayBounds {
        min_brightness: min_b,
        max_brightness: max_b,
        min_contrast: min_c,
        max_contrast: max_c,
    }
}

fn at(hour: u32, minute: u32, bounds: &DisplayBounds, params: &ScheduleParams) -> PhaseTargets {
    targets_at(hour, minute, &moment(), bounds, params)
}

#[test]
fn test_phase_windows() {
    let windows = params().windows(&moment());
    assert_eq!(windows.daylight_start.format("%H:%M").to_string(), "05:00");
    assert_eq!(windows.noon_start.format("%H:%M").to_string(), "11:00");
    assert_eq!(windows.noon_end.format("%H:%M").to_string(), "13:00");
    assert_eq!(windows.daylight_end.format("%H:%M").to_string(), "19:00");
}

#[test]
fn test_odd_noon_duration_uses_whole_minutes() {
    let params = ScheduleParams {
        noon_duration_minutes: 121,
        ..params()
    };
    let windows = params.windows(&moment());
    assert_eq!(windows.noon_start.format("%H:%M").to_string(), "11:00");
    assert_eq!(windows.noon_end.format("%H:%M").to_string(), "13:00");
}

#[test]
fn test_phase_detection_and_boundaries() {
    let full = DisplayBounds::default();
    let p = params();
    assert_eq!(at(4, 59, &full, &p).phase, DayPhase::Night);
    assert_eq!(at(5, 0, &full, &p).phase, DayPhase::Rising);
    assert_eq!(at(11, 0, &full, &p).phase, DayPhase::Rising);
    assert_eq!(at(11, 1, &full, &p).phase, DayPhase::Plateau);
    assert_eq!(at(12, 59, &full, &p).phase, DayPhase::Plateau);
    assert_eq!(at(13, 0, &full, &p).phase, DayPhase::Falling);
    assert_eq!(at(19, 0, &full, &p).phase, DayPhase::Falling);
    assert_eq!(at(19, 1, &full, &p).phase, DayPhase::Night);
    assert_eq!(at(23, 59, &full, &p).phase, DayPhase::Night);
}

#[test]
fn test_rising_midpoint_is_linear_midpoint() {
    // Halfway between 05:00 and 11:00
    let targets = at(8, 0, &DisplayBounds::default(), &params());
    assert_eq!(targets.phase, DayPhase::Rising);
    assert_eq!(targets.percent, Some(50.0));
    assert_eq!((targets.brightness, targets.contrast), (50, 50));
}

#[test]
fn test_falling_is_mirrored() {
    // Halfway between 13:00 and 19:00
    let targets = at(16, 0, &DisplayBounds::default(), &params());
    assert_eq!(targets.phase, DayPhase::Falling);
    assert_eq!(targets.percent, Some(50.0));
    assert_eq!(targets.brightness, 50);

    let quarter = at(17, 30, &DisplayBounds::default(), &params());
    assert_eq!(quarter.percent, Some(25.0));
    assert_eq!(quarter.brightness, 25);
}

#[test]
fn test_ramp_edges_hit_bounds() {
    let b = bounds(10, 90, 20, 80);
    let p = params();
    let start = at(5, 0, &b, &p);
    assert_eq!((start.brightness, start.contrast), (10, 20));
    let top = at(11, 0, &b, &p);
    assert_eq!((top.brightness, top.contrast), (90, 80));
    let end = at(19, 0, &b, &p);
    assert_eq!((end.brightness, end.contrast), (10, 20));
}

#[test]
fn test_plateau_and_night_are_exact() {
    let b = bounds(15, 85, 25, 75);
    let noon = at(12, 0, &b, &params());
    assert_eq!(noon.percent, None);
    assert_eq!((noon.brightness, noon.contrast), (85, 75));

    let night = at(2, 0, &b, &params());
    assert_eq!(night.percent, None);
    assert_eq!((night.brightness, night.contrast), (15, 25));
}

#[test]
fn test_offsets_shape_ramps() {
    let brighter = ScheduleParams {
        brightness_offset: 50,
        contrast_offset: 50,
        ..params()
    };
    let targets = at(8, 0, &DisplayBounds::default(), &brighter);
    assert_eq!((targets.brightness, targets.contrast), (70, 70));

    let dimmer = ScheduleParams {
        brightness_offset: -10,
        contrast_offset: -10,
        ..params()
    };
    let targets = at(8, 0, &DisplayBounds::default(), &dimmer);
    assert_eq!((targets.brightness, targets.contrast), (25, 46));
}

#[test]
fn test_night_app_offset_adds_above_min() {
    let p = ScheduleParams {
        app_brightness_offset: 20,
        ..params()
    };
    let targets = at(2, 0, &bounds(10, 100, 0, 100), &p);
    assert_eq!(targets.brightness, 30);
    assert_eq!(targets.contrast, 0);
}

#[test]
fn test_app_offset_can_exceed_display_max() {
    let p = ScheduleParams {
        app_brightness_offset: 20,
        app_contrast_offset: -20,
        ..params()
    };
    let targets = at(12, 0, &bounds(0, 90, 0, 70), &p);
    assert_eq!(targets.brightness, 100);
    // Negative app offsets are ignored
    assert_eq!(targets.contrast, 70);
}

#[test]
fn test_app_offset_applies_inside_curve_and_after() {
    let p = ScheduleParams {
        app_brightness_offset: 10,
        ..params()
    };
    // 50 on the curve, +10 clamped to max, then +10 clamped to 100
    assert_eq!(at(8, 0, &DisplayBounds::default(), &p).brightness, 70);
    // 55 at the top of the ramp stays 55 inside the curve, then rises past max
    assert_eq!(at(11, 0, &bounds(0, 55, 0, 100), &p).brightness, 65);
}

#[test]
fn test_zero_length_ramps() {
    let p = ScheduleParams {
        daylight_extension_minutes: 0,
        noon_duration_minutes: 12 * 60,
        ..ScheduleParams::default()
    };
    let windows = p.windows(&moment());
    assert_eq!(windows.daylight_start, windows.noon_start);

    let start = day_phase_targets(windows.noon_start, &moment(), &DisplayBounds::default(), &p);
    assert_eq!(start.phase, DayPhase::Rising);
    assert_eq!(start.percent, Some(100.0));
    assert_eq!(start.brightness, 100);

    let end = day_phase_targets(windows.noon_end, &moment(), &DisplayBounds::default(), &p);
    assert_eq!(end.phase, DayPhase::Falling);
    assert_eq!(end.brightness, 100);
}

#[test]
fn test_day_curve_samples_whole_day() {
    let curve = day_curve(&moment(), &DisplayBounds::default(), &params(), 60);
    assert_eq!(curve.len(), 24);
    assert_eq!(curve[0].time, NaiveTime::MIN);
    assert_eq!(curve[0].phase, DayPhase::Night);
    assert_eq!(curve[8].brightness, 50);
    assert_eq!(curve[12].phase, DayPhase::Plateau);
    assert_eq!(curve[12].brightness, 100);
    assert_eq!(curve[23].time.format("%H:%M").to_string(), "23:00");

    assert_eq!(day_curve(&moment(), &DisplayBounds::default(), &params(), 0).len(), 24 * 60);
    assert_eq!(day_curve(&moment(), &DisplayBounds::default(), &params(), 90).len(), 16);
}

#[test]
fn test_schedule_params_from_config() {
    let config = AdaptationConfig {
        brightness_offset: 5,
        contrast_offset: -5,
        daylight_extension_minutes: 30,
        noon_duration_minutes: 60,
        smooth_transition: true,
    };
    let app = AppOverride::new("mpv", 20, 10);
    let params = ScheduleParams::new(&config, Some(&app));
    assert_eq!(params.app_brightness_offset, 20);
    assert_eq!(params.app_contrast_offset, 10);
    assert_eq!(params.daylight_extension_minutes, 30);
    assert_eq!(ScheduleParams::new(&config, None).app_brightness_offset, 0);
}

proptest! {
    #[test]
    fn test_plateau_is_always_max(
        minute in (11u32 * 60 + 1)..(13u32 * 60),
        min_b in 0u8..=50, max_b in 50u8..=100,
        min_c in 0u8..=50, max_c in 50u8..=100,
        offset in -100i32..=100,
    ) {
        let p = ScheduleParams { brightness_offset: offset, contrast_offset: offset, ..params() };
        let targets = at(minute / 60, minute % 60, &bounds(min_b, max_b, min_c, max_c), &p);
        prop_assert_eq!(targets.phase, DayPhase::Plateau);
        prop_assert_eq!((targets.brightness, targets.contrast), (max_b, max_c));
    }

    #[test]
    fn test_night_is_always_min(
        minute in prop_oneof![0u32..(5 * 60), (19u32 * 60 + 1)..(24u32 * 60)],
        min_b in 0u8..=50, max_b in 50u8..=100,
        min_c in 0u8..=50, max_c in 50u8..=100,
        offset in -100i32..=100,
    ) {
        let p = ScheduleParams { brightness_offset: offset, contrast_offset: offset, ..params() };
        let targets = at(minute / 60, minute % 60, &bounds(min_b, max_b, min_c, max_c), &p);
        prop_assert_eq!(targets.phase, DayPhase::Night);
        prop_assert_eq!((targets.brightness, targets.contrast), (min_b, min_c));
    }

    #[test]
    fn test_targets_within_bounds_without_app_offset(
        minute in 0u32..(24 * 60),
        min_b in 0u8..=50, max_b in 50u8..=100,
        offset in -100i32..=100,
    ) {
        let p = ScheduleParams { brightness_offset: offset, contrast_offset: offset, ..params() };
        let b = bounds(min_b, max_b, min_b, max_b);
        let targets = at(minute / 60, minute % 60, &b, &p);
        prop_assert!(targets.brightness >= min_b && targets.brightness <= max_b);
        prop_assert!(targets.contrast >= min_b && targets.contrast <= max_b);
    }
}
