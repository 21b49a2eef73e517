//! Day-phase detection and solar brightness targets.
//!
//! The solar day is split into four phases around the [`SolarMoment`]:
//!
//! ```text
//!   Night  │ Rising            │ Plateau │ Falling            │ Night
//! ─────────┼───────────────────┼─────────┼────────────────────┼──────────
//!   daylight_start        noon_start  noon_end          daylight_end
//! ```
//!
//! - `daylight_start = sunrise - daylight_extension`, `daylight_end = sunset + daylight_extension`
//! - `noon_start/noon_end = solar_noon ∓ noon_duration / 2` (whole minutes)
//!
//! Rising and Falling map the position inside the phase to a percent and run it through the
//! curve model; Plateau and Night pin the display to its max and min. Boundaries belong to the
//! ramps: exactly at `noon_start` the display is still Rising (at 100%).

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveTime, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::{AdaptationConfig, AppOverride};
use crate::core::curve::{compute_brightness, compute_contrast};
use crate::geo::SolarMoment;
use crate::state::display::DisplayBounds;

/// Segment of the solar day driving brightness computation.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayPhase {
    /// From `daylight_start` up to and including `noon_start`
    Rising,
    /// Strictly between `noon_start` and `noon_end`
    Plateau,
    /// From `noon_end` up to and including `daylight_end`
    Falling,
    /// Everything else
    Night,
}

impl fmt::Display for DayPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl DayPhase {
    /// Phase of `now` for the given windows.
    pub fn at(now: DateTime<Local>, windows: &PhaseWindows) -> Self {
        windows.phase_at(now)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Rising => "Rising",
            Self::Plateau => "Plateau",
            Self::Falling => "Falling",
            Self::Night => "Night",
        }
    }
}

/// Phase boundaries for one solar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PhaseWindows {
    pub daylight_start: DateTime<Local>,
    pub noon_start: DateTime<Local>,
    pub noon_end: DateTime<Local>,
    pub daylight_end: DateTime<Local>,
}

impl PhaseWindows {
    pub fn new(moment: &SolarMoment, daylight_extension_minutes: u32, noon_duration_minutes: u32) -> Self {
        let extension = Duration::minutes(daylight_extension_minutes as i64);
        let half_noon = Duration::minutes((noon_duration_minutes / 2) as i64);
        Self {
            daylight_start: moment.sunrise - extension,
            noon_start: moment.solar_noon - half_noon,
            noon_end: moment.solar_noon + half_noon,
            daylight_end: moment.sunset + extension,
        }
    }

    /// First matching range wins: Rising, Plateau, Falling, then Night.
    pub fn phase_at(&self, now: DateTime<Local>) -> DayPhase {
        if self.daylight_start <= now && now <= self.noon_start {
            DayPhase::Rising
        } else if self.noon_start < now && now < self.noon_end {
            DayPhase::Plateau
        } else if self.noon_end <= now && now <= self.daylight_end {
            DayPhase::Falling
        } else {
            DayPhase::Night
        }
    }

    /// Position inside a ramp as a percent of the way towards the plateau, `None` outside ramps.
    pub fn percent_at(&self, now: DateTime<Local>) -> Option<f64> {
        match self.phase_at(now) {
            DayPhase::Rising => Some(
                ramp_fraction(
                    now - self.daylight_start,
                    self.noon_start - self.daylight_start,
                )
                .map_or(100.0, |fraction| fraction * 100.0),
            ),
            DayPhase::Falling => Some(
                ramp_fraction(now - self.noon_end, self.daylight_end - self.noon_end)
                    .map_or(100.0, |fraction| 100.0 * (1.0 - fraction)),
            ),
            DayPhase::Plateau | DayPhase::Night => None,
        }
    }
}

/// `elapsed / span`, or `None` for a zero-length ramp (which sits at the plateau edge).
fn ramp_fraction(elapsed: Duration, span: Duration) -> Option<f64> {
    let span_ms = span.num_milliseconds();
    if span_ms <= 0 {
        return None;
    }
    Some(elapsed.num_milliseconds() as f64 / span_ms as f64)
}

/// Inputs of the solar schedule besides time and bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScheduleParams {
    pub daylight_extension_minutes: u32,
    pub noon_duration_minutes: u32,
    pub brightness_offset: i32,
    pub contrast_offset: i32,
    pub app_brightness_offset: i32,
    pub app_contrast_offset: i32,
}

impl ScheduleParams {
    pub fn new(config: &AdaptationConfig, app: Option<&AppOverride>) -> Self {
        Self {
            daylight_extension_minutes: config.daylight_extension_minutes,
            noon_duration_minutes: config.noon_duration_minutes,
            brightness_offset: config.brightness_offset,
            contrast_offset: config.contrast_offset,
            app_brightness_offset: app.map_or(0, |a| a.brightness),
            app_contrast_offset: app.map_or(0, |a| a.contrast),
        }
    }

    pub fn windows(&self, moment: &SolarMoment) -> PhaseWindows {
        PhaseWindows::new(
            moment,
            self.daylight_extension_minutes,
            self.noon_duration_minutes,
        )
    }
}

/// Result of evaluating the schedule at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseTargets {
    pub phase: DayPhase,
    /// Ramp position, `None` on the plateau and at night
    pub percent: Option<f64>,
    pub brightness: u8,
    pub contrast: u8,
}

/// Brightness and contrast targets for `now`.
///
/// App offsets are applied twice on the ramps: once inside the curve (clamped to the display's
/// max) and once after phase resolution (clamped only to 100). The second addition is what lets
/// an application push a display past its configured max.
pub fn day_phase_targets(
    now: DateTime<Local>,
    moment: &SolarMoment,
    bounds: &DisplayBounds,
    params: &ScheduleParams,
) -> PhaseTargets {
    let windows = params.windows(moment);
    let phase = DayPhase::at(now, &windows);
    let percent = windows.percent_at(now);

    let (brightness, contrast) = match (phase, percent) {
        (DayPhase::Plateau, _) => (bounds.max_brightness, bounds.max_contrast),
        (DayPhase::Rising | DayPhase::Falling, Some(percent)) => (
            compute_brightness(
                percent,
                params.brightness_offset,
                params.app_brightness_offset,
                bounds.min_brightness,
                bounds.max_brightness,
            ),
            compute_contrast(
                percent,
                params.contrast_offset,
                params.app_contrast_offset,
                bounds.min_contrast,
                bounds.max_contrast,
            ),
        ),
        _ => (bounds.min_brightness, bounds.min_contrast),
    };

    PhaseTargets {
        phase,
        percent,
        brightness: add_app_offset(brightness, params.app_brightness_offset),
        contrast: add_app_offset(contrast, params.app_contrast_offset),
    }
}

fn add_app_offset(value: u8, app_offset: i32) -> u8 {
    if app_offset > 0 {
        (value as i32 + app_offset).min(100) as u8
    } else {
        value
    }
}

/// Evaluate the schedule at a wall-clock time on the moment's date.
pub fn targets_at(
    hour: u32,
    minute: u32,
    moment: &SolarMoment,
    bounds: &DisplayBounds,
    params: &ScheduleParams,
) -> PhaseTargets {
    let time = NaiveTime::from_hms_opt(hour.min(23), minute.min(59), 0).unwrap_or(NaiveTime::MIN);
    day_phase_targets(at_wall_clock(moment.date, time), moment, bounds, params)
}

/// Local instant for a wall-clock time; times skipped by a DST jump move forward an hour.
pub(crate) fn at_wall_clock(date: NaiveDate, time: NaiveTime) -> DateTime<Local> {
    let naive = date.and_time(time);
    Local
        .from_local_datetime(&naive)
        .earliest()
        .or_else(|| Local.from_local_datetime(&(naive + Duration::hours(1))).earliest())
        .unwrap_or_else(|| Local.from_utc_datetime(&naive))
}

/// One row of a whole-day preview.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurvePoint {
    pub time: NaiveTime,
    pub phase: DayPhase,
    pub brightness: u8,
    pub contrast: u8,
}

/// Targets across the moment's whole day, every `step_minutes` starting at midnight.
pub fn day_curve(
    moment: &SolarMoment,
    bounds: &DisplayBounds,
    params: &ScheduleParams,
    step_minutes: u32,
) -> Vec<CurvePoint> {
    let step = step_minutes.max(1);
    (0..24 * 60)
        .step_by(step as usize)
        .map(|minute_of_day| {
            let targets = targets_at(minute_of_day / 60, minute_of_day % 60, moment, bounds, params);
            CurvePoint {
                time: NaiveTime::from_hms_opt(minute_of_day / 60, minute_of_day % 60, 0)
                    .unwrap_or(NaiveTime::MIN),
                phase: targets.phase,
                brightness: targets.brightness,
                contrast: targets.contrast,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests;
