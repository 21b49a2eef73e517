//! Solar times for a date.
//!
//! Produces the [`SolarMoment`] the adaptation curve is anchored on: sunrise, sunset and solar
//! noon in local time. Times come either from coordinates (astronomical calculation through the
//! `sunrise` crate) or from manually configured sunrise/sunset times.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Local, NaiveDate, NaiveTime, TimeZone};
use sunrise::{Coordinates, SolarDay, SolarEvent};

use crate::common::constants::*;
use crate::config::Config;

#[cfg(test)]
mod tests;

/// Sunrise, sunset and solar noon for one local date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolarMoment {
    pub date: NaiveDate,
    pub sunrise: DateTime<Local>,
    pub sunset: DateTime<Local>,
    pub solar_noon: DateTime<Local>,
}

impl SolarMoment {
    /// Calculate solar times for `date` at the given coordinates.
    ///
    /// Solar noon is taken as the midpoint between sunrise and sunset.
    ///
    /// # Errors
    /// Fails for invalid coordinates and for latitudes beyond ±65°, where the sun may stay
    /// above or below the horizon all day.
    pub fn for_date(latitude: f64, longitude: f64, date: NaiveDate) -> Result<Self> {
        if latitude.abs() > MAXIMUM_SOLAR_LATITUDE {
            anyhow::bail!(
                "Latitude {latitude:.4}° is beyond ±{MAXIMUM_SOLAR_LATITUDE}°; use manual sunrise/sunset times instead"
            );
        }

        let coord = Coordinates::new(latitude, longitude)
            .ok_or_else(|| anyhow::anyhow!("Invalid coordinates {latitude}, {longitude}"))?;
        let solar_day = SolarDay::new(coord, date);
        let sunrise = solar_day
            .event_time(SolarEvent::Sunrise)
            .with_timezone(&Local);
        let sunset = solar_day
            .event_time(SolarEvent::Sunset)
            .with_timezone(&Local);

        Self::from_instants(date, sunrise, sunset)
    }

    /// Build solar times from wall-clock sunrise and sunset on `date`.
    pub fn from_times(date: NaiveDate, sunrise: NaiveTime, sunset: NaiveTime) -> Result<Self> {
        let sunrise = local_datetime(date, sunrise).context("Invalid sunrise time")?;
        let sunset = local_datetime(date, sunset).context("Invalid sunset time")?;
        Self::from_instants(date, sunrise, sunset)
    }

    fn from_instants(
        date: NaiveDate,
        sunrise: DateTime<Local>,
        sunset: DateTime<Local>,
    ) -> Result<Self> {
        if sunrise >= sunset {
            anyhow::bail!(
                "Sunrise ({}) is not before sunset ({}) on {}",
                sunrise.format("%H:%M:%S"),
                sunset.format("%H:%M:%S"),
                date
            );
        }

        let solar_noon = sunrise + (sunset - sunrise) / 2;
        Ok(Self {
            date,
            sunrise,
            sunset,
            solar_noon,
        })
    }

    pub fn day_length(&self) -> Duration {
        self.sunset - self.sunrise
    }
}

/// Resolve a local wall-clock time, taking the earlier instant when DST makes it ambiguous.
pub(crate) fn local_datetime(date: NaiveDate, time: NaiveTime) -> Result<DateTime<Local>> {
    Local
        .from_local_datetime(&date.and_time(time))
        .earliest()
        .ok_or_else(|| anyhow::anyhow!("{date} {time} does not exist in the local timezone"))
}

/// Solar times for `date` according to the configuration.
///
/// Coordinates take precedence; without them the configured (or default) sunrise and sunset
/// times are used.
pub fn moment_from_config(config: &Config, date: NaiveDate) -> Result<SolarMoment> {
    if let (Some(lat), Some(lon)) = (config.latitude, config.longitude) {
        return SolarMoment::for_date(lat, lon, date);
    }

    let sunrise = parse_time(config.sunrise.as_deref().unwrap_or(DEFAULT_SUNRISE))
        .context("Invalid sunrise time format")?;
    let sunset = parse_time(config.sunset.as_deref().unwrap_or(DEFAULT_SUNSET))
        .context("Invalid sunset time format")?;
    SolarMoment::from_times(date, sunrise, sunset)
}

fn parse_time(value: &str) -> Result<NaiveTime> {
    Ok(NaiveTime::parse_from_str(value, "%H:%M:%S")?)
}

/// Log a solar moment as a block.
pub fn log_solar_moment(moment: &SolarMoment) {
    let length = moment.day_length();
    log_block_start!("Solar times for {}", moment.date);
    log_indented!("Sunrise: {}", moment.sunrise.format("%H:%M:%S"));
    log_indented!("Solar noon: {}", moment.solar_noon.format("%H:%M:%S"));
    log_indented!("Sunset: {}", moment.sunset.format("%H:%M:%S"));
    log_indented!(
        "Day length: {}h {}m",
        length.num_hours(),
        length.num_minutes() % 60
    );
}
