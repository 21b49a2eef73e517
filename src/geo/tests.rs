use super::*;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

#[test]
fn test_from_times_midpoint_noon() {
    let moment = SolarMoment::from_times(date(2024, 3, 20), time(6, 0), time(18, 0)).unwrap();
    assert_eq!(moment.solar_noon.time(), time(12, 0));
    assert_eq!(moment.day_length(), Duration::hours(12));
    assert_eq!(moment.sunrise.date_naive(), date(2024, 3, 20));
}

#[test]
fn test_from_times_rejects_inverted_day() {
    assert!(SolarMoment::from_times(date(2024, 3, 20), time(18, 0), time(6, 0)).is_err());
    assert!(SolarMoment::from_times(date(2024, 3, 20), time(9, 0), time(9, 0)).is_err());
}

#[test]
fn test_for_date_berlin_midsummer() {
    let moment = SolarMoment::for_date(52.52, 13.405, date(2024, 6, 21)).unwrap();
    assert!(moment.sunrise < moment.solar_noon);
    assert!(moment.solar_noon < moment.sunset);

    // Roughly 16h 50m of daylight around the solstice
    let hours = moment.day_length().num_minutes() as f64 / 60.0;
    assert!((16.0..17.5).contains(&hours), "day length {hours}h");
}

#[test]
fn test_for_date_seasons_differ() {
    let summer = SolarMoment::for_date(48.85, 2.35, date(2024, 6, 21)).unwrap();
    let winter = SolarMoment::for_date(48.85, 2.35, date(2024, 12, 21)).unwrap();
    assert!(summer.day_length() > winter.day_length() + Duration::hours(6));
}

#[test]
fn test_for_date_equator_is_about_twelve_hours() {
    let moment = SolarMoment::for_date(0.0, 0.0, date(2024, 9, 22)).unwrap();
    let minutes = moment.day_length().num_minutes();
    assert!((700..=740).contains(&minutes), "day length {minutes} minutes");
}

#[test]
fn test_for_date_rejects_polar_and_invalid_coordinates() {
    assert!(SolarMoment::for_date(78.22, 15.65, date(2024, 6, 21)).is_err());
    assert!(SolarMoment::for_date(-70.0, 0.0, date(2024, 6, 21)).is_err());
    assert!(SolarMoment::for_date(10.0, 200.0, date(2024, 6, 21)).is_err());
}

#[test]
fn test_moment_from_config_manual_times() {
    let config = Config {
        sunrise: Some("05:30:00".to_string()),
        sunset: Some("20:30:00".to_string()),
        ..Config::default()
    };
    let moment = moment_from_config(&config, date(2024, 5, 1)).unwrap();
    assert_eq!(moment.sunrise.time(), time(5, 30));
    assert_eq!(moment.sunset.time(), time(20, 30));
    assert_eq!(moment.solar_noon.time(), time(13, 0));
}

#[test]
fn test_moment_from_config_defaults_and_coordinates() {
    let moment = moment_from_config(&Config::default(), date(2024, 5, 1)).unwrap();
    assert_eq!(moment.sunrise.time(), time(7, 0));
    assert_eq!(moment.sunset.time(), time(19, 0));

    let config = Config {
        latitude: Some(40.7128),
        longitude: Some(-74.006),
        sunrise: Some("01:00:00".to_string()),
        ..Config::default()
    };
    let moment = moment_from_config(&config, date(2024, 5, 1)).unwrap();
    assert_ne!(moment.sunrise.time(), time(1, 0));
}
