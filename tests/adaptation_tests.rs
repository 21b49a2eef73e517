//! End-to-end adaptation tests: configuration in, hardware writes out.

use chrono::{NaiveDate, NaiveTime};
use mockall::mock;
use mockall::predicate::{always, eq};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use daylightr::backend::BrightnessBackend;
use daylightr::config::loading::parse_config;
use daylightr::config::{AdaptationConfig, Config};
use daylightr::geo::moment_from_config;
use daylightr::logger::Log;
use daylightr::sensor::FixedSensor;
use daylightr::state::display::DisplayId;
use daylightr::state::events::ChangeEvent;
use daylightr::{AdaptOutcome, AdaptationController, Signal, SkipReason};

mock! {
    pub Panel {}
    impl BrightnessBackend for Panel {
        fn write_brightness(&self, display: &DisplayId, value: u8) -> anyhow::Result<()>;
        fn write_contrast(&self, display: &DisplayId, value: u8) -> anyhow::Result<()>;
        fn backend_name(&self) -> &'static str;
    }
}

const BASE_CONFIG: &str = r#"
mode = "location"
sunrise = "06:00:00"
sunset = "18:00:00"
daylight_extension = 60
noon_duration = 120
smooth_transition = false

[[display]]
id = "1"
name = "Main"
brightness = 0
contrast = 0
"#;

fn load(extra: &str) -> Config {
    parse_config(&format!("{BASE_CONFIG}{extra}")).expect("test config should parse")
}

fn controller(config: &Config, backend: MockPanel) -> AdaptationController {
    Log::set_enabled(false);
    let controller = AdaptationController::new(AdaptationConfig::from_config(config), Arc::new(backend));
    for display in config.display_states() {
        controller.register(display).unwrap();
    }
    controller
}

fn solar_at(config: &Config, hour: u32, minute: u32) -> Signal {
    let date = NaiveDate::from_ymd_opt(2024, 4, 15).unwrap();
    let moment = moment_from_config(config, date).unwrap();
    Signal::solar_at(moment, NaiveTime::from_hms_opt(hour, minute, 0).unwrap())
}

fn main_display() -> DisplayId {
    DisplayId::from("1")
}

#[test]
fn test_rising_midpoint_end_to_end() {
    let config = load("");
    let mut backend = MockPanel::new();
    backend
        .expect_write_brightness()
        .with(eq(main_display()), eq(50))
        .times(1)
        .returning(|_, _| Ok(()));
    backend
        .expect_write_contrast()
        .with(eq(main_display()), eq(50))
        .times(1)
        .returning(|_, _| Ok(()));

    let controller = controller(&config, backend);
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    controller.add_listener(move |event: &ChangeEvent| sink.lock().unwrap().push(event.clone()));

    let outcome = controller
        .adapt(&main_display(), &solar_at(&config, 8, 0), None)
        .unwrap();
    assert_eq!(
        outcome,
        AdaptOutcome::Applied {
            brightness: 50,
            contrast: 50
        }
    );
    assert_eq!(
        *events.lock().unwrap(),
        vec![ChangeEvent::new(main_display(), 50, 50)]
    );
}

#[test]
fn test_night_app_override_end_to_end() {
    let config = load(
        r#"
[[app]]
name = "mpv"
brightness = 20
"#,
    );
    let config = Config {
        displays: config
            .displays
            .into_iter()
            .map(|mut d| {
                d.min_brightness = Some(10);
                d
            })
            .collect(),
        ..config
    };

    let mut backend = MockPanel::new();
    backend
        .expect_write_brightness()
        .with(eq(main_display()), eq(30))
        .times(1)
        .returning(|_, _| Ok(()));
    backend.expect_write_contrast().times(0);

    let controller = controller(&config, backend);
    let app = config.app_override("MPV").cloned();
    let outcome = controller
        .adapt(&main_display(), &solar_at(&config, 2, 0), app.as_ref())
        .unwrap();
    assert_eq!(
        outcome,
        AdaptOutcome::Applied {
            brightness: 30,
            contrast: 0
        }
    );
}

#[test]
fn test_locked_contrast_from_config() {
    let config = parse_config(
        &BASE_CONFIG.replace("contrast = 0", "contrast = 0\nlocked_contrast = true"),
    )
    .unwrap();

    let mut backend = MockPanel::new();
    backend
        .expect_write_brightness()
        .with(always(), eq(100))
        .times(1)
        .returning(|_, _| Ok(()));
    backend.expect_write_contrast().times(0);

    let controller = controller(&config, backend);
    controller
        .adapt(&main_display(), &solar_at(&config, 12, 0), None)
        .unwrap();
    assert_eq!(
        controller.snapshot(&main_display()).unwrap().values(),
        (100, 0)
    );
}

#[test]
fn test_slow_hardware_takes_larger_steps() {
    let config = parse_config(
        &BASE_CONFIG
            .replace("smooth_transition = false", "smooth_transition = true")
            .replace("contrast = 0", "contrast = 0\nlocked_contrast = true"),
    )
    .unwrap();

    let writes = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&writes);
    let mut backend = MockPanel::new();
    backend
        .expect_write_brightness()
        .returning(move |_, value| {
            recorded.lock().unwrap().push(value);
            std::thread::sleep(Duration::from_millis(25));
            Ok(())
        });

    let controller = controller(&config, backend);
    let outcome = controller
        .adapt(&main_display(), &solar_at(&config, 12, 0), None)
        .unwrap();
    assert!(matches!(outcome, AdaptOutcome::Scheduled { brightness: 100, .. }));
    controller.wait_idle();

    let writes = writes.lock().unwrap().clone();
    assert_eq!(writes.first(), Some(&1));
    assert_eq!(writes.last(), Some(&100));
    assert_eq!(writes.iter().filter(|&&v| v == 100).count(), 1);
    // 25ms per write means steps of at least 2 after the first one
    assert!(writes.len() <= 51, "{} writes", writes.len());
    assert_eq!(controller.snapshot(&main_display()).unwrap().brightness, 100);
}

#[test]
fn test_missing_sensor_reading_writes_nothing() {
    let config = load("");
    // Any write would panic on the missing expectation
    let controller = controller(&config, MockPanel::new());

    let report = controller.adapt_from_sensor(&FixedSensor::empty(), None);
    assert_eq!(report.len(), 1);
    assert_eq!(
        *report[0].1.as_ref().unwrap(),
        AdaptOutcome::Skipped(SkipReason::NoSensorReading)
    );
    assert_eq!(
        controller.snapshot(&main_display()).unwrap().values(),
        (0, 0)
    );
}
