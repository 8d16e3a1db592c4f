#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use std::rc::Rc;

use common::{Panel, StrDetector};
use dirtywatch_core::{Baseline, DetectorConfig};

#[test]
fn test_detector_uses_default_config() {
    let detector = StrDetector::new();
    assert_eq!(detector.config(), &DetectorConfig::default());
    assert_eq!(detector.config().baseline, Baseline::Capture);
}

#[test]
fn test_config_from_toml_drives_baseline() {
    let config = DetectorConfig::from_toml_str(
        r#"
        domain = "inspector"
        baseline = "unread"
        "#,
    )
    .unwrap();
    let panel = Panel::new("t", "s");
    let mut detector = StrDetector::with_config(config);
    detector.register_scalar(panel.clone(), 1, "h", "title").unwrap();

    let records = detector.run_cycle();
    let record = records.objects().head().unwrap();
    assert_eq!(record.previous_value(), None);
    assert_eq!(&**record.current_value(), "t");
    assert_eq!(detector.config().domain, "inspector");
}

#[test]
fn test_capture_baseline_ignores_state_before_registration() {
    let panel = Panel::new("t", "s");
    *panel.title.borrow_mut() = Rc::from("changed before registration");
    let mut detector = StrDetector::new();
    detector.register_scalar(panel.clone(), 1, "h", "title").unwrap();

    assert!(detector.run_cycle().is_empty());
}

#[test]
fn test_config_serializes_back_to_toml() {
    let config = DetectorConfig::default()
        .with_domain("grid")
        .with_baseline(Baseline::Unread);
    let rendered = toml::to_string(&config).unwrap();

    assert!(rendered.contains("baseline = \"unread\""));
    assert_eq!(DetectorConfig::from_toml_str(&rendered).unwrap(), config);
}

#[test]
fn test_detectors_have_distinct_ids() {
    let first = StrDetector::new();
    let second = StrDetector::new();
    assert_ne!(first.detector_id(), second.detector_id());
}
