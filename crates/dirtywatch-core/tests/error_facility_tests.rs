#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{Panel, StrDetector};
use dirtywatch_core::{DetectorConfig, DirtyWatchError, ExError, ExErrorKind};
use dirtywatch_core_types::CycleId;

#[test]
fn test_duplicate_id_converts_with_watch_id() {
    let panel = Panel::new("t", "s");
    let mut detector = StrDetector::new();
    detector.register_scalar(panel.clone(), 42, "h", "title").unwrap();
    let err = detector.register_scalar(panel, 42, "h", "title").unwrap_err();

    let ex: ExError = err.into();
    assert_eq!(ex.kind(), ExErrorKind::DuplicateId);
    assert_eq!(ex.code(), "ERR_DUPLICATE_ID");
    assert_eq!(ex.watch_id(), Some("42"));
}

#[test]
fn test_invalid_range_message_names_bounds() {
    let mut detector = StrDetector::new();
    let err = detector.unregister_range(&8, &2).unwrap_err();

    assert_eq!(err.to_string(), "Invalid range: exclusive end 2 is below inclusive start 8");
    let ex: ExError = err.into();
    assert_eq!(ex.kind(), ExErrorKind::InvalidRange);
    assert!(ex.message().contains("[8, 2)"));
}

#[test]
fn test_invalid_config_converts() {
    let err = DetectorConfig::from_toml_str("baseline = 3").unwrap_err();
    assert!(matches!(err, DirtyWatchError::InvalidConfig { .. }));

    let ex: ExError = err.into();
    assert_eq!(ex.code(), "ERR_INVALID_CONFIG");
    assert!(!ex.message().is_empty());
}

#[test]
fn test_ex_error_builder_context() {
    let detector = StrDetector::new();
    let ex = ExError::new(ExErrorKind::InvalidConfig)
        .with_op("run_cycle")
        .with_watch_id("7")
        .with_detector_id(detector.detector_id().clone())
        .with_cycle(CycleId::new(4))
        .with_message("baseline must be a string");

    assert_eq!(ex.op(), Some("run_cycle"));
    assert_eq!(ex.detector_id(), Some(detector.detector_id()));
    assert_eq!(ex.cycle(), Some(CycleId::new(4)));
    let rendered = ex.to_string();
    assert!(rendered
        .starts_with("[ERR_INVALID_CONFIG] in operation 'run_cycle': baseline must be a string"));
    assert!(rendered.contains("(watch_id: 7)"));
    assert!(rendered.contains(&format!("(detector_id: {})", detector.detector_id())));
    assert!(rendered.ends_with("(cycle#4)"));
}
