#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use std::cell::Cell;
use std::rc::Rc;

use common::{Panel, Pool, StrDetector};
use dirtywatch_core::{ChangeDetector, FieldSelector, Identity};

#[test]
fn test_unchanged_field_emits_nothing() {
    let panel = Panel::new("Inbox", "3 unread");
    let mut detector = StrDetector::new();
    detector.register_scalar(panel.clone(), 1, "title", "title").unwrap();

    assert!(detector.run_cycle().is_empty());
    assert!(detector.run_cycle().is_empty());
}

#[test]
fn test_replaced_field_reports_previous_and_current() {
    let panel = Panel::new("Inbox", "3 unread");
    let original = panel.title.borrow().clone();
    let mut detector = StrDetector::new();
    detector.register_scalar(panel.clone(), 1, "title", "title").unwrap();

    *panel.title.borrow_mut() = Rc::from("Archive");
    let records = detector.run_cycle();

    assert_eq!(records.objects().len(), 1);
    let record = records.objects().head().unwrap();
    assert_eq!(record.id(), &1);
    assert_eq!(record.handler(), &"title");
    assert_eq!(record.field().as_str(), "title");
    assert!(record.previous_value().unwrap().same(&original));
    assert_eq!(&**record.current_value(), "Archive");

    assert!(detector.run_cycle().is_empty(), "snapshot was updated");
}

#[test]
fn test_equal_text_in_new_allocation_is_a_change() {
    let panel = Panel::new("Inbox", "");
    let mut detector = StrDetector::new();
    detector.register_scalar(panel.clone(), 1, "title", "title").unwrap();

    *panel.title.borrow_mut() = Pool::fresh("Inbox");
    let records = detector.run_cycle();

    assert_eq!(records.object_ids(), vec![1]);
}

#[test]
fn test_two_fields_of_one_container_are_independent() {
    let panel = Panel::new("Inbox", "3 unread");
    let mut detector = StrDetector::new();
    detector.register_scalar(panel.clone(), 1, "title", "title").unwrap();
    detector.register_scalar(panel.clone(), 2, "subtitle", "subtitle").unwrap();

    *panel.subtitle.borrow_mut() = Rc::from("4 unread");
    let records = detector.run_cycle();

    assert_eq!(records.object_ids(), vec![2]);
    assert_eq!(records.objects().head().unwrap().field(), &FieldSelector::from("subtitle"));
}

#[test]
fn test_getter_closure_as_container() {
    let counter = Rc::new(Cell::new(0u32));
    let source = counter.clone();
    let mut detector: ChangeDetector<&'static str, (), u32> = ChangeDetector::new();
    detector
        .register_scalar(Rc::new(move |_: &FieldSelector| source.get()), "count", (), "count")
        .unwrap();

    counter.set(1);
    counter.set(0);
    assert!(detector.run_cycle().is_empty(), "intermediate values are not observed");

    counter.set(7);
    let records = detector.run_cycle();
    let record = records.objects().head().unwrap();
    assert_eq!(record.previous_value(), Some(&0));
    assert_eq!(record.current_value(), &7);
}

#[test]
fn test_float_nan_is_stable_by_bits() {
    let value = Rc::new(Cell::new(f64::NAN));
    let source = value.clone();
    let mut detector: ChangeDetector<u32, (), f64> = ChangeDetector::new();
    detector
        .register_scalar(Rc::new(move |_: &FieldSelector| source.get()), 1, (), "ratio")
        .unwrap();

    assert!(detector.run_cycle().is_empty());

    value.set(0.5);
    assert_eq!(detector.run_cycle().object_ids(), vec![1]);
}
