//! Tick Loop Demo
//!
//! Drives a change detector from a simple polling loop, the way a host
//! application would on each frame or timer tick.
//!
//! Run with `RUST_LOG=dirtywatch_core=info` to see boundary events.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use dirtywatch_core::logging_facility::{init, Profile};
use dirtywatch_core::{ChangeDetector, ChangeRecords, DetectorConfig, FieldAccess, FieldSelector};

/// Watched value: shared strings, compared by allocation.
type Text = Rc<str>;

struct StatusBar {
    message: RefCell<Text>,
}

impl FieldAccess<Text> for StatusBar {
    fn read_field(&self, _field: &FieldSelector) -> Text {
        self.message.borrow().clone()
    }
}

fn report(records: &ChangeRecords<u32, &'static str, Text, &'static str>) {
    if records.is_empty() {
        println!("{}: nothing changed", records.cycle());
        return;
    }
    println!("{}: {} record(s)", records.cycle(), records.len());
    for record in records.objects() {
        println!(
            "  [{}] {}: {:?} -> {:?}",
            record.id(),
            record.handler(),
            record.previous_value(),
            record.current_value()
        );
    }
    for record in records.sequences() {
        println!("  [{}] {}:", record.id(), record.handler());
        for added in record.additions() {
            println!("    + {} at {:?}", added.item(), added.current_index());
        }
        for removed in record.removals() {
            println!("    - {} from {:?}", removed.item(), removed.previous_index());
        }
        for moved in record.moved() {
            println!(
                "    ~ {} {:?} -> {:?}",
                moved.item(),
                moved.previous_index(),
                moved.current_index()
            );
        }
    }
    for record in records.maps() {
        println!("  [{}] {}:", record.id(), record.handler());
        for removed in record.removals() {
            println!("    - {} = {}", removed.key(), removed.value());
        }
        for added in record.additions() {
            println!("    + {} = {}", added.key(), added.value());
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init(Profile::Development);

    let config = DetectorConfig::from_toml_str("domain = \"tick-loop\"")?;
    let mut detector: ChangeDetector<u32, &'static str, Text, &'static str> =
        ChangeDetector::with_config(config);

    let status = Rc::new(StatusBar {
        message: RefCell::new(Rc::from("ready")),
    });
    let inbox: Rc<RefCell<Vec<Text>>> = Rc::new(RefCell::new(
        ["alpha", "beta", "gamma"].into_iter().map(Rc::from).collect(),
    ));
    let labels: Rc<RefCell<BTreeMap<&'static str, Text>>> = Rc::new(RefCell::new(BTreeMap::new()));

    detector.register_scalar(status.clone(), 10, "status", "message")?;
    detector.register_sequence(inbox.clone(), 20, "inbox")?;
    let labels_handle = detector.register_associative(labels.clone(), 30, "labels")?;

    for tick in 0..5 {
        match tick {
            1 => {
                *status.message.borrow_mut() = Rc::from("syncing");
                inbox.borrow_mut().rotate_right(1);
            }
            2 => {
                inbox.borrow_mut().remove(1);
                labels.borrow_mut().insert("alpha", Rc::from("urgent"));
            }
            3 => {
                let urgent = labels.borrow().get("alpha").cloned();
                if let Some(urgent) = urgent {
                    labels.borrow_mut().insert("gamma", urgent);
                }
                labels_handle.unregister();
            }
            _ => {}
        }
        report(&detector.run_cycle());
    }

    let removed = detector.unregister_range(&0, &100)?;
    println!("unregistered {} watch(es); {} left", removed, detector.len());
    Ok(())
}
