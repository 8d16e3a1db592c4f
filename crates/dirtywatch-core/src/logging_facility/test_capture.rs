//! In-memory event capture for logging assertions
//!
//! Every event is recorded with its correlation fields lifted out
//! (`detector_id`, `watch_id`, `cycle`), so a test can select exactly the
//! events its own detector produced even when other tests log concurrently
//! into the same global capture.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock};

use dirtywatch_core_types::schema::{
    FIELD_CYCLE, FIELD_DETECTOR_ID, FIELD_ERROR, FIELD_ERR_CODE, FIELD_EVENT, FIELD_OP,
    FIELD_WATCH_ID,
};
use dirtywatch_core_types::{CycleId, DetectorId};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

/// One recorded event
#[derive(Clone, Debug)]
pub struct CapturedEvent {
    pub level: Level,
    /// Module that emitted the event (the `tracing` target)
    pub target: String,
    pub op: Option<String>,
    pub event: Option<String>,
    pub detector_id: Option<String>,
    /// `Debug` rendering of the watch ID, as the facade logs it
    pub watch_id: Option<String>,
    pub cycle: Option<u64>,
    /// Every field of the event, correlation fields included
    pub fields: BTreeMap<String, String>,
}

impl CapturedEvent {
    fn from_fields(level: Level, target: &str, fields: BTreeMap<String, String>) -> Self {
        let take = |key: &str| fields.get(key).cloned();
        Self {
            level,
            target: target.to_string(),
            op: take(FIELD_OP),
            event: take(FIELD_EVENT),
            detector_id: take(FIELD_DETECTOR_ID),
            watch_id: take(FIELD_WATCH_ID),
            cycle: fields.get(FIELD_CYCLE).and_then(|c| c.parse().ok()),
            fields,
        }
    }

    /// Value of any field by name
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Stable error code of an `end_error` event
    pub fn err_code(&self) -> Option<&str> {
        self.field(FIELD_ERR_CODE)
    }

    /// Rendered canonical error of an `end_error` event
    pub fn error(&self) -> Option<&str> {
        self.field(FIELD_ERROR)
    }

    fn is(&self, op: &str, event: &str) -> bool {
        self.op.as_deref() == Some(op) && self.event.as_deref() == Some(event)
    }
}

/// Collects fields as strings. Integers and bools go through their `Debug`
/// impls, which print the same as `Display`.
struct FieldCollector(BTreeMap<String, String>);

impl Visit for FieldCollector {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.0.insert(field.name().to_string(), format!("{:?}", value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(field.name().to_string(), value.to_string());
    }
}

type Shared = Arc<Mutex<Vec<CapturedEvent>>>;

/// Layer that appends every event to a shared buffer
pub struct TestCaptureLayer {
    events: Shared,
}

impl TestCaptureLayer {
    /// Create a layer and the handle that reads what it records
    pub fn new() -> (Self, TestCapture) {
        let events = Shared::default();
        (
            Self {
                events: events.clone(),
            },
            TestCapture { events },
        )
    }
}

impl<S> Layer<S> for TestCaptureLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut collector = FieldCollector(BTreeMap::new());
        event.record(&mut collector);
        let metadata = event.metadata();
        let captured =
            CapturedEvent::from_fields(*metadata.level(), metadata.target(), collector.0);
        if let Ok(mut events) = self.events.lock() {
            events.push(captured);
        }
    }
}

/// Read handle over captured events
#[derive(Clone)]
pub struct TestCapture {
    events: Shared,
}

impl TestCapture {
    /// Snapshot of every captured event, in emission order
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Events for one operation and event name, from any source
    pub fn events_for(&self, op: &str, event: &str) -> Vec<CapturedEvent> {
        self.events().into_iter().filter(|e| e.is(op, event)).collect()
    }

    /// Every event one detector emitted, in emission order
    pub fn events_for_detector(&self, detector_id: &DetectorId) -> Vec<CapturedEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.detector_id.as_deref() == Some(detector_id.as_str()))
            .collect()
    }

    /// Events one detector emitted for `op`/`event`
    pub fn detector_events(
        &self,
        detector_id: &DetectorId,
        op: &str,
        event: &str,
    ) -> Vec<CapturedEvent> {
        self.events_for_detector(detector_id)
            .into_iter()
            .filter(|e| e.is(op, event))
            .collect()
    }

    /// Events one detector emitted about a single watch
    pub fn events_for_watch(&self, detector_id: &DetectorId, watch_id: &str) -> Vec<CapturedEvent> {
        self.events_for_detector(detector_id)
            .into_iter()
            .filter(|e| e.watch_id.as_deref() == Some(watch_id))
            .collect()
    }

    /// Assert the detector emitted exactly one `op`/`event` and return it.
    ///
    /// # Panics
    ///
    /// Panics if there are zero or several matching events.
    #[track_caller]
    pub fn assert_single_for_detector(
        &self,
        detector_id: &DetectorId,
        op: &str,
        event: &str,
    ) -> CapturedEvent {
        let mut matches = self.detector_events(detector_id, op, event);
        assert_eq!(
            matches.len(),
            1,
            "expected one {}/{} event for detector {}, found {}",
            op,
            event,
            detector_id,
            matches.len()
        );
        matches.remove(0)
    }

    /// Assert the detector emitted `op`/`event` during `cycle`.
    ///
    /// # Panics
    ///
    /// Panics if no such event was captured.
    #[track_caller]
    pub fn assert_cycle_event(
        &self,
        detector_id: &DetectorId,
        cycle: CycleId,
        op: &str,
        event: &str,
    ) {
        let found = self
            .detector_events(detector_id, op, event)
            .iter()
            .any(|e| e.cycle == Some(cycle.value()));
        assert!(
            found,
            "no {}/{} event for detector {} in {}",
            op, event, detector_id, cycle
        );
    }

    /// Drop everything captured so far
    pub fn clear(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }
}

static GLOBAL_CAPTURE: OnceLock<TestCapture> = OnceLock::new();

/// Install the capture layer as the global subscriber (once per test binary)
/// and return a handle to it.
///
/// Tests in one binary share the handle, so assertions should select by
/// detector ID rather than look at every event.
///
/// # Example
///
/// ```
/// use dirtywatch_core::logging_facility::init_test_capture;
/// use dirtywatch_core::schema::{EVENT_END, OP_RUN_CYCLE};
/// use dirtywatch_core::ChangeDetector;
///
/// let capture = init_test_capture();
/// let mut detector: ChangeDetector<u32, (), u32> = ChangeDetector::new();
/// detector.run_cycle();
///
/// let end = capture.assert_single_for_detector(detector.detector_id(), OP_RUN_CYCLE, EVENT_END);
/// assert_eq!(end.cycle, Some(1));
/// ```
pub fn init_test_capture() -> TestCapture {
    GLOBAL_CAPTURE
        .get_or_init(|| {
            let (layer, capture) = TestCaptureLayer::new();
            // Another subscriber may already be global in this binary
            let _ = tracing_subscriber::registry().with(layer).try_init();
            capture
        })
        .clone()
}
