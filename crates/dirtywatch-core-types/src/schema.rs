//! Canonical schema constants for structured logging and events
//!
//! These constants ensure consistency across all logging and error reporting.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";

// Correlation
pub const FIELD_DETECTOR_ID: &str = "detector_id";
pub const FIELD_DOMAIN: &str = "domain";
pub const FIELD_CYCLE: &str = "cycle";

// Watch identifiers
pub const FIELD_WATCH_ID: &str = "watch_id";
pub const FIELD_WATCH_KIND: &str = "watch_kind";

// Collection sizes
pub const FIELD_WATCH_COUNT: &str = "watch_count";
pub const FIELD_OBJECT_RECORDS: &str = "object_records";
pub const FIELD_SEQUENCE_RECORDS: &str = "sequence_records";
pub const FIELD_MAP_RECORDS: &str = "map_records";
pub const FIELD_REMOVED: &str = "removed";

// Error fields
pub const FIELD_ERR_KIND: &str = "err.kind";
pub const FIELD_ERR_CODE: &str = "err.code";
pub const FIELD_ERROR: &str = "error";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";

// Canonical operation names
pub const OP_REGISTER: &str = "register_watch";
pub const OP_RUN_CYCLE: &str = "run_cycle";
pub const OP_UNREGISTER_RANGE: &str = "unregister_range";
