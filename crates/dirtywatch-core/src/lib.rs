//! DirtyWatch Core - dirty-checking change detection
//!
//! This crate watches in-memory state and reports what changed between
//! polling cycles:
//! - Scalar watches on one field of a container
//! - Sequence watches with additions, removals and minimal moves
//! - Associative watches with per-key additions and removals
//! - An ordered watch index with O(log n + k) range unregistration
//! - Change records grouped per kind, in ascending watch ID order
//!
//! Values are compared by identity (see [`identity::Identity`]), never by
//! structural equality. Scheduling is up to the caller: call
//! [`ChangeDetector::run_cycle`] whenever a poll is due.

pub mod access;
pub mod assembler;
pub mod check;
pub mod config;
pub mod detector;
pub mod errors;
pub mod identity;
pub mod index;
pub mod logging_facility;
pub mod model;

pub use dirtywatch_core_types::schema;

// Re-export commonly used types
pub use access::{FieldAccess, FieldSelector, MapAccess, SequenceAccess};
pub use config::{Baseline, DetectorConfig};
pub use detector::{ChangeDetector, UnregisterHandle};
pub use errors::{DirtyWatchError, ExError, ExErrorKind, Result};
pub use identity::Identity;
pub use index::OrderedWatchIndex;
pub use model::{
    AssociativeChangeRecord, ChangeRecords, CollectionItem, MapEntry, ObjectChangeRecord,
    RecordChain, SequenceChangeRecord, WatchKind,
};
