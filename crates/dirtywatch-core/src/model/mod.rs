//! Watch state and change record types.

pub mod record;
pub mod watch;

pub use record::{
    AssociativeChangeRecord, ChangeRecords, CollectionItem, MapEntry, ObjectChangeRecord,
    RecordChain, SequenceChangeRecord,
};
pub use watch::{
    AssociativeWatch, MapSnapshot, MapSnapshotEntry, ScalarWatch, SequenceWatch, SnapshotItem,
    Watch, WatchKind, WatchState,
};
