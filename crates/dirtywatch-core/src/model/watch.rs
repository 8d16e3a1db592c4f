//! Watch records: what each kind of watch remembers between cycles.
//!
//! Only the matching dirty checker mutates a watch's snapshot. Everything
//! else about a watch is fixed at registration.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::rc::Rc;

use crate::access::{collect_entries, collect_items, FieldAccess, FieldSelector, MapAccess, SequenceAccess};
use crate::config::Baseline;
use crate::identity::Identity;

/// The three kinds of watch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WatchKind {
    Scalar,
    Sequence,
    Associative,
}

impl WatchKind {
    /// Stable name used in log fields
    pub fn as_str(&self) -> &'static str {
        match self {
            WatchKind::Scalar => "scalar",
            WatchKind::Sequence => "sequence",
            WatchKind::Associative => "associative",
        }
    }
}

impl fmt::Display for WatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registered watch, stored in the index under its ID.
pub struct Watch<H, V: Identity, K> {
    /// Registration number, unique per detector.
    pub(crate) serial: u64,
    pub(crate) handler: H,
    pub(crate) state: WatchState<V, K>,
}

impl<H, V: Identity, K> Watch<H, V, K> {
    pub(crate) fn new(serial: u64, handler: H, state: WatchState<V, K>) -> Self {
        Self {
            serial,
            handler,
            state,
        }
    }

    pub fn kind(&self) -> WatchKind {
        match self.state {
            WatchState::Scalar(_) => WatchKind::Scalar,
            WatchState::Sequence(_) => WatchKind::Sequence,
            WatchState::Associative(_) => WatchKind::Associative,
        }
    }
}

/// Per-kind watch state.
pub enum WatchState<V: Identity, K> {
    Scalar(ScalarWatch<V>),
    Sequence(SequenceWatch<V>),
    Associative(AssociativeWatch<K, V>),
}

/// A single field of a container.
pub struct ScalarWatch<V> {
    pub(crate) container: Rc<dyn FieldAccess<V>>,
    pub(crate) field: FieldSelector,
    /// `None` until the field has been read once.
    pub(crate) last_value: Option<V>,
}

impl<V: Identity> ScalarWatch<V> {
    pub fn new(container: Rc<dyn FieldAccess<V>>, field: FieldSelector, baseline: Baseline) -> Self {
        let last_value = match baseline {
            Baseline::Capture => Some(container.read_field(&field)),
            Baseline::Unread => None,
        };
        Self {
            container,
            field,
            last_value,
        }
    }

    pub fn field(&self) -> &FieldSelector {
        &self.field
    }

    pub fn last_value(&self) -> Option<&V> {
        self.last_value.as_ref()
    }
}

/// One element of a sequence snapshot: the value and its identity key.
#[derive(Debug, Clone)]
pub struct SnapshotItem<V: Identity> {
    pub(crate) key: V::Key,
    pub(crate) value: V,
}

impl<V: Identity> SnapshotItem<V> {
    pub fn of(value: V) -> Self {
        Self {
            key: value.identity_key(),
            value,
        }
    }

    pub fn snapshot_of(values: Vec<V>) -> Vec<Self> {
        values.into_iter().map(Self::of).collect()
    }

    pub fn value(&self) -> &V {
        &self.value
    }
}

/// An ordered collection.
pub struct SequenceWatch<V: Identity> {
    pub(crate) collection: Rc<dyn SequenceAccess<V>>,
    /// `None` until the collection has been read once.
    pub(crate) last_snapshot: Option<Vec<SnapshotItem<V>>>,
}

impl<V: Identity> SequenceWatch<V> {
    pub fn new(collection: Rc<dyn SequenceAccess<V>>, baseline: Baseline) -> Self {
        let last_snapshot = match baseline {
            Baseline::Capture => Some(SnapshotItem::snapshot_of(collect_items(collection.as_ref()))),
            Baseline::Unread => None,
        };
        Self {
            collection,
            last_snapshot,
        }
    }

    pub fn last_snapshot(&self) -> Option<&[SnapshotItem<V>]> {
        self.last_snapshot.as_deref()
    }
}

/// One entry of a map snapshot.
#[derive(Debug, Clone)]
pub struct MapSnapshotEntry<K, V: Identity> {
    pub(crate) key: K,
    pub(crate) identity: V::Key,
    pub(crate) value: V,
}

impl<K, V: Identity> MapSnapshotEntry<K, V> {
    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn value(&self) -> &V {
        &self.value
    }
}

/// Key/value snapshot that keeps enumeration order and offers O(1) lookup.
#[derive(Debug, Clone)]
pub struct MapSnapshot<K, V: Identity> {
    entries: Vec<MapSnapshotEntry<K, V>>,
    positions: HashMap<K, usize>,
}

impl<K: Eq + Hash + Clone, V: Identity> MapSnapshot<K, V> {
    /// Build from enumerated pairs. A repeated key keeps its first position
    /// and its last value.
    pub fn from_entries(pairs: Vec<(K, V)>) -> Self {
        let mut entries: Vec<MapSnapshotEntry<K, V>> = Vec::with_capacity(pairs.len());
        let mut positions = HashMap::with_capacity(pairs.len());
        for (key, value) in pairs {
            let entry = MapSnapshotEntry {
                key: key.clone(),
                identity: value.identity_key(),
                value,
            };
            match positions.get(&key) {
                Some(&position) => entries[position] = entry,
                None => {
                    positions.insert(key, entries.len());
                    entries.push(entry);
                }
            }
        }
        Self { entries, positions }
    }

    pub fn get(&self, key: &K) -> Option<&MapSnapshotEntry<K, V>> {
        self.positions.get(key).map(|&position| &self.entries[position])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MapSnapshotEntry<K, V>> {
        self.entries.iter()
    }
}

impl<K, V: Identity> Default for MapSnapshot<K, V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            positions: HashMap::new(),
        }
    }
}

/// A key/value collection.
pub struct AssociativeWatch<K, V: Identity> {
    pub(crate) collection: Rc<dyn MapAccess<K, V>>,
    /// `None` until the collection has been read once.
    pub(crate) last_snapshot: Option<MapSnapshot<K, V>>,
}

impl<K: Eq + Hash + Clone, V: Identity> AssociativeWatch<K, V> {
    pub fn new(collection: Rc<dyn MapAccess<K, V>>, baseline: Baseline) -> Self {
        let last_snapshot = match baseline {
            Baseline::Capture => Some(MapSnapshot::from_entries(collect_entries(collection.as_ref()))),
            Baseline::Unread => None,
        };
        Self {
            collection,
            last_snapshot,
        }
    }

    pub fn last_snapshot(&self) -> Option<&MapSnapshot<K, V>> {
        self.last_snapshot.as_ref()
    }
}
