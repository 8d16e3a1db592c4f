//! Associative dirty checker.
//!
//! Keys are matched by `Eq`/`Hash`; values are compared by identity. A key
//! whose value changed is reported twice: once in `removals` with the old
//! value and once in `additions` with the new one.
//!
//! Removals follow the previous snapshot's order, additions follow the
//! current enumeration order, so output is deterministic whenever the
//! collection enumerates deterministically.

use std::hash::Hash;

use crate::access::{collect_entries, MapAccess};
use crate::identity::Identity;
use crate::model::record::MapEntry;
use crate::model::watch::{AssociativeWatch, MapSnapshot};

/// Result of diffing one associative watch.
#[derive(Debug, Clone, PartialEq)]
pub struct MapChange<K, V> {
    pub(crate) additions: Vec<MapEntry<K, V>>,
    pub(crate) removals: Vec<MapEntry<K, V>>,
}

impl<K, V> MapChange<K, V> {
    /// New keys and changed keys, carrying the current value.
    pub fn additions(&self) -> &[MapEntry<K, V>] {
        &self.additions
    }

    /// Vanished keys and changed keys, carrying the previous value.
    pub fn removals(&self) -> &[MapEntry<K, V>] {
        &self.removals
    }

    pub fn is_empty(&self) -> bool {
        self.additions.is_empty() && self.removals.is_empty()
    }
}

impl<K: Eq, V> MapChange<K, V> {
    /// Keys present in both buckets, i.e. whose value changed identity.
    pub fn changed_keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.additions
            .iter()
            .map(|entry| &entry.key)
            .filter(|key| self.removals.iter().any(|removed| removed.key == **key))
    }
}

/// Diff two snapshots of the same collection.
pub fn diff_map<K, V>(previous: &MapSnapshot<K, V>, current: &MapSnapshot<K, V>) -> MapChange<K, V>
where
    K: Eq + Hash + Clone,
    V: Identity,
{
    let removals = previous
        .iter()
        .filter(|old| {
            current
                .get(&old.key)
                .map_or(true, |new| new.identity != old.identity)
        })
        .map(|old| MapEntry::new(old.key.clone(), old.value.clone()))
        .collect();

    let additions = current
        .iter()
        .filter(|new| {
            previous
                .get(&new.key)
                .map_or(true, |old| old.identity != new.identity)
        })
        .map(|new| MapEntry::new(new.key.clone(), new.value.clone()))
        .collect();

    MapChange {
        additions,
        removals,
    }
}

/// Whether the collection still holds exactly the snapshot. Allocates nothing.
fn matches_snapshot<K, V>(collection: &dyn MapAccess<K, V>, snapshot: &MapSnapshot<K, V>) -> bool
where
    K: Eq + Hash + Clone,
    V: Identity,
{
    let mut seen = 0usize;
    let mut same = true;
    collection.visit_entries(&mut |key, value| {
        if same {
            same = snapshot
                .get(key)
                .is_some_and(|entry| entry.identity == value.identity_key());
        }
        seen += 1;
    });
    same && seen == snapshot.len()
}

/// Check one associative watch, updating its snapshot only when a change is
/// reported. An unread watch reports every entry as an addition, and reports
/// once even when the map is empty so the first read is always observable.
pub fn check<K, V>(watch: &mut AssociativeWatch<K, V>) -> Option<MapChange<K, V>>
where
    K: Eq + Hash + Clone,
    V: Identity,
{
    if let Some(snapshot) = &watch.last_snapshot {
        if matches_snapshot(watch.collection.as_ref(), snapshot) {
            return None;
        }
    }
    let current = MapSnapshot::from_entries(collect_entries(watch.collection.as_ref()));
    let change = match &watch.last_snapshot {
        Some(previous) => {
            let change = diff_map(previous, &current);
            if change.is_empty() {
                return None;
            }
            change
        }
        None => diff_map(&MapSnapshot::default(), &current),
    };
    tracing::trace!(
        additions = change.additions.len(),
        removals = change.removals.len(),
        "map changed"
    );
    watch.last_snapshot = Some(current);
    Some(change)
}
