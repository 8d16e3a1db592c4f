//! Sequence dirty checker.
//!
//! Diffs the last snapshot of an ordered collection against its current
//! contents using identity only, in O(old + new) time.
//!
//! Old positions are bucketed by identity into FIFO queues, so the k-th
//! occurrence of a value in the new sequence is matched with the k-th
//! unconsumed occurrence in the old one. While scanning the new sequence an
//! `expected` cursor tracks the lowest old position that has been matched
//! but not yet placed. A match at the cursor is "in place"; a match anywhere
//! else is a move. Unmatched new items are additions and unmatched old items
//! are removals.
//!
//! Only the displaced set is reported as moved: `[x, y, z] -> [z, x, y]`
//! moves `z` alone, while `x` and `y` keep their relative order.

use std::collections::{HashMap, VecDeque};

use crate::access::{collect_items, SequenceAccess};
use crate::identity::Identity;
use crate::model::record::CollectionItem;
use crate::model::watch::{SequenceWatch, SnapshotItem};

/// Result of diffing one sequence watch.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceChange<V> {
    /// Items absent before, in ascending current index.
    pub(crate) additions: Vec<CollectionItem<V>>,
    /// Items absent now, in ascending previous index.
    pub(crate) removals: Vec<CollectionItem<V>>,
    /// Persisting items pulled out of order, in ascending current index.
    pub(crate) moved: Vec<CollectionItem<V>>,
    pub(crate) previous_len: usize,
    pub(crate) current_len: usize,
}

impl<V> SequenceChange<V> {
    pub fn additions(&self) -> &[CollectionItem<V>] {
        &self.additions
    }

    pub fn removals(&self) -> &[CollectionItem<V>] {
        &self.removals
    }

    pub fn moved(&self) -> &[CollectionItem<V>] {
        &self.moved
    }

    pub fn previous_len(&self) -> usize {
        self.previous_len
    }

    pub fn current_len(&self) -> usize {
        self.current_len
    }

    /// True when the diff carries no entries at all.
    pub fn is_empty(&self) -> bool {
        self.additions.is_empty() && self.removals.is_empty() && self.moved.is_empty()
    }
}

impl<V: Clone> SequenceChange<V> {
    /// Rebuild the current sequence from the previous one.
    ///
    /// Additions and moves are written at their current index; the remaining
    /// (in place) previous items fill the other slots in their old order.
    /// Returns `None` if `previous` is not the sequence this change was
    /// computed against.
    pub fn apply_to(&self, previous: &[V]) -> Option<Vec<V>> {
        if previous.len() != self.previous_len {
            return None;
        }
        let mut displaced = vec![false; previous.len()];
        let mut slots: Vec<Option<V>> = vec![None; self.current_len];
        for entry in &self.removals {
            *displaced.get_mut(entry.previous_index?)? = true;
        }
        for entry in &self.moved {
            *displaced.get_mut(entry.previous_index?)? = true;
            *slots.get_mut(entry.current_index?)? = Some(entry.item.clone());
        }
        for entry in &self.additions {
            *slots.get_mut(entry.current_index?)? = Some(entry.item.clone());
        }

        let mut in_place = previous
            .iter()
            .zip(&displaced)
            .filter(|(_, displaced)| !**displaced)
            .map(|(item, _)| item.clone());
        let rebuilt: Option<Vec<V>> = slots
            .into_iter()
            .map(|slot| slot.or_else(|| in_place.next()))
            .collect();
        if in_place.next().is_some() {
            return None;
        }
        rebuilt
    }
}

/// Per old position bookkeeping for the placement scan.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Slot {
    /// Never matched; becomes a removal.
    Unmatched,
    /// Matched by some new item that has not been reached yet.
    Pending,
    /// Matched and already emitted (in place or moved).
    Placed,
}

fn next_expected(mut cursor: usize, slots: &[Slot]) -> usize {
    while cursor < slots.len() && slots[cursor] != Slot::Pending {
        cursor += 1;
    }
    cursor
}

/// Diff a previous snapshot against the current items.
pub fn diff_sequence<V: Identity>(previous: &[SnapshotItem<V>], current: &[V]) -> SequenceChange<V> {
    let mut queues: HashMap<V::Key, VecDeque<usize>> = HashMap::with_capacity(previous.len());
    for (position, item) in previous.iter().enumerate() {
        queues.entry(item.key).or_default().push_back(position);
    }

    let mut slots = vec![Slot::Unmatched; previous.len()];
    let matches: Vec<Option<usize>> = current
        .iter()
        .map(|item| {
            let matched = queues
                .get_mut(&item.identity_key())
                .and_then(VecDeque::pop_front);
            if let Some(position) = matched {
                slots[position] = Slot::Pending;
            }
            matched
        })
        .collect();

    let mut additions = Vec::new();
    let mut moved = Vec::new();
    let mut expected = next_expected(0, &slots);
    for (current_index, (item, matched)) in current.iter().zip(matches).enumerate() {
        match matched {
            None => additions.push(CollectionItem::added(item.clone(), current_index)),
            Some(previous_index) => {
                slots[previous_index] = Slot::Placed;
                if previous_index != expected {
                    moved.push(CollectionItem::moved(
                        item.clone(),
                        previous_index,
                        current_index,
                    ));
                }
                expected = next_expected(expected, &slots);
            }
        }
    }

    let removals = previous
        .iter()
        .enumerate()
        .filter(|(position, _)| slots[*position] == Slot::Unmatched)
        .map(|(position, item)| CollectionItem::removed(item.value.clone(), position))
        .collect();

    SequenceChange {
        additions,
        removals,
        moved,
        previous_len: previous.len(),
        current_len: current.len(),
    }
}

/// Whether the collection still holds exactly the snapshot, position by
/// position. Allocates nothing.
fn matches_snapshot<V: Identity>(collection: &dyn SequenceAccess<V>, snapshot: &[SnapshotItem<V>]) -> bool {
    let mut seen = 0usize;
    let mut same = true;
    collection.visit_items(&mut |item| {
        if same {
            same = snapshot
                .get(seen)
                .is_some_and(|previous| previous.key == item.identity_key());
        }
        seen += 1;
    });
    same && seen == snapshot.len()
}

/// Check one sequence watch, updating its snapshot only when a change is
/// reported.
///
/// An unread watch diffs against an empty snapshot and always reports,
/// even for an empty collection, so the consumer sees the initial state.
pub fn check<V: Identity>(watch: &mut SequenceWatch<V>) -> Option<SequenceChange<V>> {
    let change = match watch.last_snapshot.as_deref() {
        Some(snapshot) => {
            if matches_snapshot(watch.collection.as_ref(), snapshot) {
                return None;
            }
            let current = collect_items(watch.collection.as_ref());
            let change = diff_sequence(snapshot, &current);
            if change.is_empty() {
                return None;
            }
            watch.last_snapshot = Some(SnapshotItem::snapshot_of(current));
            change
        }
        None => {
            let current = collect_items(watch.collection.as_ref());
            let change = diff_sequence(&[], &current);
            watch.last_snapshot = Some(SnapshotItem::snapshot_of(current));
            change
        }
    };
    tracing::trace!(
        additions = change.additions.len(),
        removals = change.removals.len(),
        moved = change.moved.len(),
        "sequence changed"
    );
    Some(change)
}
