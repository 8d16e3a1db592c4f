//! Change records produced by one cycle.
//!
//! Records are snapshots: they own clones of the values involved and stay
//! readable after later cycles, but they describe only the cycle that
//! produced them.

use std::fmt;
use std::rc::Rc;

use dirtywatch_core_types::CycleId;

use crate::access::{FieldAccess, FieldSelector, MapAccess, SequenceAccess};
use crate::check::{MapChange, ObjectChange, SequenceChange};

/// One entry of a sequence diff.
///
/// Additions have no `previous_index`, removals have no `current_index`,
/// moves have both.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionItem<V> {
    pub(crate) item: V,
    pub(crate) previous_index: Option<usize>,
    pub(crate) current_index: Option<usize>,
}

impl<V> CollectionItem<V> {
    pub(crate) fn added(item: V, current_index: usize) -> Self {
        Self {
            item,
            previous_index: None,
            current_index: Some(current_index),
        }
    }

    pub(crate) fn removed(item: V, previous_index: usize) -> Self {
        Self {
            item,
            previous_index: Some(previous_index),
            current_index: None,
        }
    }

    pub(crate) fn moved(item: V, previous_index: usize, current_index: usize) -> Self {
        Self {
            item,
            previous_index: Some(previous_index),
            current_index: Some(current_index),
        }
    }

    pub fn item(&self) -> &V {
        &self.item
    }

    pub fn previous_index(&self) -> Option<usize> {
        self.previous_index
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }
}

/// One key/value pair of a map diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapEntry<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
}

impl<K, V> MapEntry<K, V> {
    pub(crate) fn new(key: K, value: V) -> Self {
        Self { key, value }
    }

    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn value(&self) -> &V {
        &self.value
    }
}

/// A scalar watch whose field changed identity.
pub struct ObjectChangeRecord<I, H, V> {
    id: I,
    handler: H,
    container: Rc<dyn FieldAccess<V>>,
    field: FieldSelector,
    change: ObjectChange<V>,
}

impl<I, H, V> ObjectChangeRecord<I, H, V> {
    pub(crate) fn new(
        id: I,
        handler: H,
        container: Rc<dyn FieldAccess<V>>,
        field: FieldSelector,
        change: ObjectChange<V>,
    ) -> Self {
        Self {
            id,
            handler,
            container,
            field,
            change,
        }
    }

    pub fn id(&self) -> &I {
        &self.id
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// The watched container.
    pub fn container(&self) -> &Rc<dyn FieldAccess<V>> {
        &self.container
    }

    pub fn field(&self) -> &FieldSelector {
        &self.field
    }

    /// Value seen at the end of the previous cycle; `None` if the watch was
    /// never read before.
    pub fn previous_value(&self) -> Option<&V> {
        self.change.previous_value()
    }

    pub fn current_value(&self) -> &V {
        self.change.current_value()
    }
}

impl<I: fmt::Debug, H: fmt::Debug, V: fmt::Debug> fmt::Debug for ObjectChangeRecord<I, H, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectChangeRecord")
            .field("id", &self.id)
            .field("handler", &self.handler)
            .field("field", &self.field)
            .field("previous_value", &self.change.previous_value)
            .field("current_value", &self.change.current_value)
            .finish_non_exhaustive()
    }
}

/// A sequence watch whose contents or order changed.
pub struct SequenceChangeRecord<I, H, V> {
    id: I,
    handler: H,
    collection: Rc<dyn SequenceAccess<V>>,
    change: SequenceChange<V>,
}

impl<I, H, V> SequenceChangeRecord<I, H, V> {
    pub(crate) fn new(
        id: I,
        handler: H,
        collection: Rc<dyn SequenceAccess<V>>,
        change: SequenceChange<V>,
    ) -> Self {
        Self {
            id,
            handler,
            collection,
            change,
        }
    }

    pub fn id(&self) -> &I {
        &self.id
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// The watched collection.
    pub fn collection(&self) -> &Rc<dyn SequenceAccess<V>> {
        &self.collection
    }

    pub fn additions(&self) -> &[CollectionItem<V>] {
        self.change.additions()
    }

    pub fn removals(&self) -> &[CollectionItem<V>] {
        self.change.removals()
    }

    pub fn moved(&self) -> &[CollectionItem<V>] {
        self.change.moved()
    }

    pub fn previous_len(&self) -> usize {
        self.change.previous_len()
    }

    pub fn current_len(&self) -> usize {
        self.change.current_len()
    }

    pub fn change(&self) -> &SequenceChange<V> {
        &self.change
    }
}

impl<I, H, V: Clone> SequenceChangeRecord<I, H, V> {
    /// See [`SequenceChange::apply_to`].
    pub fn apply_to(&self, previous: &[V]) -> Option<Vec<V>> {
        self.change.apply_to(previous)
    }
}

impl<I: fmt::Debug, H: fmt::Debug, V: fmt::Debug> fmt::Debug for SequenceChangeRecord<I, H, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SequenceChangeRecord")
            .field("id", &self.id)
            .field("handler", &self.handler)
            .field("change", &self.change)
            .finish_non_exhaustive()
    }
}

/// An associative watch whose entries changed.
pub struct AssociativeChangeRecord<I, H, K, V> {
    id: I,
    handler: H,
    collection: Rc<dyn MapAccess<K, V>>,
    change: MapChange<K, V>,
}

impl<I, H, K, V> AssociativeChangeRecord<I, H, K, V> {
    pub(crate) fn new(
        id: I,
        handler: H,
        collection: Rc<dyn MapAccess<K, V>>,
        change: MapChange<K, V>,
    ) -> Self {
        Self {
            id,
            handler,
            collection,
            change,
        }
    }

    pub fn id(&self) -> &I {
        &self.id
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// The watched collection.
    pub fn collection(&self) -> &Rc<dyn MapAccess<K, V>> {
        &self.collection
    }

    pub fn additions(&self) -> &[MapEntry<K, V>] {
        self.change.additions()
    }

    pub fn removals(&self) -> &[MapEntry<K, V>] {
        self.change.removals()
    }

    pub fn change(&self) -> &MapChange<K, V> {
        &self.change
    }
}

impl<I, H, K: Eq, V> AssociativeChangeRecord<I, H, K, V> {
    /// See [`MapChange::changed_keys`].
    pub fn changed_keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.change.changed_keys()
    }
}

impl<I: fmt::Debug, H: fmt::Debug, K: fmt::Debug, V: fmt::Debug> fmt::Debug
    for AssociativeChangeRecord<I, H, K, V>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssociativeChangeRecord")
            .field("id", &self.id)
            .field("handler", &self.handler)
            .field("change", &self.change)
            .finish_non_exhaustive()
    }
}

/// Records of one kind, in ascending watch-ID order.
///
/// Appending only ever happens at the tail, during a single ascending walk
/// of the index.
pub struct RecordChain<R> {
    records: Vec<R>,
}

impl<R> RecordChain<R> {
    pub(crate) fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, record: R) {
        self.records.push(record);
    }

    /// First (lowest ID) record, if any.
    pub fn head(&self) -> Option<&R> {
        self.records.first()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, R> {
        self.records.iter()
    }

    pub fn as_slice(&self) -> &[R] {
        &self.records
    }
}

impl<R: fmt::Debug> fmt::Debug for RecordChain<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.records).finish()
    }
}

impl<'a, R> IntoIterator for &'a RecordChain<R> {
    type Item = &'a R;
    type IntoIter = std::slice::Iter<'a, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl<R> IntoIterator for RecordChain<R> {
    type Item = R;
    type IntoIter = std::vec::IntoIter<R>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

/// Everything one cycle detected, split by watch kind.
pub struct ChangeRecords<I, H, V, K> {
    cycle: CycleId,
    objects: RecordChain<ObjectChangeRecord<I, H, V>>,
    sequences: RecordChain<SequenceChangeRecord<I, H, V>>,
    maps: RecordChain<AssociativeChangeRecord<I, H, K, V>>,
}

impl<I, H, V, K> ChangeRecords<I, H, V, K> {
    pub(crate) fn new(
        cycle: CycleId,
        objects: RecordChain<ObjectChangeRecord<I, H, V>>,
        sequences: RecordChain<SequenceChangeRecord<I, H, V>>,
        maps: RecordChain<AssociativeChangeRecord<I, H, K, V>>,
    ) -> Self {
        Self {
            cycle,
            objects,
            sequences,
            maps,
        }
    }

    /// Cycle that produced these records.
    pub fn cycle(&self) -> CycleId {
        self.cycle
    }

    /// Scalar field changes.
    pub fn objects(&self) -> &RecordChain<ObjectChangeRecord<I, H, V>> {
        &self.objects
    }

    /// Sequence changes.
    pub fn sequences(&self) -> &RecordChain<SequenceChangeRecord<I, H, V>> {
        &self.sequences
    }

    /// Associative collection changes.
    pub fn maps(&self) -> &RecordChain<AssociativeChangeRecord<I, H, K, V>> {
        &self.maps
    }

    /// Total number of records across the three chains.
    pub fn len(&self) -> usize {
        self.objects.len() + self.sequences.len() + self.maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Split into the three chains.
    #[allow(clippy::type_complexity)]
    pub fn into_parts(
        self,
    ) -> (
        RecordChain<ObjectChangeRecord<I, H, V>>,
        RecordChain<SequenceChangeRecord<I, H, V>>,
        RecordChain<AssociativeChangeRecord<I, H, K, V>>,
    ) {
        (self.objects, self.sequences, self.maps)
    }
}

impl<I: Clone, H, V, K> ChangeRecords<I, H, V, K> {
    /// IDs of the scalar records, in chain order.
    pub fn object_ids(&self) -> Vec<I> {
        self.objects.iter().map(|r| r.id.clone()).collect()
    }

    /// IDs of the sequence records, in chain order.
    pub fn sequence_ids(&self) -> Vec<I> {
        self.sequences.iter().map(|r| r.id.clone()).collect()
    }

    /// IDs of the associative records, in chain order.
    pub fn map_ids(&self) -> Vec<I> {
        self.maps.iter().map(|r| r.id.clone()).collect()
    }
}

impl<I: fmt::Debug, H: fmt::Debug, V: fmt::Debug, K: fmt::Debug> fmt::Debug
    for ChangeRecords<I, H, V, K>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeRecords")
            .field("cycle", &self.cycle)
            .field("objects", &self.objects)
            .field("sequences", &self.sequences)
            .field("maps", &self.maps)
            .finish()
    }
}
