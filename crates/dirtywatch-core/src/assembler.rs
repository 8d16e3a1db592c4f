//! Change record assembly.
//!
//! One ascending walk over the index per cycle. Each watch is handed to the
//! checker for its kind and any change is appended to the tail of the chain
//! for that kind, so every chain comes out in ascending ID order without
//! sorting.

use std::hash::Hash;

use dirtywatch_core_types::CycleId;

use crate::check::{associative, scalar, sequence};
use crate::identity::Identity;
use crate::index::OrderedWatchIndex;
use crate::model::record::{
    AssociativeChangeRecord, ChangeRecords, ObjectChangeRecord, RecordChain, SequenceChangeRecord,
};
use crate::model::watch::{Watch, WatchState};

/// Collects the records of one cycle.
pub struct ChangeRecordAssembler<I, H, V, K> {
    cycle: CycleId,
    objects: RecordChain<ObjectChangeRecord<I, H, V>>,
    sequences: RecordChain<SequenceChangeRecord<I, H, V>>,
    maps: RecordChain<AssociativeChangeRecord<I, H, K, V>>,
}

impl<I, H, V, K> ChangeRecordAssembler<I, H, V, K>
where
    I: Ord + Clone,
    H: Clone,
    V: Identity,
    K: Eq + Hash + Clone,
{
    pub fn new(cycle: CycleId) -> Self {
        Self {
            cycle,
            objects: RecordChain::new(),
            sequences: RecordChain::new(),
            maps: RecordChain::new(),
        }
    }

    /// Check one watch. Must be called in ascending ID order.
    pub fn visit(&mut self, id: &I, watch: &mut Watch<H, V, K>) {
        match &mut watch.state {
            WatchState::Scalar(state) => {
                if let Some(change) = scalar::check(state) {
                    self.objects.push(ObjectChangeRecord::new(
                        id.clone(),
                        watch.handler.clone(),
                        state.container.clone(),
                        state.field.clone(),
                        change,
                    ));
                }
            }
            WatchState::Sequence(state) => {
                if let Some(change) = sequence::check(state) {
                    self.sequences.push(SequenceChangeRecord::new(
                        id.clone(),
                        watch.handler.clone(),
                        state.collection.clone(),
                        change,
                    ));
                }
            }
            WatchState::Associative(state) => {
                if let Some(change) = associative::check(state) {
                    self.maps.push(AssociativeChangeRecord::new(
                        id.clone(),
                        watch.handler.clone(),
                        state.collection.clone(),
                        change,
                    ));
                }
            }
        }
    }

    /// Walk the whole index.
    pub fn visit_all(&mut self, index: &mut OrderedWatchIndex<I, Watch<H, V, K>>) {
        for (id, watch) in index.iter_mut() {
            self.visit(id, watch);
        }
    }

    pub fn finish(self) -> ChangeRecords<I, H, V, K> {
        ChangeRecords::new(self.cycle, self.objects, self.sequences, self.maps)
    }
}
