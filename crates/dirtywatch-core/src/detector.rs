//! The change detector facade.
//!
//! Owns the watch index and is the only place boundary events are logged:
//! registration, cycles and range unregistration each emit a start/end pair
//! (or start/end_error).
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use dirtywatch_core::ChangeDetector;
//!
//! let items: Rc<RefCell<Vec<u32>>> = Rc::new(RefCell::new(vec![1, 2]));
//! let mut detector: ChangeDetector<u32, &str, u32> = ChangeDetector::new();
//! detector.register_sequence(items.clone(), 1, "items").unwrap();
//!
//! items.borrow_mut().push(3);
//! let records = detector.run_cycle();
//! assert_eq!(records.sequence_ids(), vec![1]);
//! assert!(detector.run_cycle().is_empty());
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;
use std::hash::Hash;
use std::rc::{Rc, Weak};
use std::time::Instant;

use dirtywatch_core_types::schema::{OP_REGISTER, OP_RUN_CYCLE, OP_UNREGISTER_RANGE};
use dirtywatch_core_types::{CycleId, DetectorId};

use crate::access::{FieldAccess, FieldSelector, MapAccess, SequenceAccess};
use crate::assembler::ChangeRecordAssembler;
use crate::config::{Baseline, DetectorConfig};
use crate::errors::{DirtyWatchError, ExError, Result};
use crate::identity::Identity;
use crate::index::OrderedWatchIndex;
use crate::model::record::ChangeRecords;
use crate::model::watch::{
    AssociativeWatch, ScalarWatch, SequenceWatch, Watch, WatchKind, WatchState,
};
use crate::{log_op_end, log_op_error, log_op_start};

type SharedIndex<I, H, V, K> = Rc<RefCell<OrderedWatchIndex<I, Watch<H, V, K>>>>;

/// Dirty-checking change detector.
///
/// `I` is the watch ID, `H` the opaque handler carried into records, `V` the
/// watched value type and `K` the key type of associative collections.
pub struct ChangeDetector<I, H, V: Identity, K = ()> {
    detector_id: DetectorId,
    config: DetectorConfig,
    watches: SharedIndex<I, H, V, K>,
    next_serial: u64,
    cycle: CycleId,
}

impl<I, H, V, K> ChangeDetector<I, H, V, K>
where
    I: Ord + Clone + fmt::Debug + 'static,
    H: Clone + 'static,
    V: Identity,
    K: Eq + Hash + Clone + 'static,
{
    pub fn new() -> Self {
        Self::with_config(DetectorConfig::default())
    }

    pub fn with_config(config: DetectorConfig) -> Self {
        Self {
            detector_id: DetectorId::new(),
            config,
            watches: Rc::new(RefCell::new(OrderedWatchIndex::new())),
            next_serial: 0,
            cycle: CycleId::new(0),
        }
    }

    /// Watch one field of a container.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateId` if `id` is already registered. The container is
    /// not read in that case.
    pub fn register_scalar(
        &mut self,
        container: Rc<dyn FieldAccess<V>>,
        id: I,
        handler: H,
        field: impl Into<FieldSelector>,
    ) -> Result<UnregisterHandle<I>> {
        let field = field.into();
        self.register(id, handler, WatchKind::Scalar, move |baseline| {
            WatchState::Scalar(ScalarWatch::new(container, field, baseline))
        })
    }

    /// Watch an ordered collection.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateId` if `id` is already registered.
    pub fn register_sequence(
        &mut self,
        collection: Rc<dyn SequenceAccess<V>>,
        id: I,
        handler: H,
    ) -> Result<UnregisterHandle<I>> {
        self.register(id, handler, WatchKind::Sequence, move |baseline| {
            WatchState::Sequence(SequenceWatch::new(collection, baseline))
        })
    }

    /// Watch a key/value collection.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateId` if `id` is already registered.
    pub fn register_associative(
        &mut self,
        collection: Rc<dyn MapAccess<K, V>>,
        id: I,
        handler: H,
    ) -> Result<UnregisterHandle<I>> {
        self.register(id, handler, WatchKind::Associative, move |baseline| {
            WatchState::Associative(AssociativeWatch::new(collection, baseline))
        })
    }

    fn register(
        &mut self,
        id: I,
        handler: H,
        kind: WatchKind,
        build: impl FnOnce(Baseline) -> WatchState<V, K>,
    ) -> Result<UnregisterHandle<I>> {
        log_op_start!(
            OP_REGISTER,
            detector_id = %self.detector_id,
            domain = %self.config.domain,
            watch_id = ?id,
            watch_kind = kind.as_str()
        );
        let start = Instant::now();

        let handle = self.insert_watch(id, handler, build).map_err(|e| {
            log_op_error!(
                OP_REGISTER,
                self.error_context(OP_REGISTER, e.clone()),
                duration_ms = start.elapsed().as_millis() as u64,
                detector_id = %self.detector_id,
                domain = %self.config.domain
            );
            e
        })?;

        log_op_end!(
            OP_REGISTER,
            duration_ms = start.elapsed().as_millis() as u64,
            detector_id = %self.detector_id,
            domain = %self.config.domain,
            watch_count = self.len()
        );
        Ok(handle)
    }

    fn insert_watch(
        &mut self,
        id: I,
        handler: H,
        build: impl FnOnce(Baseline) -> WatchState<V, K>,
    ) -> Result<UnregisterHandle<I>> {
        // Reject before the baseline read touches the container.
        if self.watches.borrow().contains(&id) {
            return Err(DirtyWatchError::duplicate_id(&id));
        }
        let state = build(self.config.baseline);

        let serial = self.next_serial;
        self.watches
            .borrow_mut()
            .insert(id.clone(), Watch::new(serial, handler, state))?;
        self.next_serial += 1;

        let registry = Rc::downgrade(&self.watches);
        let registry: Weak<dyn WatchRegistry<I>> = registry;
        Ok(UnregisterHandle {
            id,
            serial,
            registry,
            released: Cell::new(false),
        })
    }

    /// Check every watch in ascending ID order and return what changed.
    pub fn run_cycle(&mut self) -> ChangeRecords<I, H, V, K> {
        self.cycle = self.cycle.next();
        let cycle = self.cycle;
        let mut index = self.watches.borrow_mut();
        log_op_start!(
            OP_RUN_CYCLE,
            detector_id = %self.detector_id,
            domain = %self.config.domain,
            cycle = cycle.value(),
            watch_count = index.len()
        );
        let start = Instant::now();

        let mut assembler = ChangeRecordAssembler::new(cycle);
        assembler.visit_all(&mut index);
        drop(index);
        let records = assembler.finish();

        log_op_end!(
            OP_RUN_CYCLE,
            duration_ms = start.elapsed().as_millis() as u64,
            detector_id = %self.detector_id,
            domain = %self.config.domain,
            cycle = cycle.value(),
            object_records = records.objects().len(),
            sequence_records = records.sequences().len(),
            map_records = records.maps().len()
        );
        records
    }

    /// Remove every watch with `from <= id < to`. Returns how many were
    /// removed; removal itself emits no records.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRange` if `to < from`. Nothing is removed.
    pub fn unregister_range(&mut self, from: &I, to: &I) -> Result<usize> {
        log_op_start!(
            OP_UNREGISTER_RANGE,
            detector_id = %self.detector_id,
            domain = %self.config.domain,
            from = ?from,
            to = ?to
        );
        let start = Instant::now();

        if to < from {
            let err = DirtyWatchError::invalid_range(from, to);
            log_op_error!(
                OP_UNREGISTER_RANGE,
                self.error_context(OP_UNREGISTER_RANGE, err.clone()),
                duration_ms = start.elapsed().as_millis() as u64,
                detector_id = %self.detector_id,
                domain = %self.config.domain
            );
            return Err(err);
        }
        let removed = self.watches.borrow_mut().remove_range(from, to);

        log_op_end!(
            OP_UNREGISTER_RANGE,
            duration_ms = start.elapsed().as_millis() as u64,
            detector_id = %self.detector_id,
            domain = %self.config.domain,
            removed = removed
        );
        Ok(removed)
    }

    /// Canonical error carrying this detector's operation context.
    fn error_context(&self, op: &str, err: DirtyWatchError) -> ExError {
        ExError::from(err)
            .with_op(op)
            .with_detector_id(self.detector_id.clone())
            .with_cycle(self.cycle)
    }

    pub fn len(&self) -> usize {
        self.watches.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: &I) -> bool {
        self.watches.borrow().contains(id)
    }

    pub fn kind_of(&self, id: &I) -> Option<WatchKind> {
        self.watches.borrow().get(id).map(Watch::kind)
    }

    /// Registered IDs in ascending order.
    pub fn watch_ids(&self) -> Vec<I> {
        self.watches.borrow().keys().cloned().collect()
    }

    pub fn detector_id(&self) -> &DetectorId {
        &self.detector_id
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Number of cycles run so far.
    pub fn cycle_count(&self) -> u64 {
        self.cycle.value()
    }
}

impl<I, H, V, K> Default for ChangeDetector<I, H, V, K>
where
    I: Ord + Clone + fmt::Debug + 'static,
    H: Clone + 'static,
    V: Identity,
    K: Eq + Hash + Clone + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<I: Ord + fmt::Debug, H, V: Identity, K> fmt::Debug for ChangeDetector<I, H, V, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeDetector")
            .field("detector_id", &self.detector_id)
            .field("domain", &self.config.domain)
            .field("cycle", &self.cycle)
            .field("watches", &self.watches.try_borrow().map(|index| index.len()).ok())
            .finish()
    }
}

/// Removal side of the index as seen by handles. `None` means the index is
/// borrowed, i.e. a cycle is running.
pub(crate) trait WatchRegistry<I> {
    fn remove_exact(&self, id: &I, serial: u64) -> Option<bool>;
    fn holds(&self, id: &I, serial: u64) -> Option<bool>;
}

impl<I: Ord, H, V: Identity, K> WatchRegistry<I> for RefCell<OrderedWatchIndex<I, Watch<H, V, K>>> {
    fn remove_exact(&self, id: &I, serial: u64) -> Option<bool> {
        let mut index = self.try_borrow_mut().ok()?;
        Some(index.remove_if(id, |watch| watch.serial == serial).is_some())
    }

    fn holds(&self, id: &I, serial: u64) -> Option<bool> {
        let index = self.try_borrow().ok()?;
        Some(index.get(id).is_some_and(|watch| watch.serial == serial))
    }
}

/// Removes one specific registration.
///
/// The handle remembers the registration serial, so it never removes a later
/// watch that reuses the same ID. It holds only a weak reference and does
/// not keep the detector alive.
pub struct UnregisterHandle<I> {
    id: I,
    serial: u64,
    registry: Weak<dyn WatchRegistry<I>>,
    released: Cell<bool>,
}

impl<I: fmt::Debug> UnregisterHandle<I> {
    /// Remove the watch. Returns `true` only on the call that actually
    /// removed it.
    ///
    /// A no-op returning `false` when the watch is already gone, the detector
    /// was dropped, or a cycle is in progress.
    pub fn unregister(&self) -> bool {
        if self.released.get() {
            return false;
        }
        let Some(registry) = self.registry.upgrade() else {
            self.released.set(true);
            return false;
        };
        match registry.remove_exact(&self.id, self.serial) {
            Some(removed) => {
                self.released.set(true);
                tracing::debug!(watch_id = ?self.id, removed, "watch unregistered");
                removed
            }
            None => {
                tracing::warn!(
                    watch_id = ?self.id,
                    "unregister called during a cycle; ignored"
                );
                false
            }
        }
    }

    /// Whether this exact registration is still in the index.
    pub fn is_registered(&self) -> bool {
        if self.released.get() {
            return false;
        }
        self.registry
            .upgrade()
            .is_some_and(|registry| registry.holds(&self.id, self.serial).unwrap_or(true))
    }

    pub fn id(&self) -> &I {
        &self.id
    }
}

impl<I: fmt::Debug> fmt::Debug for UnregisterHandle<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnregisterHandle")
            .field("id", &self.id)
            .field("serial", &self.serial)
            .field("released", &self.released.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    type Detector = ChangeDetector<u32, &'static str, u32>;

    fn list(values: &[u32]) -> Rc<RefCell<Vec<u32>>> {
        Rc::new(RefCell::new(values.to_vec()))
    }

    #[test]
    fn test_duplicate_id_is_rejected_before_reading() {
        let mut detector = Detector::new();
        detector.register_sequence(list(&[1]), 1, "a").unwrap();

        let reads = Rc::new(Cell::new(0));
        let counter = reads.clone();
        let err = detector
            .register_scalar(
                Rc::new(move |_: &FieldSelector| {
                    counter.set(counter.get() + 1);
                    0u32
                }),
                1,
                "b",
                "field",
            )
            .unwrap_err();

        assert!(matches!(err, DirtyWatchError::DuplicateId { .. }));
        assert_eq!(reads.get(), 0);
        assert_eq!(detector.len(), 1);
    }

    #[test]
    fn test_handle_does_not_remove_reused_id() {
        let mut detector = Detector::new();
        let first = detector.register_sequence(list(&[1]), 5, "first").unwrap();
        assert!(first.unregister());

        let second = detector.register_sequence(list(&[2]), 5, "second").unwrap();
        assert!(!first.unregister());
        assert!(second.is_registered());
        assert!(detector.contains(&5));
    }

    #[test]
    fn test_handle_after_range_removal_is_noop() {
        let mut detector = Detector::new();
        let handle = detector.register_sequence(list(&[]), 3, "x").unwrap();
        assert_eq!(detector.unregister_range(&0, &10).unwrap(), 1);
        assert!(!handle.is_registered());
        assert!(!handle.unregister());
    }

    #[test]
    fn test_handle_outlives_detector() {
        let mut detector = Detector::new();
        let handle = detector.register_sequence(list(&[]), 1, "x").unwrap();
        drop(detector);
        assert!(!handle.is_registered());
        assert!(!handle.unregister());
    }

    #[test]
    fn test_cycle_counter_advances() {
        let mut detector = Detector::new();
        assert_eq!(detector.cycle_count(), 0);
        let records = detector.run_cycle();
        assert_eq!(records.cycle(), CycleId::new(1));
        detector.run_cycle();
        assert_eq!(detector.cycle_count(), 2);
    }

    #[test]
    fn test_every_register_returns_live_handle() {
        let mut detector: ChangeDetector<u32, &'static str, u32, u32> = ChangeDetector::new();
        let scalar = detector
            .register_scalar(Rc::new(|_: &FieldSelector| 0u32), 1, "s", "field")
            .unwrap();
        let sequence = detector.register_sequence(list(&[1]), 2, "q").unwrap();
        let map = Rc::new(RefCell::new(BTreeMap::<u32, u32>::new()));
        let associative = detector.register_associative(map, 3, "m").unwrap();

        assert!(scalar.is_registered());
        assert!(sequence.is_registered());
        assert!(associative.is_registered());
        assert!(sequence.unregister());
        assert_eq!(detector.watch_ids(), vec![1, 3]);
    }

    #[test]
    fn test_error_context_names_detector_and_cycle() {
        let mut detector = Detector::new();
        detector.run_cycle();
        let err = DirtyWatchError::invalid_range(&4u32, &1u32);
        let ex = detector.error_context(OP_UNREGISTER_RANGE, err);

        assert_eq!(ex.op(), Some(OP_UNREGISTER_RANGE));
        assert_eq!(ex.detector_id(), Some(detector.detector_id()));
        assert_eq!(ex.cycle(), Some(CycleId::new(1)));
        assert!(ex.to_string().ends_with("(cycle#1)"));
    }

    #[test]
    fn test_kind_of() {
        let mut detector = Detector::new();
        detector.register_sequence(list(&[]), 1, "x").unwrap();
        assert_eq!(detector.kind_of(&1), Some(WatchKind::Sequence));
        assert_eq!(detector.kind_of(&2), None);
    }
}
