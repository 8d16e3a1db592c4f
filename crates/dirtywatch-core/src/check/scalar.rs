//! Scalar dirty checker: one identity comparison per watch.

use crate::identity::Identity;
use crate::model::watch::ScalarWatch;

/// A field whose value changed identity since the last cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectChange<V> {
    /// `None` when the watch had not been read before this cycle.
    pub(crate) previous_value: Option<V>,
    pub(crate) current_value: V,
}

impl<V> ObjectChange<V> {
    pub fn previous_value(&self) -> Option<&V> {
        self.previous_value.as_ref()
    }

    pub fn current_value(&self) -> &V {
        &self.current_value
    }
}

/// Read the field and compare it with the last seen value by identity.
pub fn check<V: Identity>(watch: &mut ScalarWatch<V>) -> Option<ObjectChange<V>> {
    let current = watch.container.read_field(&watch.field);
    if let Some(last) = &watch.last_value {
        if last.same(&current) {
            return None;
        }
    }
    tracing::trace!(field = %watch.field, "field changed");
    let previous_value = watch.last_value.replace(current.clone());
    Some(ObjectChange {
        previous_value,
        current_value: current,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::FieldSelector;
    use crate::config::Baseline;
    use std::cell::Cell;
    use std::rc::Rc;

    fn counter_watch(cell: &Rc<Cell<u32>>, baseline: Baseline) -> ScalarWatch<u32> {
        let source = cell.clone();
        ScalarWatch::new(
            Rc::new(move |_: &FieldSelector| source.get()),
            FieldSelector::from("count"),
            baseline,
        )
    }

    #[test]
    fn test_unchanged_value_reports_nothing() {
        let cell = Rc::new(Cell::new(1));
        let mut watch = counter_watch(&cell, Baseline::Capture);
        assert_eq!(check(&mut watch), None);
        assert_eq!(watch.last_value(), Some(&1));
    }

    #[test]
    fn test_change_reports_previous_and_updates_snapshot() {
        let cell = Rc::new(Cell::new(1));
        let mut watch = counter_watch(&cell, Baseline::Capture);
        cell.set(2);
        let change = check(&mut watch).unwrap();
        assert_eq!(change.previous_value(), Some(&1));
        assert_eq!(change.current_value(), &2);
        assert_eq!(watch.last_value(), Some(&2));
        assert_eq!(check(&mut watch), None);
    }

    #[test]
    fn test_unread_watch_reports_first_read() {
        let cell = Rc::new(Cell::new(5));
        let mut watch = counter_watch(&cell, Baseline::Unread);
        let change = check(&mut watch).unwrap();
        assert_eq!(change.previous_value(), None);
        assert_eq!(change.current_value(), &5);
    }

    #[test]
    fn test_equal_but_distinct_allocation_is_a_change() {
        let slot: Rc<Cell<Option<Rc<String>>>> = Rc::new(Cell::new(Some(Rc::new("v".to_string()))));
        let source = slot.clone();
        let mut watch: ScalarWatch<Rc<String>> = ScalarWatch::new(
            Rc::new(move |_: &FieldSelector| {
                let value = source.take().unwrap_or_default();
                source.set(Some(value.clone()));
                value
            }),
            FieldSelector::from("label"),
            Baseline::Capture,
        );
        slot.set(Some(Rc::new("v".to_string())));
        assert!(check(&mut watch).is_some(), "identity differs even though text is equal");
    }
}
