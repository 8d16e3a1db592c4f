//! Read capabilities supplied by the embedding application.
//!
//! The detector does not know how a field is stored or how a collection is
//! laid out. It only needs to read a scalar location and to enumerate a
//! collection once per cycle, which these traits capture.
//!
//! The `RefCell` adapters borrow the collection for the duration of a read.
//! Holding a mutable borrow of a watched collection while a cycle runs is a
//! caller error and panics on the conflicting borrow.

use std::borrow::Cow;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::fmt;
use std::hash::BuildHasher;

/// Opaque key naming the watched location inside a container.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldSelector(Cow<'static, str>);

impl FieldSelector {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for FieldSelector {
    fn from(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }
}

impl From<String> for FieldSelector {
    fn from(name: String) -> Self {
        Self(Cow::Owned(name))
    }
}

impl fmt::Display for FieldSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reads the current value of one location in a container.
///
/// Called once per scalar watch per cycle, so it should be O(1).
pub trait FieldAccess<V> {
    fn read_field(&self, field: &FieldSelector) -> V;
}

/// A plain getter closure is a valid field accessor; the selector is then
/// informational only.
impl<V, F> FieldAccess<V> for F
where
    F: Fn(&FieldSelector) -> V,
{
    fn read_field(&self, field: &FieldSelector) -> V {
        self(field)
    }
}

/// Enumerates an ordered collection, front to back.
pub trait SequenceAccess<V> {
    fn visit_items(&self, visit: &mut dyn FnMut(&V));
}

impl<V> SequenceAccess<V> for RefCell<Vec<V>> {
    fn visit_items(&self, visit: &mut dyn FnMut(&V)) {
        self.borrow().iter().for_each(visit);
    }
}

impl<V> SequenceAccess<V> for RefCell<VecDeque<V>> {
    fn visit_items(&self, visit: &mut dyn FnMut(&V)) {
        self.borrow().iter().for_each(visit);
    }
}

/// Enumerates the entries of a key/value collection.
///
/// Enumeration order is up to the collection; the detector reports entries
/// in whatever order this yields them.
pub trait MapAccess<K, V> {
    fn visit_entries(&self, visit: &mut dyn FnMut(&K, &V));
}

impl<K, V, S: BuildHasher> MapAccess<K, V> for RefCell<HashMap<K, V, S>> {
    fn visit_entries(&self, visit: &mut dyn FnMut(&K, &V)) {
        for (key, value) in self.borrow().iter() {
            visit(key, value);
        }
    }
}

impl<K, V> MapAccess<K, V> for RefCell<BTreeMap<K, V>> {
    fn visit_entries(&self, visit: &mut dyn FnMut(&K, &V)) {
        for (key, value) in self.borrow().iter() {
            visit(key, value);
        }
    }
}

/// Collect a sequence into an owned buffer.
pub(crate) fn collect_items<V: Clone>(collection: &dyn SequenceAccess<V>) -> Vec<V> {
    let mut items = Vec::new();
    collection.visit_items(&mut |item| items.push(item.clone()));
    items
}

/// Collect a map into owned (key, value) pairs in enumeration order.
pub(crate) fn collect_entries<K: Clone, V: Clone>(collection: &dyn MapAccess<K, V>) -> Vec<(K, V)> {
    let mut entries = Vec::new();
    collection.visit_entries(&mut |key, value| entries.push((key.clone(), value.clone())));
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_is_field_access() {
        let getter = |field: &FieldSelector| field.as_str().len();
        assert_eq!(getter.read_field(&FieldSelector::from("width")), 5);
    }

    #[test]
    fn test_vec_adapter_visits_in_order() {
        let items = RefCell::new(vec![3, 1, 2]);
        assert_eq!(collect_items(&items), vec![3, 1, 2]);
    }

    #[test]
    fn test_btree_adapter_visits_sorted() {
        let map = RefCell::new(BTreeMap::from([("b", 2), ("a", 1)]));
        assert_eq!(collect_entries(&map), vec![("a", 1), ("b", 2)]);
    }

    #[test]
    fn test_selector_display() {
        assert_eq!(FieldSelector::new(String::from("title")).to_string(), "title");
    }
}
