use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use dirtywatch_core::{ChangeDetector, CollectionItem, FieldAccess, FieldSelector, MapEntry};

/// Detector over interned strings, compared by allocation.
#[allow(dead_code)]
pub type StrDetector = ChangeDetector<u32, &'static str, Rc<str>>;

/// Detector over string-keyed maps of integers.
#[allow(dead_code)]
pub type MapDetector = ChangeDetector<u32, &'static str, u32, &'static str>;

/// A fixed set of named allocations.
///
/// Looking the same name up twice yields the same `Rc`, so it has the same
/// identity. `fresh` gives an equal string in a new allocation.
#[allow(dead_code)]
pub struct Pool {
    items: HashMap<&'static str, Rc<str>>,
}

#[allow(dead_code)]
impl Pool {
    pub fn new(names: &[&'static str]) -> Self {
        Self {
            items: names.iter().map(|name| (*name, Rc::from(*name))).collect(),
        }
    }

    pub fn get(&self, name: &str) -> Rc<str> {
        self.items[name].clone()
    }

    pub fn list(&self, names: &[&str]) -> Vec<Rc<str>> {
        names.iter().map(|name| self.get(name)).collect()
    }

    pub fn fresh(name: &str) -> Rc<str> {
        Rc::from(name)
    }
}

#[allow(dead_code)]
pub fn shared_list(items: Vec<Rc<str>>) -> Rc<RefCell<Vec<Rc<str>>>> {
    Rc::new(RefCell::new(items))
}

#[allow(dead_code)]
pub fn shared_map(entries: &[(&'static str, u32)]) -> Rc<RefCell<BTreeMap<&'static str, u32>>> {
    Rc::new(RefCell::new(entries.iter().copied().collect()))
}

/// A small view model with two watchable fields.
#[allow(dead_code)]
pub struct Panel {
    pub title: RefCell<Rc<str>>,
    pub subtitle: RefCell<Rc<str>>,
}

#[allow(dead_code)]
impl Panel {
    pub fn new(title: &str, subtitle: &str) -> Rc<Self> {
        Rc::new(Self {
            title: RefCell::new(Rc::from(title)),
            subtitle: RefCell::new(Rc::from(subtitle)),
        })
    }
}

impl FieldAccess<Rc<str>> for Panel {
    fn read_field(&self, field: &FieldSelector) -> Rc<str> {
        match field.as_str() {
            "title" => self.title.borrow().clone(),
            _ => self.subtitle.borrow().clone(),
        }
    }
}

/// `(item, previous_index, current_index)` triples for compact assertions.
#[allow(dead_code)]
pub fn triples(entries: &[CollectionItem<Rc<str>>]) -> Vec<(String, Option<usize>, Option<usize>)> {
    entries
        .iter()
        .map(|e| (e.item().to_string(), e.previous_index(), e.current_index()))
        .collect()
}

#[allow(dead_code)]
pub fn pairs(entries: &[MapEntry<&'static str, u32>]) -> Vec<(&'static str, u32)> {
    entries.iter().map(|e| (*e.key(), *e.value())).collect()
}
