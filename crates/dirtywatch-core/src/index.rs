//! Ordered watch index.
//!
//! A treap keyed by watch ID. Node priorities come from a splitmix64 stream
//! seeded per index, so the tree shape is reproducible for a given sequence
//! of operations while still being balanced in expectation. Each node caches
//! its subtree size.
//!
//! | operation        | cost (expected)  |
//! |------------------|------------------|
//! | `insert`         | O(log n)         |
//! | `remove`         | O(log n)         |
//! | `remove_range`   | O(log n + k)     |
//! | `iter`/`iter_mut`| O(n) total       |
//!
//! Range removal splits the tree twice around the bounds, merges the outer
//! parts back together and drops the detached middle subtree. Surviving
//! nodes are never visited.

use std::cmp::Ordering;
use std::fmt;

use crate::errors::{DirtyWatchError, Result};

type Link<I, W> = Option<Box<Node<I, W>>>;

struct Node<I, W> {
    key: I,
    value: W,
    priority: u64,
    size: usize,
    left: Link<I, W>,
    right: Link<I, W>,
}

impl<I, W> Node<I, W> {
    fn new(key: I, value: W, priority: u64) -> Self {
        Self {
            key,
            value,
            priority,
            size: 1,
            left: None,
            right: None,
        }
    }

    fn update(&mut self) {
        self.size = 1 + size(&self.left) + size(&self.right);
    }
}

fn size<I, W>(link: &Link<I, W>) -> usize {
    link.as_ref().map_or(0, |node| node.size)
}

/// Split into (`key < bound`, `key >= bound`).
fn split_below<I: Ord, W>(link: Link<I, W>, bound: &I) -> (Link<I, W>, Link<I, W>) {
    match link {
        None => (None, None),
        Some(mut node) => {
            if node.key < *bound {
                let (lower, upper) = split_below(node.right.take(), bound);
                node.right = lower;
                node.update();
                (Some(node), upper)
            } else {
                let (lower, upper) = split_below(node.left.take(), bound);
                node.left = upper;
                node.update();
                (lower, Some(node))
            }
        }
    }
}

/// Join two treaps where every key in `lower` is below every key in `upper`.
fn merge<I, W>(lower: Link<I, W>, upper: Link<I, W>) -> Link<I, W> {
    match (lower, upper) {
        (None, upper) => upper,
        (lower, None) => lower,
        (Some(mut lower), Some(mut upper)) => {
            if lower.priority > upper.priority {
                lower.right = merge(lower.right.take(), Some(upper));
                lower.update();
                Some(lower)
            } else {
                upper.left = merge(Some(lower), upper.left.take());
                upper.update();
                Some(upper)
            }
        }
    }
}

fn remove_node<I: Ord, W>(
    link: &mut Link<I, W>,
    key: &I,
    accept: impl FnOnce(&W) -> bool,
) -> Option<W> {
    let ordering = key.cmp(&link.as_ref()?.key);
    match ordering {
        Ordering::Equal => {
            if !accept(&link.as_ref()?.value) {
                return None;
            }
            let node = link.take()?;
            let Node {
                value, left, right, ..
            } = *node;
            *link = merge(left, right);
            Some(value)
        }
        Ordering::Less | Ordering::Greater => {
            let node = link.as_mut()?;
            let child = if ordering == Ordering::Less {
                &mut node.left
            } else {
                &mut node.right
            };
            let removed = remove_node(child, key, accept);
            if removed.is_some() {
                node.update();
            }
            removed
        }
    }
}

/// splitmix64 step; a cheap, well-mixed deterministic priority source.
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

const DEFAULT_SEED: u64 = 0x5EED_D1A7_7A7C_4E11;

/// Watches (or any values) kept in ascending key order.
pub struct OrderedWatchIndex<I, W> {
    root: Link<I, W>,
    priority_state: u64,
}

impl<I: Ord, W> OrderedWatchIndex<I, W> {
    /// Create an empty index
    pub fn new() -> Self {
        Self::with_seed(DEFAULT_SEED)
    }

    /// Create an empty index with an explicit priority seed
    pub fn with_seed(seed: u64) -> Self {
        Self {
            root: None,
            priority_state: seed,
        }
    }

    pub fn len(&self) -> usize {
        size(&self.root)
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn get(&self, key: &I) -> Option<&W> {
        let mut link = self.root.as_deref();
        while let Some(node) = link {
            link = match key.cmp(&node.key) {
                Ordering::Less => node.left.as_deref(),
                Ordering::Greater => node.right.as_deref(),
                Ordering::Equal => return Some(&node.value),
            };
        }
        None
    }

    pub fn get_mut(&mut self, key: &I) -> Option<&mut W> {
        let mut link = self.root.as_deref_mut();
        while let Some(node) = link {
            link = match key.cmp(&node.key) {
                Ordering::Less => node.left.as_deref_mut(),
                Ordering::Greater => node.right.as_deref_mut(),
                Ordering::Equal => return Some(&mut node.value),
            };
        }
        None
    }

    pub fn contains(&self, key: &I) -> bool {
        self.get(key).is_some()
    }

    /// Insert a value under a key that must not already be present.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateId` if the key exists; the index is left unchanged.
    pub fn insert(&mut self, key: I, value: W) -> Result<()>
    where
        I: fmt::Debug,
    {
        if self.contains(&key) {
            return Err(DirtyWatchError::duplicate_id(&key));
        }
        let priority = splitmix64(&mut self.priority_state);
        let (lower, upper) = split_below(self.root.take(), &key);
        let node = Some(Box::new(Node::new(key, value, priority)));
        self.root = merge(merge(lower, node), upper);
        Ok(())
    }

    /// Remove the entry for `key`, if any.
    pub fn remove(&mut self, key: &I) -> Option<W> {
        remove_node(&mut self.root, key, |_| true)
    }

    /// Remove the entry for `key` only if `accept` approves the stored value.
    pub fn remove_if(&mut self, key: &I, accept: impl FnOnce(&W) -> bool) -> Option<W> {
        remove_node(&mut self.root, key, accept)
    }

    /// Remove every entry with `from <= key < to` and return how many were
    /// removed. An empty or reversed range removes nothing.
    pub fn remove_range(&mut self, from: &I, to: &I) -> usize {
        if to <= from {
            return 0;
        }
        let (lower, rest) = split_below(self.root.take(), from);
        let (doomed, upper) = split_below(rest, to);
        self.root = merge(lower, upper);
        let removed = size(&doomed);
        drop(doomed);
        removed
    }

    /// Ascending in-order traversal.
    pub fn iter(&self) -> Iter<'_, I, W> {
        let mut iter = Iter {
            stack: Vec::new(),
            remaining: self.len(),
        };
        iter.descend(self.root.as_deref());
        iter
    }

    /// Ascending in-order traversal with mutable access to the values.
    pub fn iter_mut(&mut self) -> IterMut<'_, I, W> {
        let remaining = self.len();
        let mut iter = IterMut {
            stack: Vec::new(),
            remaining,
        };
        iter.descend(self.root.as_deref_mut());
        iter
    }

    pub fn keys(&self) -> impl Iterator<Item = &I> + '_ {
        self.iter().map(|(key, _)| key)
    }
}

impl<I: Ord, W> Default for OrderedWatchIndex<I, W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: Ord + fmt::Debug, W> fmt::Debug for OrderedWatchIndex<I, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.keys()).finish()
    }
}

/// Borrowing ascending iterator over an [`OrderedWatchIndex`].
pub struct Iter<'a, I, W> {
    stack: Vec<&'a Node<I, W>>,
    remaining: usize,
}

impl<'a, I, W> Iter<'a, I, W> {
    fn descend(&mut self, mut link: Option<&'a Node<I, W>>) {
        while let Some(node) = link {
            self.stack.push(node);
            link = node.left.as_deref();
        }
    }
}

impl<'a, I, W> Iterator for Iter<'a, I, W> {
    type Item = (&'a I, &'a W);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.descend(node.right.as_deref());
        self.remaining -= 1;
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<I, W> ExactSizeIterator for Iter<'_, I, W> {}

/// Mutable ascending iterator over an [`OrderedWatchIndex`].
///
/// Keys stay immutable; only values can be modified.
pub struct IterMut<'a, I, W> {
    stack: Vec<(&'a I, &'a mut W, Option<&'a mut Node<I, W>>)>,
    remaining: usize,
}

impl<'a, I, W> IterMut<'a, I, W> {
    fn descend(&mut self, mut link: Option<&'a mut Node<I, W>>) {
        while let Some(node) = link {
            let Node {
                key,
                value,
                left,
                right,
                ..
            } = node;
            let key: &'a I = key;
            self.stack.push((key, value, right.as_deref_mut()));
            link = left.as_deref_mut();
        }
    }
}

impl<'a, I, W> Iterator for IterMut<'a, I, W> {
    type Item = (&'a I, &'a mut W);

    fn next(&mut self) -> Option<Self::Item> {
        let (key, value, right) = self.stack.pop()?;
        self.descend(right);
        self.remaining -= 1;
        Some((key, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<I, W> ExactSizeIterator for IterMut<'_, I, W> {}
