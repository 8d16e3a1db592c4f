//! Identity comparison for watched values.
//!
//! The detector never calls `PartialEq`. Two values are the same only if
//! they are the same allocation (shared pointers) or have the same bit
//! pattern (primitives). Each value exposes its identity as a small `Copy`
//! key so sequence diffing can bucket duplicates in a hash map.

use std::fmt::Debug;
use std::hash::Hash;
use std::rc::Rc;
use std::sync::Arc;

/// A value whose identity can be compared without inspecting its contents.
///
/// Keys must stay valid while the value is alive. Pointer keys are only
/// meaningful because snapshots hold a clone of the value, which keeps the
/// allocation (and therefore the address) reserved.
pub trait Identity: Clone + 'static {
    /// Identity token; equal keys mean identical values.
    type Key: Copy + Eq + Hash + Debug;

    fn identity_key(&self) -> Self::Key;

    /// Identity comparison.
    fn same(&self, other: &Self) -> bool {
        self.identity_key() == other.identity_key()
    }
}

/// Primitives compare by value, which is their bit pattern.
macro_rules! impl_identity_by_value {
    ($($t:ty),* $(,)?) => {
        $(
            impl Identity for $t {
                type Key = $t;

                fn identity_key(&self) -> Self::Key {
                    *self
                }
            }
        )*
    };
}

impl_identity_by_value!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, bool, char, ()
);

impl Identity for f32 {
    type Key = u32;

    fn identity_key(&self) -> Self::Key {
        self.to_bits()
    }
}

impl Identity for f64 {
    type Key = u64;

    fn identity_key(&self) -> Self::Key {
        self.to_bits()
    }
}

/// Address of the pointee, with any fat-pointer metadata discarded.
fn address<T: ?Sized>(ptr: *const T) -> usize {
    ptr as *const () as usize
}

impl<T: ?Sized + 'static> Identity for Rc<T> {
    type Key = usize;

    fn identity_key(&self) -> Self::Key {
        address(Rc::as_ptr(self))
    }
}

impl<T: ?Sized + 'static> Identity for Arc<T> {
    type Key = usize;

    fn identity_key(&self) -> Self::Key {
        address(Arc::as_ptr(self))
    }
}

impl<T: ?Sized + 'static> Identity for &'static T {
    type Key = usize;

    fn identity_key(&self) -> Self::Key {
        address(*self as *const T)
    }
}

impl<T: Identity> Identity for Option<T> {
    type Key = Option<T::Key>;

    fn identity_key(&self) -> Self::Key {
        self.as_ref().map(Identity::identity_key)
    }
}
