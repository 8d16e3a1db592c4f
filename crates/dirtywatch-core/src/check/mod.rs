//! Dirty checkers, one per watch kind.
//!
//! Each checker compares a watch's snapshot with the live data it observes
//! and returns at most one change. The snapshot is replaced if and only if a
//! change is returned, so an unchanged watch keeps a valid identity baseline
//! for the next cycle.

pub mod associative;
pub mod scalar;
pub mod sequence;

pub use associative::{diff_map, MapChange};
pub use scalar::ObjectChange;
pub use sequence::{diff_sequence, SequenceChange};
