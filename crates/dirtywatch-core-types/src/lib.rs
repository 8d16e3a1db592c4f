//! Core types shared across dirtywatch facilities
//!
//! This crate provides foundational types used by the change detector and
//! its logging facility:
//!
//! - **Correlation types**: DetectorId, CycleId
//! - **Schema constants**: Canonical field keys and event names

pub mod correlation;
pub mod schema;

pub use correlation::{CycleId, DetectorId};
