//! Correlation types for detector instances and check cycles
//!
//! Several detectors may live in one process (one per application domain),
//! so every log event carries the detector it came from and, during a check,
//! the cycle it belongs to.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a single detector instance
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DetectorId(String);

impl DetectorId {
    /// Generate a new random DetectorId using UUIDv7
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Get the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Create from an existing string (for deserialization)
    pub fn from_string(s: String) -> Self {
        Self(s)
    }
}

impl Default for DetectorId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for DetectorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Sequence number of a check cycle within one detector
///
/// Cycle numbers start at 1 and increase by one per `run_cycle` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CycleId(u64);

impl CycleId {
    /// Wrap a raw cycle number
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Get the raw cycle number
    pub fn value(&self) -> u64 {
        self.0
    }

    /// The cycle that follows this one
    pub fn next(&self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl std::fmt::Display for CycleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "cycle#{}", self.0)
    }
}
