//! Detector configuration.
//!
//! ```
//! use dirtywatch_core::config::{Baseline, DetectorConfig};
//!
//! let config = DetectorConfig::from_toml_str(
//!     r#"
//!     domain = "ui"
//!     baseline = "unread"
//!     "#,
//! )
//! .unwrap();
//! assert_eq!(config.domain, "ui");
//! assert_eq!(config.baseline, Baseline::Unread);
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::Result;

/// When a watch takes its first snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Baseline {
    /// Read at registration: the first cycle reports only later changes.
    #[default]
    Capture,
    /// Leave unread: the first cycle reports the initial state.
    Unread,
}

/// Per-detector settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DetectorConfig {
    /// Label attached to every boundary log event of the detector.
    pub domain: String,
    pub baseline: Baseline,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            domain: "default".to_string(),
            baseline: Baseline::default(),
        }
    }
}

impl DetectorConfig {
    /// Parse from TOML. Missing keys take their defaults; unknown keys are
    /// rejected with `InvalidConfig`.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    pub fn with_baseline(mut self, baseline: Baseline) -> Self {
        self.baseline = baseline;
        self
    }
}
