use dirtywatch_core_types::{CycleId, DetectorId};
use thiserror::Error;

/// Result type alias using DirtyWatchError
pub type Result<T> = std::result::Result<T, DirtyWatchError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that can be used for programmatic
/// error handling, log assertions, and external reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Registration
    DuplicateId,

    // Unregistration
    InvalidRange,

    // Configuration
    InvalidConfig,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::DuplicateId => "ERR_DUPLICATE_ID",
            ExErrorKind::InvalidRange => "ERR_INVALID_RANGE",
            ExErrorKind::InvalidConfig => "ERR_INVALID_CONFIG",
        }
    }
}

/// Canonical structured error type
///
/// This error type provides a structured representation of errors with
/// classification fields for programmatic handling and rich context for debugging.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    watch_id: Option<String>,
    detector_id: Option<DetectorId>,
    cycle: Option<CycleId>,
    message: String,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            watch_id: None,
            detector_id: None,
            cycle: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add watch ID context
    pub fn with_watch_id(mut self, id: impl Into<String>) -> Self {
        self.watch_id = Some(id.into());
        self
    }

    /// Add detector ID context
    pub fn with_detector_id(mut self, detector_id: DetectorId) -> Self {
        self.detector_id = Some(detector_id);
        self
    }

    /// Add cycle context
    pub fn with_cycle(mut self, cycle: CycleId) -> Self {
        self.cycle = Some(cycle);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the watch ID context, if any
    pub fn watch_id(&self) -> Option<&str> {
        self.watch_id.as_deref()
    }

    /// Get the detector ID context, if any
    pub fn detector_id(&self) -> Option<&DetectorId> {
        self.detector_id.as_ref()
    }

    /// Get the cycle context, if any
    pub fn cycle(&self) -> Option<CycleId> {
        self.cycle
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(watch_id) = &self.watch_id {
            write!(f, " (watch_id: {})", watch_id)?;
        }
        if let Some(detector_id) = &self.detector_id {
            write!(f, " (detector_id: {})", detector_id)?;
        }
        if let Some(cycle) = self.cycle {
            write!(f, " ({})", cycle)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Errors returned by change detector operations
///
/// Watch IDs are carried in their `Debug` rendering so the error type stays
/// independent of the detector's ID type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DirtyWatchError {
    /// A watch with this ID is already registered
    #[error("Watch already registered: {id}")]
    DuplicateId { id: String },

    /// Range bounds are reversed (`to < from`)
    #[error("Invalid range: exclusive end {to} is below inclusive start {from}")]
    InvalidRange { from: String, to: String },

    /// Detector configuration could not be parsed
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl DirtyWatchError {
    pub(crate) fn duplicate_id(id: &impl std::fmt::Debug) -> Self {
        DirtyWatchError::DuplicateId {
            id: format!("{:?}", id),
        }
    }

    pub(crate) fn invalid_range(from: &impl std::fmt::Debug, to: &impl std::fmt::Debug) -> Self {
        DirtyWatchError::InvalidRange {
            from: format!("{:?}", from),
            to: format!("{:?}", to),
        }
    }
}

/// Conversion from DirtyWatchError to the canonical ExError
impl From<DirtyWatchError> for ExError {
    fn from(err: DirtyWatchError) -> Self {
        match err {
            DirtyWatchError::DuplicateId { id } => ExError::new(ExErrorKind::DuplicateId)
                .with_watch_id(id)
                .with_message("Watch ID already present in the index"),

            DirtyWatchError::InvalidRange { from, to } => ExError::new(ExErrorKind::InvalidRange)
                .with_message(format!("Range [{}, {}) is reversed", from, to)),

            DirtyWatchError::InvalidConfig { reason } => {
                ExError::new(ExErrorKind::InvalidConfig).with_message(reason)
            }
        }
    }
}

/// Conversion from toml::de::Error to DirtyWatchError
impl From<toml::de::Error> for DirtyWatchError {
    fn from(err: toml::de::Error) -> Self {
        DirtyWatchError::InvalidConfig {
            reason: err.to_string(),
        }
    }
}
