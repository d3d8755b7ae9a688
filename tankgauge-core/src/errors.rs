//! Error taxonomy for the telemetry engine
//!
//! Three branches, matching how failures are handled:
//!
//! - [`ValidationError`]: a single input field is unusable (non-finite,
//!   out of range, references an unknown tank). Aborts that reading only.
//! - [`ComputationError`]: the geometry or unit math cannot produce a
//!   meaningful number (unsupported shape, zero tank depth). Where a
//!   degraded record can still be written, the recorder does so instead
//!   of propagating.
//! - [`PersistenceError`]: the storage seam failed. Transient from the
//!   caller's perspective and safe to retry.
//!
//! Errors are small `Copy` values with `&'static str` reasons so they can
//! be returned from hot paths and logged without allocation. No condition
//! in this crate is fatal to the process.

use thiserror_no_std::Error;

/// Result type for input validation
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Result type for geometry and unit computation
pub type ComputationResult<T> = Result<T, ComputationError>;

/// Result type for storage operations
pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Result type for end-to-end reading processing
pub type ProcessingResult<T> = Result<T, ProcessingError>;

/// Input field validation failures - abort only the offending reading
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ValidationError {
    /// Field is NaN or infinite
    #[error("{field} is not a finite number")]
    NotFinite {
        /// Name of the offending field
        field: &'static str,
    },

    /// Field outside its configured bounds
    #[error("{field} = {value} outside range [{min}, {max}]")]
    OutOfRange {
        /// Name of the offending field
        field: &'static str,
        /// The value that failed
        value: f32,
        /// Lower bound (inclusive)
        min: f32,
        /// Upper bound (inclusive)
        max: f32,
    },

    /// Alert thresholds must satisfy low < high < critical
    #[error("alert thresholds must satisfy low < high < critical")]
    ThresholdOrder,

    /// Solid material requires a bulk density
    #[error("bulk density required: {reason}")]
    MissingDensity {
        /// Which configuration rule demands the density
        reason: &'static str,
    },

    /// Reading repeats the tank's latest (device, timestamp) pair
    #[error("duplicate reading for device at same timestamp")]
    DuplicateReading,

    /// No tank registered under the given id
    #[error("unknown tank reference")]
    UnknownTank,

    /// No tank bound to the given device serial
    #[error("unknown device reference")]
    UnknownDevice,

    /// Identifier string exceeds its storage capacity
    #[error("{field} too long")]
    IdTooLong {
        /// Name of the offending field
        field: &'static str,
    },
}

/// Geometry and unit conversion failures
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ComputationError {
    /// Shape label not in the supported set
    #[error("unsupported tank shape")]
    UnsupportedShape,

    /// Dimensions cannot describe a real tank (zero depth, zero cone height)
    #[error("degenerate geometry: {reason}")]
    DegenerateGeometry {
        /// Which dimension rule was violated
        reason: &'static str,
    },

    /// A required dimension is absent from the configuration
    #[error("missing dimension: {dimension}")]
    MissingDimension {
        /// Name of the absent dimension
        dimension: &'static str,
    },

    /// Computation produced NaN or infinity
    #[error("non-finite result in {stage}")]
    NonFiniteResult {
        /// Computation stage that produced the value
        stage: &'static str,
    },
}

/// Storage seam failures - retryable by the caller
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum PersistenceError {
    /// Backend rejected or lost the write
    #[error("store write failed: {reason}")]
    WriteFailed {
        /// Backend-specific failure note
        reason: &'static str,
    },

    /// Backend could not serve the read
    #[error("store read failed: {reason}")]
    ReadFailed {
        /// Backend-specific failure note
        reason: &'static str,
    },

    /// Conditional upsert lost its race and exhausted retries
    #[error("upsert conflict on analytics key")]
    UpsertConflict,
}

/// Top-level error for the reading pipeline
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ProcessingError {
    /// Input validation failed
    #[error("validation: {0}")]
    Validation(#[from] ValidationError),

    /// Geometry or unit math failed
    #[error("computation: {0}")]
    Computation(#[from] ComputationError),

    /// Storage failed
    #[error("persistence: {0}")]
    Persistence(#[from] PersistenceError),
}

impl ProcessingError {
    /// Whether the caller may retry the same reading unchanged
    pub fn is_retryable(&self) -> bool {
        matches!(self, ProcessingError::Persistence(_))
    }

    /// Whether the failure concerns only this reading (batch may continue)
    pub fn is_reading_scoped(&self) -> bool {
        matches!(
            self,
            ProcessingError::Validation(_) | ProcessingError::Computation(_)
        )
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ValidationError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::NotFinite { field } => defmt::write!(fmt, "{} not finite", field),
            Self::OutOfRange {
                field,
                value,
                min,
                max,
            } => defmt::write!(fmt, "{} = {} outside [{}, {}]", field, value, min, max),
            Self::ThresholdOrder => defmt::write!(fmt, "threshold order"),
            Self::MissingDensity { reason } => defmt::write!(fmt, "missing density: {}", reason),
            Self::DuplicateReading => defmt::write!(fmt, "duplicate reading"),
            Self::UnknownTank => defmt::write!(fmt, "unknown tank"),
            Self::UnknownDevice => defmt::write!(fmt, "unknown device"),
            Self::IdTooLong { field } => defmt::write!(fmt, "{} too long", field),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn persistence_is_retryable() {
        let err = ProcessingError::Persistence(PersistenceError::WriteFailed {
            reason: "disk full",
        });
        assert!(err.is_retryable());
        assert!(!err.is_reading_scoped());
    }

    #[test]
    fn validation_is_reading_scoped() {
        let err = ProcessingError::Validation(ValidationError::NotFinite { field: "raw" });
        assert!(err.is_reading_scoped());
        assert!(!err.is_retryable());
    }
}
