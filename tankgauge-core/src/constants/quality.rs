//! Quality tag score mapping
//!
//! Each categorical data-quality tag maps to a 0-100 confidence score
//! stored on the history record and averaged into period analytics.

/// Score for `excellent` readings (and manual entries).
pub const QUALITY_SCORE_EXCELLENT: u8 = 100;

/// Score for `good` readings.
pub const QUALITY_SCORE_GOOD: u8 = 80;

/// Score for `fair` readings (e.g. unknown sensor kind pass-through).
pub const QUALITY_SCORE_FAIR: u8 = 60;

/// Score for `poor` readings.
pub const QUALITY_SCORE_POOR: u8 = 40;

/// Score for `error` readings (degraded record, value untrustworthy).
pub const QUALITY_SCORE_ERROR: u8 = 0;

/// Score for tags without an explicit mapping (`unknown`,
/// `unsupported_shape`).
pub const QUALITY_SCORE_DEFAULT: u8 = 50;
