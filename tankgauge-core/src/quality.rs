//! Data-quality tags and confidence scoring
//!
//! Every history record carries a categorical quality tag plus the
//! numeric score derived from it. Summaries and averages only admit the
//! *trusted* tags - a `poor` or `error` record stays queryable but does
//! not pollute reported statistics.

use crate::constants::quality::{
    QUALITY_SCORE_DEFAULT, QUALITY_SCORE_ERROR, QUALITY_SCORE_EXCELLENT, QUALITY_SCORE_FAIR,
    QUALITY_SCORE_GOOD, QUALITY_SCORE_POOR,
};

/// Categorical confidence rating for a computed reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[repr(u8)]
pub enum DataQuality {
    /// Reading from a healthy sensor, all checks passed
    Excellent = 0,
    /// Normal reading, no anomalies observed
    Good = 1,
    /// Usable but degraded (e.g. unknown sensor kind pass-through)
    Fair = 2,
    /// Suspect reading, kept for the audit trail
    Poor = 3,
    /// Computation failed; stored values are placeholders
    Error = 4,
    /// No quality information supplied
    Unknown = 5,
    /// Operator-entered adjustment
    Manual = 6,
    /// Tank shape could not be dispatched at processing time
    UnsupportedShape = 7,
}

impl DataQuality {
    /// Numeric confidence score (0-100) for this tag
    pub const fn score(&self) -> u8 {
        match self {
            DataQuality::Excellent | DataQuality::Manual => QUALITY_SCORE_EXCELLENT,
            DataQuality::Good => QUALITY_SCORE_GOOD,
            DataQuality::Fair => QUALITY_SCORE_FAIR,
            DataQuality::Poor => QUALITY_SCORE_POOR,
            DataQuality::Error => QUALITY_SCORE_ERROR,
            DataQuality::Unknown | DataQuality::UnsupportedShape => QUALITY_SCORE_DEFAULT,
        }
    }

    /// Whether records with this tag feed averages and summaries
    pub const fn is_trusted(&self) -> bool {
        matches!(
            self,
            DataQuality::Excellent | DataQuality::Good | DataQuality::Fair | DataQuality::Manual
        )
    }

    /// Stable wire label for this tag
    pub const fn label(&self) -> &'static str {
        match self {
            DataQuality::Excellent => "excellent",
            DataQuality::Good => "good",
            DataQuality::Fair => "fair",
            DataQuality::Poor => "poor",
            DataQuality::Error => "error",
            DataQuality::Unknown => "unknown",
            DataQuality::Manual => "manual",
            DataQuality::UnsupportedShape => "unsupported_shape",
        }
    }

    /// Parse a wire label; unrecognized labels map to `Unknown`
    pub fn from_label(label: &str) -> Self {
        match label {
            "excellent" => DataQuality::Excellent,
            "good" => DataQuality::Good,
            "fair" => DataQuality::Fair,
            "poor" => DataQuality::Poor,
            "error" => DataQuality::Error,
            "manual" => DataQuality::Manual,
            "unsupported_shape" => DataQuality::UnsupportedShape,
            _ => DataQuality::Unknown,
        }
    }
}

impl Default for DataQuality {
    fn default() -> Self {
        DataQuality::Unknown
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for DataQuality {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_mapping_matches_policy() {
        assert_eq!(DataQuality::Excellent.score(), 100);
        assert_eq!(DataQuality::Good.score(), 80);
        assert_eq!(DataQuality::Fair.score(), 60);
        assert_eq!(DataQuality::Poor.score(), 40);
        assert_eq!(DataQuality::Error.score(), 0);
        assert_eq!(DataQuality::Unknown.score(), 50);
        assert_eq!(DataQuality::Manual.score(), 100);
    }

    #[test]
    fn trusted_set() {
        assert!(DataQuality::Excellent.is_trusted());
        assert!(DataQuality::Fair.is_trusted());
        assert!(DataQuality::Manual.is_trusted());
        assert!(!DataQuality::Poor.is_trusted());
        assert!(!DataQuality::Error.is_trusted());
        assert!(!DataQuality::UnsupportedShape.is_trusted());
    }

    #[test]
    fn label_round_trip() {
        for q in [
            DataQuality::Excellent,
            DataQuality::Good,
            DataQuality::Fair,
            DataQuality::Poor,
            DataQuality::Error,
            DataQuality::Unknown,
            DataQuality::Manual,
            DataQuality::UnsupportedShape,
        ] {
            assert_eq!(DataQuality::from_label(q.label()), q);
        }
        assert_eq!(DataQuality::from_label("gibberish"), DataQuality::Unknown);
    }
}
