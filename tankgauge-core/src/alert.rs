//! Fill-status classification against per-tank thresholds
//!
//! Classification order matters: critical is checked before high so an
//! overfilled tank never reports merely "high", and low is only reached
//! when neither upper threshold fires.

use crate::constants::tanks::{
    DEFAULT_CRITICAL_THRESHOLD_PCT, DEFAULT_HIGH_THRESHOLD_PCT, DEFAULT_LOW_THRESHOLD_PCT,
};
use crate::errors::{ValidationError, ValidationResult};
use crate::traits::Validate;

/// Alert thresholds in percent of usable capacity
///
/// Must satisfy `low < high < critical`; validated when the tank is
/// registered, never in the reading path.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AlertThresholds {
    /// At or below this fill, status is `Low`
    pub low: f32,
    /// At or above this fill, status is `High`
    pub high: f32,
    /// At or above this fill, status is `Critical`
    pub critical: f32,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            low: DEFAULT_LOW_THRESHOLD_PCT,
            high: DEFAULT_HIGH_THRESHOLD_PCT,
            critical: DEFAULT_CRITICAL_THRESHOLD_PCT,
        }
    }
}

impl AlertThresholds {
    /// Classify a fill percentage against these thresholds
    pub fn evaluate(&self, fill_percent: f32) -> FillStatus {
        if fill_percent >= self.critical {
            FillStatus::Critical
        } else if fill_percent >= self.high {
            FillStatus::High
        } else if fill_percent <= self.low {
            FillStatus::Low
        } else {
            FillStatus::Normal
        }
    }
}

impl Validate for AlertThresholds {
    fn validate(&self) -> ValidationResult<()> {
        for (field, value) in [
            ("low_threshold", self.low),
            ("high_threshold", self.high),
            ("critical_threshold", self.critical),
        ] {
            if !value.is_finite() {
                return Err(ValidationError::NotFinite { field });
            }
            if !(0.0..=100.0).contains(&value) {
                return Err(ValidationError::OutOfRange {
                    field,
                    value,
                    min: 0.0,
                    max: 100.0,
                });
            }
        }
        if !(self.low < self.high && self.high < self.critical) {
            return Err(ValidationError::ThresholdOrder);
        }
        Ok(())
    }
}

/// Fill status consumed by the external alert/notification path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[repr(u8)]
pub enum FillStatus {
    /// Between the low and high thresholds
    Normal = 0,
    /// At or below the low threshold
    Low = 1,
    /// At or above the high threshold
    High = 2,
    /// At or above the critical threshold
    Critical = 3,
}

impl FillStatus {
    /// Stable wire label
    pub const fn label(&self) -> &'static str {
        match self {
            FillStatus::Normal => "normal",
            FillStatus::Low => "low",
            FillStatus::High => "high",
            FillStatus::Critical => "critical",
        }
    }
}
