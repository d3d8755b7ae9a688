//! Constants for the TankGauge core
//!
//! Centralized, documented numeric values used throughout the engine.
//! Grouped by domain:
//! - **Physics**: unit conversion factors and physical constants
//! - **Tanks**: configuration validation bounds and threshold defaults
//! - **Quality**: categorical quality tag score mapping
//! - **Time**: period lengths and summary window widths
//!
//! Always use these instead of magic numbers; when adding one, document
//! its source and units in the name.

/// Unit conversion factors and physical constants.
pub mod physics;

/// Quality tag scores and the trusted-quality threshold.
pub mod quality;

/// Tank configuration bounds and alert threshold defaults.
pub mod tanks;

/// Period lengths and summary windows, in milliseconds.
pub mod time;

// Re-export commonly used constants for convenience
pub use physics::{GRAVITY_M_PER_S2, LITERS_PER_M3, WATER_DENSITY_KG_PER_M3};
pub use quality::{QUALITY_SCORE_DEFAULT, QUALITY_SCORE_EXCELLENT};
pub use tanks::{DEFAULT_CRITICAL_THRESHOLD_PCT, DEFAULT_HIGH_THRESHOLD_PCT, DEFAULT_LOW_THRESHOLD_PCT};
pub use time::{MS_PER_DAY, MS_PER_HOUR, MS_PER_WEEK};
