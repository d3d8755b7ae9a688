//! Tank configuration bounds and alert threshold defaults
//!
//! Validation limits enforced when a tank is registered. Out-of-range
//! *configuration* is rejected; out-of-range *computed outputs* are
//! clamped instead (see the error-handling policy in `errors`).

/// Minimum tank capacity (liters).
pub const CAPACITY_MIN_L: f32 = 1.0;

/// Maximum tank capacity (liters). 10,000 m³ covers the largest field
/// installations.
pub const CAPACITY_MAX_L: f32 = 10_000_000.0;

/// Minimum linear dimension (m). Anything smaller is a configuration
/// mistake, not a tank.
pub const DIMENSION_MIN_M: f32 = 0.1;

/// Maximum linear dimension (m).
pub const DIMENSION_MAX_M: f32 = 100.0;

/// Maximum tank diameter (m).
pub const DIAMETER_MAX_M: f32 = 50.0;

/// Maximum bottom dead space (m).
pub const OFFSET_DEPTH_MAX_M: f32 = 10.0;

/// Minimum bulk density (kg/m³).
pub const BULK_DENSITY_MIN_KG_M3: f32 = 0.1;

/// Maximum bulk density (kg/m³). Covers dense ores with margin.
pub const BULK_DENSITY_MAX_KG_M3: f32 = 10_000.0;

/// Default low-fill alert threshold (percent).
pub const DEFAULT_LOW_THRESHOLD_PCT: f32 = 10.0;

/// Default high-fill alert threshold (percent).
pub const DEFAULT_HIGH_THRESHOLD_PCT: f32 = 80.0;

/// Default critical-fill alert threshold (percent).
pub const DEFAULT_CRITICAL_THRESHOLD_PCT: f32 = 95.0;

// Environmental plausibility windows. Values outside these are dropped
// from the record with a low-severity issue note.

/// Minimum plausible reported temperature (°C).
pub const ENV_TEMP_MIN_C: f32 = -50.0;

/// Maximum plausible reported temperature (°C).
pub const ENV_TEMP_MAX_C: f32 = 100.0;

/// Minimum plausible relative humidity (%).
pub const ENV_HUMIDITY_MIN_PCT: f32 = 0.0;

/// Maximum plausible relative humidity (%).
pub const ENV_HUMIDITY_MAX_PCT: f32 = 100.0;

/// Minimum plausible battery level (%).
pub const ENV_BATTERY_MIN_PCT: f32 = 0.0;

/// Maximum plausible battery level (%).
pub const ENV_BATTERY_MAX_PCT: f32 = 100.0;

/// Minimum plausible signal strength (dBm).
pub const ENV_RSSI_MIN_DBM: f32 = -150.0;

/// Maximum plausible signal strength (dBm).
pub const ENV_RSSI_MAX_DBM: f32 = 0.0;
