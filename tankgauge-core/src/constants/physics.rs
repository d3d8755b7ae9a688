//! Unit conversion factors and physical constants
//!
//! All level math is done in meters and all volume math in cubic meters;
//! these factors convert sensor-native units at the edges.

/// Standard gravity (m/s²).
///
/// Used to convert hydrostatic pressure to liquid column height:
/// `level = pressure_pa / (density * g)`.
///
/// Source: ISO 80000-3
pub const GRAVITY_M_PER_S2: f32 = 9.81;

/// Density of water at 4°C (kg/m³).
///
/// Default medium density for submersible pressure sensors when the tank
/// configuration does not specify one.
pub const WATER_DENSITY_KG_PER_M3: f32 = 1000.0;

/// Pascals per bar.
pub const PA_PER_BAR: f32 = 100_000.0;

/// Pascals per psi.
///
/// Source: NIST Handbook 44, Appendix C
pub const PA_PER_PSI: f32 = 6894.76;

/// Pascals per kilopascal.
pub const PA_PER_KPA: f32 = 1000.0;

/// Liters per cubic meter.
pub const LITERS_PER_M3: f32 = 1000.0;

/// Kilograms per tonne.
///
/// Solid/granular inventory is reported in tonnes when bulk density is
/// known.
pub const KG_PER_TONNE: f32 = 1000.0;

/// Millimeters per meter.
///
/// Field sensor frames carry liquid level in millimeters.
pub const MM_PER_M: f32 = 1000.0;
