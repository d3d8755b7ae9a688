//! Sensor reading to liquid level conversion
//!
//! Each sensor mounting kind reports a different quantity: top-mounted
//! ultrasonic and laser units measure the air gap down to the surface,
//! submersible transmitters measure hydrostatic pressure, radar probes
//! measure distance along a guide, floats and capacitive probes report
//! the level more or less directly. This module normalizes all of them
//! to one number: liquid height above the tank bottom, in meters,
//! clamped to `[0, tank depth]`.

use crate::constants::physics::{
    GRAVITY_M_PER_S2, PA_PER_BAR, PA_PER_KPA, PA_PER_PSI, WATER_DENSITY_KG_PER_M3,
};
use crate::errors::{ComputationError, ProcessingError, ValidationError};

/// Sensor mounting kind, fixed per tank installation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[repr(u8)]
pub enum SensorKind {
    /// Top-mounted ultrasonic, reading is air gap to surface
    Ultrasonic = 0,
    /// Top-mounted laser, reading is air gap to surface
    Laser = 1,
    /// Bottom-mounted pressure transmitter
    PressureSubmersible = 2,
    /// Guided-wave radar probe
    GuidedWaveRadar = 3,
    /// Mechanical float gauge
    FloatLevel = 4,
    /// Capacitive probe
    Capacitive = 5,
    /// Unconfigured or vendor-specific kind, reading passed through
    Unknown = 6,
}

impl SensorKind {
    /// Human-readable name for logs and processing metadata
    pub const fn name(&self) -> &'static str {
        match self {
            SensorKind::Ultrasonic => "ultrasonic",
            SensorKind::Laser => "laser",
            SensorKind::PressureSubmersible => "pressure_submersible",
            SensorKind::GuidedWaveRadar => "guided_wave_radar",
            SensorKind::FloatLevel => "float_level",
            SensorKind::Capacitive => "capacitive",
            SensorKind::Unknown => "unknown",
        }
    }

    /// Unit of the raw reading this kind produces
    pub const fn unit(&self) -> &'static str {
        match self {
            SensorKind::Ultrasonic | SensorKind::Laser => "m (air gap)",
            SensorKind::PressureSubmersible => "pressure",
            SensorKind::GuidedWaveRadar => "m (probe distance)",
            SensorKind::FloatLevel | SensorKind::Unknown => "m",
            SensorKind::Capacitive => "% or m",
        }
    }
}

/// Pressure unit reported by a submersible transmitter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PressureUnit {
    /// Pascals, no conversion
    Pascal,
    /// Bar, ×100000
    Bar,
    /// Pounds per square inch, ×6894.76
    Psi,
    /// Kilopascals, ×1000
    KiloPascal,
}

impl PressureUnit {
    /// Convert a reading in this unit to pascals
    pub fn to_pascals(&self, value: f32) -> f32 {
        match self {
            PressureUnit::Pascal => value,
            PressureUnit::Bar => value * PA_PER_BAR,
            PressureUnit::Psi => value * PA_PER_PSI,
            PressureUnit::KiloPascal => value * PA_PER_KPA,
        }
    }
}

/// Per-tank sensor installation parameters
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SensorInstall {
    /// Mounting kind
    pub kind: SensorKind,
    /// Distance from the sensor face to the tank top, m (top-mounted kinds)
    pub mount_offset_m: f32,
    /// Radar probe length, m; defaults to tank depth when `None`
    pub probe_length_m: Option<f32>,
    /// Float gauge zero offset, m
    pub float_offset_m: f32,
    /// Medium density for pressure conversion, kg/m³; water when `None`
    pub medium_density_kg_m3: Option<f32>,
    /// Pressure unit of the raw reading
    pub pressure_unit: PressureUnit,
    /// Whether a capacitive probe reports percent-of-depth
    pub capacitive_percent: bool,
}

impl SensorInstall {
    /// Installation with the given kind and neutral parameters
    pub fn new(kind: SensorKind) -> Self {
        Self {
            kind,
            mount_offset_m: 0.0,
            probe_length_m: None,
            float_offset_m: 0.0,
            medium_density_kg_m3: None,
            pressure_unit: PressureUnit::Pascal,
            capacitive_percent: false,
        }
    }
}

impl Default for SensorInstall {
    fn default() -> Self {
        Self::new(SensorKind::Unknown)
    }
}

/// Outcome of a level conversion
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelConversion {
    /// Liquid height above the tank bottom, m, within `[0, depth]`
    pub level_m: f32,
    /// Set when the conversion had to pass the raw value through
    /// because the sensor kind is unknown; degrades quality to `fair`
    pub degraded: bool,
}

/// Convert a raw sensor value to a liquid level
///
/// `tank_depth_m` comes from [`crate::TankGeometry::depth`]. The result
/// is clamped to `[0, tank_depth_m]`; a non-positive depth is a
/// configuration defect fatal to this reading only.
pub fn convert_to_level(
    raw: f32,
    install: &SensorInstall,
    tank_depth_m: f32,
) -> Result<LevelConversion, ProcessingError> {
    if !raw.is_finite() {
        return Err(ValidationError::NotFinite { field: "raw_value" }.into());
    }
    if tank_depth_m <= 0.0 || !tank_depth_m.is_finite() {
        return Err(ComputationError::DegenerateGeometry {
            reason: "tank depth",
        }
        .into());
    }

    let mut degraded = false;
    let level = match install.kind {
        SensorKind::Ultrasonic | SensorKind::Laser => {
            tank_depth_m - raw - install.mount_offset_m
        }
        SensorKind::PressureSubmersible => {
            let density = install
                .medium_density_kg_m3
                .unwrap_or(WATER_DENSITY_KG_PER_M3);
            install.pressure_unit.to_pascals(raw) / (density * GRAVITY_M_PER_S2)
        }
        SensorKind::GuidedWaveRadar => {
            install.probe_length_m.unwrap_or(tank_depth_m) - raw
        }
        SensorKind::FloatLevel => raw - install.float_offset_m,
        SensorKind::Capacitive => {
            if install.capacitive_percent {
                raw / 100.0 * tank_depth_m
            } else {
                raw
            }
        }
        SensorKind::Unknown => {
            degraded = true;
            raw
        }
    };

    Ok(LevelConversion {
        level_m: level.max(0.0).min(tank_depth_m),
        degraded,
    })
}
