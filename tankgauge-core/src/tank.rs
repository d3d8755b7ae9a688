//! Tank configuration and cached current state
//!
//! A `TankConfig` is owned by the external tank-management collaborator;
//! this engine reads it and writes back only the cached [`TankState`]
//! fields. All configuration bounds live in `Validate::validate` so a
//! registered tank is well-formed for the whole reading path.
//!
//! Cache discipline: volume is clamped to `[0, capacity]`, fill to
//! `[0, 100]`, level to `[0, depth]` on every write. Sensor noise bends
//! the cache to the invariants instead of rejecting the reading.

use heapless::String;

use crate::alert::AlertThresholds;
use crate::constants::tanks::{
    BULK_DENSITY_MAX_KG_M3, BULK_DENSITY_MIN_KG_M3, CAPACITY_MAX_L, CAPACITY_MIN_L,
    OFFSET_DEPTH_MAX_M,
};
use crate::errors::{ValidationError, ValidationResult};
use crate::geometry::TankGeometry;
use crate::level::SensorInstall;
use crate::time::Timestamp;
use crate::traits::Validate;

/// Compact tank identifier
pub type TankId = String<32>;

/// Device serial / identifier as reported on the wire
pub type DeviceId = String<24>;

/// Human-readable tank name
pub type TankName = String<64>;

/// Stored material category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[repr(u8)]
pub enum MaterialKind {
    /// Liquid inventory, reported in liters
    Liquid = 0,
    /// Solid/granular inventory, reported in tonnes when density known
    Solid = 1,
    /// Gas inventory
    Gas = 2,
    /// Mixed-phase inventory
    Mixed = 3,
}

impl MaterialKind {
    /// Stable wire label
    pub const fn label(&self) -> &'static str {
        match self {
            MaterialKind::Liquid => "liquid",
            MaterialKind::Solid => "solid",
            MaterialKind::Gas => "gas",
            MaterialKind::Mixed => "mixed",
        }
    }
}

/// Full tank configuration as registered with the engine
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TankConfig {
    /// Tank identity
    pub id: TankId,
    /// Display name
    pub name: TankName,
    /// Shape, orientation, and dimensions
    pub geometry: TankGeometry,
    /// Nominal capacity, liters
    pub capacity_liters: f32,
    /// Bottom dead space excluded from usable volume, m
    pub offset_depth_m: f32,
    /// Stored material category
    pub material: MaterialKind,
    /// Bulk density, kg/m³; required for solid material
    pub bulk_density_kg_m3: Option<f32>,
    /// Sensor installation parameters
    pub install: SensorInstall,
    /// Device serial bound to this tank, if any
    pub device_serial: Option<DeviceId>,
    /// Alert thresholds in percent
    pub thresholds: AlertThresholds,
}

impl TankConfig {
    /// New configuration with default thresholds and no device binding
    pub fn new(
        id: TankId,
        name: TankName,
        geometry: TankGeometry,
        capacity_liters: f32,
        material: MaterialKind,
        install: SensorInstall,
    ) -> Self {
        Self {
            id,
            name,
            geometry,
            capacity_liters,
            offset_depth_m: 0.0,
            material,
            bulk_density_kg_m3: None,
            install,
            device_serial: None,
            thresholds: AlertThresholds::default(),
        }
    }

    /// Density to use for mass estimates, if known
    pub fn density(&self) -> Option<f32> {
        self.bulk_density_kg_m3
    }
}

impl Validate for TankConfig {
    fn validate(&self) -> ValidationResult<()> {
        if self.id.is_empty() {
            return Err(ValidationError::IdTooLong { field: "tank_id" });
        }

        if !self.capacity_liters.is_finite() {
            return Err(ValidationError::NotFinite { field: "capacity" });
        }
        if !(CAPACITY_MIN_L..=CAPACITY_MAX_L).contains(&self.capacity_liters) {
            return Err(ValidationError::OutOfRange {
                field: "capacity",
                value: self.capacity_liters,
                min: CAPACITY_MIN_L,
                max: CAPACITY_MAX_L,
            });
        }

        if !self.offset_depth_m.is_finite() {
            return Err(ValidationError::NotFinite {
                field: "offset_depth",
            });
        }
        if !(0.0..=OFFSET_DEPTH_MAX_M).contains(&self.offset_depth_m) {
            return Err(ValidationError::OutOfRange {
                field: "offset_depth",
                value: self.offset_depth_m,
                min: 0.0,
                max: OFFSET_DEPTH_MAX_M,
            });
        }

        match self.bulk_density_kg_m3 {
            Some(density) => {
                if !density.is_finite() {
                    return Err(ValidationError::NotFinite {
                        field: "bulk_density",
                    });
                }
                if !(BULK_DENSITY_MIN_KG_M3..=BULK_DENSITY_MAX_KG_M3).contains(&density) {
                    return Err(ValidationError::OutOfRange {
                        field: "bulk_density",
                        value: density,
                        min: BULK_DENSITY_MIN_KG_M3,
                        max: BULK_DENSITY_MAX_KG_M3,
                    });
                }
            }
            None => {
                if self.material == MaterialKind::Solid {
                    return Err(ValidationError::MissingDensity {
                        reason: "solid material",
                    });
                }
            }
        }

        // Geometry violations surface as validation failures at the
        // configuration boundary rather than computation errors later.
        if self.geometry.validate().is_err() {
            return Err(ValidationError::OutOfRange {
                field: "dimensions",
                value: 0.0,
                min: 0.0,
                max: 0.0,
            });
        }

        self.thresholds.validate()
    }
}

/// Cached current state, the only tank fields this engine writes
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TankState {
    /// Current volume, liters
    pub current_volume_liters: f32,
    /// Current fill percentage
    pub current_fill_percent: f32,
    /// Current liquid level, m
    pub current_level_m: f32,
    /// Timestamp of the last accepted reading
    pub last_reading_at: Option<Timestamp>,
}

impl TankState {
    /// Overwrite the cache with a new reading's results, clamped to the
    /// tank's invariants
    pub fn apply(
        &mut self,
        volume_liters: f32,
        fill_percent: f32,
        level_m: f32,
        timestamp: Timestamp,
        config: &TankConfig,
    ) {
        self.current_volume_liters = volume_liters.max(0.0).min(config.capacity_liters);
        self.current_fill_percent = fill_percent.max(0.0).min(100.0);
        self.current_level_m = level_m.max(0.0).min(config.geometry.depth());
        self.last_reading_at = Some(timestamp);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::SensorKind;

    fn config() -> TankConfig {
        TankConfig::new(
            TankId::try_from("tank-1").unwrap(),
            TankName::try_from("Test Tank").unwrap(),
            TankGeometry::VerticalCylinder {
                diameter: 2.0,
                height: 3.0,
            },
            9000.0,
            MaterialKind::Liquid,
            SensorInstall::new(SensorKind::Ultrasonic),
        )
    }

    #[test]
    fn valid_config_passes() {
        assert_eq!(config().validate(), Ok(()));
    }

    #[test]
    fn solid_without_density_rejected() {
        let mut cfg = config();
        cfg.material = MaterialKind::Solid;
        assert!(matches!(
            cfg.validate(),
            Err(ValidationError::MissingDensity { .. })
        ));

        cfg.bulk_density_kg_m3 = Some(1600.0);
        assert_eq!(cfg.validate(), Ok(()));
    }

    #[test]
    fn capacity_bounds_enforced() {
        let mut cfg = config();
        cfg.capacity_liters = 0.0;
        assert!(matches!(
            cfg.validate(),
            Err(ValidationError::OutOfRange { field: "capacity", .. })
        ));
    }

    #[test]
    fn state_apply_clamps_to_invariants() {
        let cfg = config();
        let mut state = TankState::default();
        // Over-capacity volume, over-range fill, over-depth level
        state.apply(20_000.0, 120.0, 9.0, 1000, &cfg);
        assert_eq!(state.current_volume_liters, 9000.0);
        assert_eq!(state.current_fill_percent, 100.0);
        assert_eq!(state.current_level_m, 3.0);
        assert_eq!(state.last_reading_at, Some(1000));

        state.apply(-50.0, -2.0, -0.5, 2000, &cfg);
        assert_eq!(state.current_volume_liters, 0.0);
        assert_eq!(state.current_fill_percent, 0.0);
        assert_eq!(state.current_level_m, 0.0);
    }
}
