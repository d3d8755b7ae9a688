//! Volume computation with unit conversion and capacity clamping
//!
//! Wraps the raw geometry math with the engine's reporting rules:
//! usable volume excludes the dead-space fill, fill percentage is the
//! occupied share of *usable* volume clamped to `[0, 100]`, the final
//! liter figure is clamped to the configured capacity, and the material
//! kind drives the unit the quantity is reported in.

use crate::constants::physics::{KG_PER_TONNE, LITERS_PER_M3};
use crate::errors::ComputationResult;
use crate::geometry::TankGeometry;
use crate::tank::MaterialKind;

/// Unit a tank's inventory is reported in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ReportingUnit {
    /// Liquids
    Liters,
    /// Solids with known bulk density
    Tonnes,
    /// Everything else
    CubicMeters,
}

impl ReportingUnit {
    /// Stable wire label
    pub const fn label(&self) -> &'static str {
        match self {
            ReportingUnit::Liters => "liters",
            ReportingUnit::Tonnes => "tonnes",
            ReportingUnit::CubicMeters => "cubic_meters",
        }
    }
}

/// Complete volume figures derived from one level measurement
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VolumeComputation {
    /// Liquid level the figures were computed from, m
    pub level_m: f32,
    /// Occupied volume, m³
    pub volume_m3: f32,
    /// Occupied volume, liters, clamped to capacity
    pub volume_liters: f32,
    /// Volume of the completely full tank, m³
    pub total_volume_m3: f32,
    /// Volume occupied by the bottom dead space, m³
    pub dead_space_volume_m3: f32,
    /// Total minus dead space, m³
    pub usable_volume_m3: f32,
    /// Occupied share of usable volume, percent, clamped to `[0, 100]`
    pub fill_percent: f32,
    /// Estimated mass, kg, when density is known
    pub mass_kg: Option<f32>,
    /// Reported quantity in the material's unit
    pub quantity: f32,
    /// Unit of `quantity`
    pub unit: ReportingUnit,
}

impl VolumeComputation {
    /// Compute all volume figures for a level measurement
    ///
    /// `density_kg_m3` enables the mass estimate and, for solids, the
    /// tonnes reporting unit.
    pub fn compute(
        geometry: &TankGeometry,
        offset_depth_m: f32,
        level_m: f32,
        capacity_liters: f32,
        material: MaterialKind,
        density_kg_m3: Option<f32>,
    ) -> ComputationResult<Self> {
        let volume_m3 = geometry.volume_at_level(level_m, offset_depth_m)?;
        let total_volume_m3 = geometry.total_volume();

        // Dead space uses the geometry's own shape, not a cylinder
        // approximation, so usable capacity is consistent per variant.
        let dead_space_volume_m3 = if offset_depth_m > 0.0 {
            geometry.volume_at_level(offset_depth_m, 0.0)?
        } else {
            0.0
        };
        let usable_volume_m3 = (total_volume_m3 - dead_space_volume_m3).max(0.0);

        let fill_percent = if usable_volume_m3 > 0.0 {
            (volume_m3 / usable_volume_m3 * 100.0).max(0.0).min(100.0)
        } else {
            0.0
        };

        let volume_liters = (volume_m3 * LITERS_PER_M3).min(capacity_liters).max(0.0);
        let mass_kg = density_kg_m3.map(|d| volume_m3 * d);

        let (quantity, unit) = match material {
            MaterialKind::Liquid => (volume_liters, ReportingUnit::Liters),
            MaterialKind::Solid => match mass_kg {
                Some(mass) => (mass / KG_PER_TONNE, ReportingUnit::Tonnes),
                None => (volume_m3, ReportingUnit::CubicMeters),
            },
            MaterialKind::Gas | MaterialKind::Mixed => (volume_m3, ReportingUnit::CubicMeters),
        };

        Ok(Self {
            level_m,
            volume_m3,
            volume_liters,
            total_volume_m3,
            dead_space_volume_m3,
            usable_volume_m3,
            fill_percent,
            mass_kg,
            quantity,
            unit,
        })
    }
}
