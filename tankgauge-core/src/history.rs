//! Immutable volume history records
//!
//! One record per processed reading, append-only. Each record embeds a
//! snapshot of the tank's geometry and thresholds at record time so
//! history stays faithful even after the tank is reconfigured, plus
//! processing metadata describing how (and how well) the figures were
//! derived.

use heapless::Vec;

use crate::alert::{AlertThresholds, FillStatus};
use crate::geometry::TankGeometry;
use crate::quality::DataQuality;
use crate::reading::Environment;
use crate::tank::{DeviceId, MaterialKind, TankConfig, TankId, TankName};
use crate::time::Timestamp;

/// Severity of a per-record issue note
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[repr(u8)]
pub enum IssueSeverity {
    /// Informational, figures unaffected
    Low = 0,
    /// Figures derived but suspect
    Medium = 1,
    /// Figures degraded or placeholder
    High = 2,
}

/// One issue observed while processing a reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RecordIssue {
    /// Stable machine-readable code
    pub code: &'static str,
    /// Human-readable explanation
    pub message: &'static str,
    /// Severity
    pub severity: IssueSeverity,
}

/// Bounded issue list attached to a record
pub type IssueList = Vec<RecordIssue, 8>;

/// Where a record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[repr(u8)]
pub enum RecordSource {
    /// Computed from a device reading
    SensorReading = 0,
    /// Operator-entered volume adjustment
    ManualAdjustment = 1,
}

/// Snapshot of the tank configuration at record time
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TankSnapshot {
    /// Tank display name
    pub name: TankName,
    /// Geometry at record time
    pub geometry: TankGeometry,
    /// Capacity, liters
    pub capacity_liters: f32,
    /// Bottom dead space, m
    pub offset_depth_m: f32,
    /// Stored material
    pub material: MaterialKind,
    /// Bulk density, kg/m³, if configured
    pub bulk_density_kg_m3: Option<f32>,
    /// Alert thresholds at record time
    pub thresholds: AlertThresholds,
}

impl TankSnapshot {
    /// Capture the fields history needs from a live configuration
    pub fn capture(config: &TankConfig) -> Self {
        Self {
            name: config.name.clone(),
            geometry: config.geometry,
            capacity_liters: config.capacity_liters,
            offset_depth_m: config.offset_depth_m,
            material: config.material,
            bulk_density_kg_m3: config.bulk_density_kg_m3,
            thresholds: config.thresholds,
        }
    }
}

/// How the record's figures were produced
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProcessingInfo {
    /// When the engine processed the reading
    pub processed_at: Timestamp,
    /// Engine version that produced the record
    pub version: &'static str,
    /// Calculation method (geometry dispatch, manual entry, ...)
    pub method: &'static str,
    /// Sensor kind name the level conversion used
    pub sensor_kind: &'static str,
    /// Whether all validation passed without degradation
    pub validation_passed: bool,
    /// Error text when the record is degraded
    pub error: Option<&'static str>,
}

/// Immutable per-reading history record
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(bound(deserialize = "'de: 'static")))]
pub struct VolumeRecord {
    /// Tank the record belongs to
    pub tank_id: TankId,
    /// Device that produced the underlying reading
    pub device_id: DeviceId,
    /// Measurement timestamp, ms since the Unix epoch
    pub timestamp: Timestamp,
    /// Raw sensor value before conversion
    pub raw_sensor_reading: f32,
    /// Liquid level above the tank bottom, m
    pub level_m: f32,
    /// Occupied volume, liters
    pub volume_liters: f32,
    /// Occupied volume, m³
    pub volume_m3: f32,
    /// Fill percentage, clamped to `[0, 100]`
    pub fill_percent: f32,
    /// Estimated mass, kg, when density known
    pub mass_kg: Option<f32>,
    /// Categorical quality tag
    pub quality: DataQuality,
    /// Numeric quality score, 0-100
    pub quality_score: u8,
    /// Tank configuration at record time
    pub snapshot: TankSnapshot,
    /// Environmental fields that passed plausibility
    pub environment: Environment,
    /// Issues observed while processing
    pub issues: IssueList,
    /// Processing metadata
    pub processing: ProcessingInfo,
    /// Origin of the record
    pub source: RecordSource,
}

impl VolumeRecord {
    /// Fill status against the thresholds captured in the snapshot
    pub fn alert_level(&self) -> FillStatus {
        self.snapshot.thresholds.evaluate(self.fill_percent)
    }

    /// Whether this record feeds averages and summaries
    pub fn is_trusted(&self) -> bool {
        self.quality.is_trusted()
    }
}
