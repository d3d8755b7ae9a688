//! Core telemetry engine for TankGauge
//!
//! Converts raw level/pressure/radar sensor readings into authoritative
//! volume, fill-percentage, and flow figures for storage tanks of varied
//! geometry, and maintains rolling hourly/daily/weekly/monthly analytics.
//!
//! Key constraints:
//! - Pure computation layer (geometry, level conversion, bucketing) is
//!   `no_std`-capable for gateway-class hardware
//! - Per-tank processing is strictly serialized; tanks are independent
//! - One bad reading never aborts the rest of a batch
//!
//! ```no_run
//! use tankgauge_core::{TankGeometry, VolumeComputation, MaterialKind};
//!
//! let geometry = TankGeometry::VerticalCylinder { diameter: 2.0, height: 3.0 };
//! let volume = VolumeComputation::compute(
//!     &geometry, 0.0, 1.5, 10_000.0, MaterialKind::Liquid, None,
//! ).unwrap();
//!
//! assert!((volume.volume_m3 - 4.712).abs() < 0.001);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod alert;
pub mod analytics;
pub mod bucket;
pub mod constants;
pub mod errors;
pub mod frame;
pub mod geometry;
pub mod history;
pub mod level;
pub mod quality;
pub mod reading;
pub mod tank;
pub mod time;
pub mod traits;
pub mod volume;

#[cfg(feature = "std")]
pub mod engine;
#[cfg(feature = "std")]
pub mod store;

// Public API
pub use alert::{AlertThresholds, FillStatus};
pub use analytics::{FlowSample, PeriodKey, PeriodRecord, VolumePoint, WeightStats};
pub use bucket::{PeriodType, ALL_PERIODS};
pub use errors::{
    ComputationError, ComputationResult, PersistenceError, PersistenceResult, ProcessingError,
    ProcessingResult, ValidationError, ValidationResult,
};
pub use frame::{DeviceFrame, FrameError};
pub use geometry::{Dimensions, Orientation, TankGeometry};
pub use history::{
    IssueList, IssueSeverity, ProcessingInfo, RecordIssue, RecordSource, TankSnapshot, VolumeRecord,
};
pub use level::{convert_to_level, LevelConversion, PressureUnit, SensorInstall, SensorKind};
pub use quality::DataQuality;
pub use reading::{Environment, SensorReading};
pub use tank::{DeviceId, MaterialKind, TankConfig, TankId, TankName, TankState};
pub use time::{FixedClock, TimeSource, Timestamp};
pub use traits::Validate;
pub use volume::{ReportingUnit, VolumeComputation};

#[cfg(feature = "std")]
pub use engine::{
    HistoryQuery, ManualAdjustment, ProcessOutcome, SummaryWindow, UsageTotals, VolumeEngine,
    VolumeSummary,
};
#[cfg(feature = "std")]
pub use store::{MemoryAnalyticsStore, MemoryHistoryStore};
#[cfg(feature = "std")]
pub use time::WallClock;
#[cfg(feature = "std")]
pub use traits::{AnalyticsStore, HistoryStore};

/// Crate version, stamped into each record's processing metadata
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
