//! Sensor reading input and environmental plausibility checks
//!
//! A reading is the ephemeral input to the engine: one raw value plus
//! whatever environmental telemetry the device attached. The raw value
//! is validated strictly (a non-finite level is unusable), but the
//! environmental fields are merely *plausibility-windowed* - an
//! implausible temperature is dropped from the record with a
//! low-severity issue note instead of failing the reading.

use crate::constants::tanks::{
    ENV_BATTERY_MAX_PCT, ENV_BATTERY_MIN_PCT, ENV_HUMIDITY_MAX_PCT, ENV_HUMIDITY_MIN_PCT,
    ENV_RSSI_MAX_DBM, ENV_RSSI_MIN_DBM, ENV_TEMP_MAX_C, ENV_TEMP_MIN_C,
};
use crate::errors::{ValidationError, ValidationResult};
use crate::history::{IssueList, IssueSeverity, RecordIssue};
use crate::quality::DataQuality;
use crate::tank::DeviceId;
use crate::time::Timestamp;
use crate::traits::Validate;

/// Environmental telemetry attached to a reading
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Environment {
    /// Ambient temperature, °C
    pub temperature_c: Option<f32>,
    /// Relative humidity, %
    pub humidity_pct: Option<f32>,
    /// Device battery level, %
    pub battery_pct: Option<f32>,
    /// Signal strength as reported by the radio, raw units
    pub rssi_raw: Option<i32>,
    /// Signal strength, dBm
    pub rssi_dbm: Option<f32>,
    /// Device-reported error code, zero meaning none
    pub error_code: Option<i32>,
}

impl Environment {
    /// Drop fields outside their plausibility windows, noting each drop
    ///
    /// Returns the sanitized copy and appends one low-severity issue per
    /// dropped field.
    pub fn sanitized(&self, issues: &mut IssueList) -> Environment {
        let mut out = *self;

        let mut window = |value: &mut Option<f32>, min: f32, max: f32, code: &'static str| {
            if let Some(v) = *value {
                if !v.is_finite() || v < min || v > max {
                    *value = None;
                    let _ = issues.push(RecordIssue {
                        code,
                        message: "value outside plausibility window, dropped",
                        severity: IssueSeverity::Low,
                    });
                }
            }
        };

        window(
            &mut out.temperature_c,
            ENV_TEMP_MIN_C,
            ENV_TEMP_MAX_C,
            "env_temperature",
        );
        window(
            &mut out.humidity_pct,
            ENV_HUMIDITY_MIN_PCT,
            ENV_HUMIDITY_MAX_PCT,
            "env_humidity",
        );
        window(
            &mut out.battery_pct,
            ENV_BATTERY_MIN_PCT,
            ENV_BATTERY_MAX_PCT,
            "env_battery",
        );
        window(
            &mut out.rssi_dbm,
            ENV_RSSI_MIN_DBM,
            ENV_RSSI_MAX_DBM,
            "env_rssi",
        );

        out
    }
}

/// One incoming sensor reading
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SensorReading {
    /// Device that produced the reading
    pub device_id: DeviceId,
    /// Measurement timestamp, ms since the Unix epoch
    pub timestamp: Timestamp,
    /// Raw sensor value, unit depends on the sensor kind
    pub value: f32,
    /// Device- or transport-reported quality tag
    pub quality: DataQuality,
    /// Environmental telemetry, if any
    pub environment: Environment,
}

impl SensorReading {
    /// Reading with the given identity and value, quality `Good`
    pub fn new(device_id: DeviceId, timestamp: Timestamp, value: f32) -> Self {
        Self {
            device_id,
            timestamp,
            value,
            quality: DataQuality::Good,
            environment: Environment::default(),
        }
    }

    /// Duplicate identity: same device at the same millisecond
    pub fn duplicates(&self, device_id: &DeviceId, timestamp: Timestamp) -> bool {
        self.timestamp == timestamp && &self.device_id == device_id
    }
}

impl Validate for SensorReading {
    fn validate(&self) -> ValidationResult<()> {
        if self.device_id.is_empty() {
            return Err(ValidationError::UnknownDevice);
        }
        if !self.value.is_finite() {
            return Err(ValidationError::NotFinite { field: "raw_value" });
        }
        Ok(())
    }
}
