//! Reading-to-record orchestration
//!
//! [`VolumeEngine`] owns the whole conversion path: level conversion,
//! volume computation, history recording, tank cache updates, period
//! analytics fan-out, and fill-status evaluation. Tanks are registered
//! up front; readings then arrive by tank id, by bound device serial,
//! or as raw vendor frames.
//!
//! Concurrency: readings for different tanks may be processed from any
//! number of threads. Within one tank, the entire fetch-previous →
//! compute → append → aggregate sequence runs under that tank's mutex,
//! so the analytics update always sees the same previous-record snapshot
//! the delta decision used. One reading's failure never aborts a batch.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use log::{debug, warn};

use crate::alert::FillStatus;
use crate::analytics::{FlowSample, PeriodKey, PeriodRecord};
use crate::bucket::{PeriodType, ALL_PERIODS};
use crate::constants::physics::LITERS_PER_M3;
use crate::constants::time::{WINDOW_24H_MS, WINDOW_30D_MS, WINDOW_7D_MS, WINDOW_90D_MS};
use crate::errors::{
    ComputationError, PersistenceError, ProcessingError, ProcessingResult, ValidationError,
    ValidationResult,
};
use crate::frame::DeviceFrame;
use crate::history::{
    IssueList, IssueSeverity, ProcessingInfo, RecordIssue, RecordSource, TankSnapshot, VolumeRecord,
};
use crate::level::convert_to_level;
use crate::quality::DataQuality;
use crate::reading::{Environment, SensorReading};
use crate::tank::{DeviceId, TankConfig, TankId, TankState};
use crate::time::{TimeSource, Timestamp, WallClock};
use crate::traits::{AnalyticsStore, HistoryStore, Validate};
use crate::volume::VolumeComputation;

/// Outcome of processing one reading
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessOutcome {
    /// A history record was written
    Recorded {
        /// The record as persisted
        record: VolumeRecord,
        /// Fill status for the external alerting path
        status: FillStatus,
    },
    /// Reading repeated the tank's latest (device, timestamp) pair
    Duplicate,
}

/// Operator-supplied volume entry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ManualAdjustment {
    /// Entered volume, liters
    pub volume_liters: f32,
    /// Entered volume, m³; derived from liters when absent
    pub volume_m3: Option<f32>,
    /// Entered level, m; zero when absent
    pub level_m: Option<f32>,
    /// Entered fill percentage; derived from capacity when absent
    pub fill_percent: Option<f32>,
    /// Entry timestamp; engine clock when absent
    pub timestamp: Option<Timestamp>,
    /// Gauge reading noted by the operator, if any
    pub raw_reading: f32,
}

impl ManualAdjustment {
    /// Adjustment carrying only a volume figure
    pub fn of_volume(volume_liters: f32) -> Self {
        Self {
            volume_liters,
            volume_m3: None,
            level_m: None,
            fill_percent: None,
            timestamp: None,
            raw_reading: 0.0,
        }
    }
}

/// Fixed summary windows offered by the query surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryWindow {
    /// Last 24 hours
    Day,
    /// Last 7 days
    Week,
    /// Last 30 days
    Month,
    /// Last 90 days
    Quarter,
}

impl SummaryWindow {
    /// Window width in milliseconds
    pub const fn width_ms(&self) -> u64 {
        match self {
            SummaryWindow::Day => WINDOW_24H_MS,
            SummaryWindow::Week => WINDOW_7D_MS,
            SummaryWindow::Month => WINDOW_30D_MS,
            SummaryWindow::Quarter => WINDOW_90D_MS,
        }
    }
}

/// Windowed statistics over trusted-quality records
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VolumeSummary {
    /// Trusted records in the window
    pub count: usize,
    /// Average volume, liters
    pub avg_volume_liters: f32,
    /// Minimum volume, liters
    pub min_volume_liters: f32,
    /// Maximum volume, liters
    pub max_volume_liters: f32,
    /// Average fill percentage
    pub avg_fill_percent: f32,
    /// Minimum fill percentage
    pub min_fill_percent: f32,
    /// Maximum fill percentage
    pub max_fill_percent: f32,
    /// Average level, m
    pub avg_level_m: f32,
    /// Average quality score
    pub avg_quality_score: f32,
    /// Last volume minus first volume in the window, liters
    pub net_change_liters: f32,
}

/// Usage and addition totals over an arbitrary range
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UsageTotals {
    /// Sum of volume draws, liters
    pub used_liters: f32,
    /// Sum of volume fills, liters
    pub added_liters: f32,
}

/// History window query
#[derive(Debug, Clone, Copy)]
pub struct HistoryQuery {
    /// Earliest timestamp, inclusive
    pub since: Timestamp,
    /// Latest timestamp, inclusive
    pub until: Timestamp,
    /// Keep only records with this quality tag
    pub quality: Option<DataQuality>,
    /// Maximum records returned, newest first
    pub limit: usize,
}

struct TankEntry {
    config: TankConfig,
    state: TankState,
}

/// The conversion-and-aggregation engine
pub struct VolumeEngine<H, A, C = WallClock> {
    tanks: RwLock<HashMap<TankId, Arc<Mutex<TankEntry>>>>,
    devices: RwLock<HashMap<DeviceId, TankId>>,
    history: Mutex<H>,
    analytics: Mutex<A>,
    clock: C,
}

impl<H, A> VolumeEngine<H, A, WallClock>
where
    H: HistoryStore,
    A: AnalyticsStore,
{
    /// Engine over the given stores, stamped by the wall clock
    pub fn new(history: H, analytics: A) -> Self {
        Self::with_clock(history, analytics, WallClock)
    }
}

impl<H, A, C> VolumeEngine<H, A, C>
where
    H: HistoryStore,
    A: AnalyticsStore,
    C: TimeSource,
{
    /// Engine over the given stores and clock
    pub fn with_clock(history: H, analytics: A, clock: C) -> Self {
        Self {
            tanks: RwLock::new(HashMap::new()),
            devices: RwLock::new(HashMap::new()),
            history: Mutex::new(history),
            analytics: Mutex::new(analytics),
            clock,
        }
    }

    /// Register a tank, replacing any previous configuration under its id
    ///
    /// Threshold ordering, capacity, density, and geometry bounds are all
    /// enforced here so the reading path never sees a malformed tank.
    pub fn register_tank(&self, config: TankConfig) -> ValidationResult<()> {
        config.validate()?;
        if let Some(serial) = &config.device_serial {
            self.devices
                .write()
                .expect("device map poisoned")
                .insert(serial.clone(), config.id.clone());
        }
        debug!("registered tank {} ({})", config.id, config.name);
        self.tanks.write().expect("tank map poisoned").insert(
            config.id.clone(),
            Arc::new(Mutex::new(TankEntry {
                config,
                state: TankState::default(),
            })),
        );
        Ok(())
    }

    /// Cached current state for a tank
    pub fn tank_state(&self, tank_id: &TankId) -> Option<TankState> {
        let tanks = self.tanks.read().expect("tank map poisoned");
        let entry = tanks.get(tank_id)?.clone();
        drop(tanks);
        let entry = entry.lock().expect("tank entry poisoned");
        Some(entry.state)
    }

    /// Process one reading for a known tank
    pub fn process_reading(
        &self,
        tank_id: &TankId,
        reading: &SensorReading,
    ) -> ProcessingResult<ProcessOutcome> {
        let entry = self.lookup_tank(tank_id)?;
        // Per-tank critical section: previous-record fetch, delta
        // decision, append, cache update, and analytics all inside.
        let mut entry = entry.lock().expect("tank entry poisoned");

        reading.validate()?;

        let previous = self
            .history
            .lock()
            .expect("history store poisoned")
            .latest(tank_id)?;

        if let Some(prev) = &previous {
            if prev.device_id == reading.device_id && prev.timestamp == reading.timestamp {
                debug!(
                    "duplicate reading for tank {} at {}, suppressed",
                    tank_id, reading.timestamp
                );
                return Ok(ProcessOutcome::Duplicate);
            }
        }

        let record = self.build_record(&entry.config, reading)?;

        self.history
            .lock()
            .expect("history store poisoned")
            .append(record.clone())?;

        // Cache update only after the append succeeded
        let config = entry.config.clone();
        entry.state.apply(
            record.volume_liters,
            record.fill_percent,
            record.level_m,
            record.timestamp,
            &config,
        );

        // Analytics sees the identical previous-record snapshot the
        // duplicate/delta decisions used. Failures are logged, never
        // propagated: flow totals can be rebuilt from history.
        if let Err(err) = self.update_analytics(tank_id, &record, previous.as_ref()) {
            warn!("analytics update failed for tank {}: {}", tank_id, err);
        }

        let status = config.thresholds.evaluate(record.fill_percent);
        debug!(
            "tank {}: {:.1} L ({:.1}%), status {}",
            tank_id,
            record.volume_liters,
            record.fill_percent,
            status.label()
        );
        Ok(ProcessOutcome::Recorded { record, status })
    }

    /// Process a reading addressed by its device serial
    pub fn process_for_device(
        &self,
        device: &DeviceId,
        reading: &SensorReading,
    ) -> ProcessingResult<ProcessOutcome> {
        let tank_id = {
            let devices = self.devices.read().expect("device map poisoned");
            devices
                .get(device)
                .cloned()
                .ok_or(ValidationError::UnknownDevice)?
        };
        self.process_reading(&tank_id, reading)
    }

    /// Decode a vendor frame line and process it against its bound tank
    pub fn process_frame(&self, line: &str) -> ProcessingResult<ProcessOutcome> {
        let frame = DeviceFrame::parse(line)?;
        let device = DeviceId::try_from(frame.serial.as_str())
            .map_err(|_| ValidationError::IdTooLong { field: "device_id" })?;

        let value = frame
            .level_m
            .ok_or(ValidationError::NotFinite { field: "level" })?;

        let mut reading = SensorReading::new(
            device.clone(),
            frame.timestamp.unwrap_or_else(|| self.clock.now()),
            value,
        );
        reading.environment = Environment {
            temperature_c: frame.temperature_c,
            humidity_pct: frame.humidity_pct,
            battery_pct: None,
            rssi_raw: frame.rssi_raw,
            rssi_dbm: frame.rssi_dbm,
            error_code: frame.error_code,
        };
        self.process_for_device(&device, &reading)
    }

    /// Process a batch; one reading's failure never aborts the rest
    pub fn process_batch<'a, I>(&self, readings: I) -> Vec<ProcessingResult<ProcessOutcome>>
    where
        I: IntoIterator<Item = (&'a TankId, &'a SensorReading)>,
    {
        readings
            .into_iter()
            .map(|(tank_id, reading)| {
                let result = self.process_reading(tank_id, reading);
                if let Err(err) = &result {
                    warn!("reading for tank {} skipped: {}", tank_id, err);
                }
                result
            })
            .collect()
    }

    /// Record an operator-entered volume adjustment
    ///
    /// Writes a `manual` quality record and updates the tank cache.
    /// Manual entries do not feed period analytics; the next sensor
    /// reading computes its delta against this record naturally.
    pub fn manual_adjustment(
        &self,
        tank_id: &TankId,
        adjustment: &ManualAdjustment,
    ) -> ProcessingResult<VolumeRecord> {
        let entry = self.lookup_tank(tank_id)?;
        let mut entry = entry.lock().expect("tank entry poisoned");
        let config = entry.config.clone();

        if !adjustment.volume_liters.is_finite() {
            return Err(ValidationError::NotFinite { field: "volume" }.into());
        }

        let volume_liters = adjustment
            .volume_liters
            .max(0.0)
            .min(config.capacity_liters);
        let volume_m3 = adjustment
            .volume_m3
            .unwrap_or(volume_liters / LITERS_PER_M3);
        let fill_percent = adjustment
            .fill_percent
            .unwrap_or_else(|| {
                if config.capacity_liters > 0.0 {
                    volume_liters / config.capacity_liters * 100.0
                } else {
                    0.0
                }
            })
            .max(0.0)
            .min(100.0);
        let timestamp = adjustment.timestamp.unwrap_or_else(|| self.clock.now());
        let device_id = config
            .device_serial
            .clone()
            .unwrap_or_else(|| DeviceId::try_from("MANUAL_ENTRY").unwrap_or_default());

        let record = VolumeRecord {
            tank_id: tank_id.clone(),
            device_id,
            timestamp,
            raw_sensor_reading: adjustment.raw_reading,
            level_m: adjustment.level_m.unwrap_or(0.0),
            volume_liters,
            volume_m3,
            fill_percent,
            mass_kg: config.density().map(|d| volume_m3 * d),
            quality: DataQuality::Manual,
            quality_score: DataQuality::Manual.score(),
            snapshot: TankSnapshot::capture(&config),
            environment: Environment::default(),
            issues: IssueList::new(),
            processing: ProcessingInfo {
                processed_at: self.clock.now(),
                version: crate::VERSION,
                method: "manual_entry",
                sensor_kind: "manual",
                validation_passed: true,
                error: None,
            },
            source: RecordSource::ManualAdjustment,
        };

        self.history
            .lock()
            .expect("history store poisoned")
            .append(record.clone())?;

        entry.state.apply(
            record.volume_liters,
            record.fill_percent,
            record.level_m,
            record.timestamp,
            &config,
        );
        Ok(record)
    }

    /// Latest history record for a tank
    pub fn latest(&self, tank_id: &TankId) -> ProcessingResult<Option<VolumeRecord>> {
        Ok(self
            .history
            .lock()
            .expect("history store poisoned")
            .latest(tank_id)?)
    }

    /// Windowed history, newest first
    pub fn history_window(
        &self,
        tank_id: &TankId,
        query: &HistoryQuery,
    ) -> ProcessingResult<Vec<VolumeRecord>> {
        let mut records = self
            .history
            .lock()
            .expect("history store poisoned")
            .range(tank_id, query.since, query.until)?;
        if let Some(quality) = query.quality {
            records.retain(|r| r.quality == quality);
        }
        records.truncate(query.limit);
        Ok(records)
    }

    /// Summary statistics over a fixed window, trusted qualities only
    pub fn summary(
        &self,
        tank_id: &TankId,
        window: SummaryWindow,
    ) -> ProcessingResult<Option<VolumeSummary>> {
        let until = self.clock.now();
        let since = until.saturating_sub(window.width_ms());
        let mut records = self
            .history
            .lock()
            .expect("history store poisoned")
            .range(tank_id, since, until)?;
        records.retain(VolumeRecord::is_trusted);
        if records.is_empty() {
            return Ok(None);
        }
        records.reverse(); // chronological

        let count = records.len();
        let n = count as f32;
        let mut summary = VolumeSummary {
            count,
            min_volume_liters: f32::MAX,
            max_volume_liters: f32::MIN,
            min_fill_percent: f32::MAX,
            max_fill_percent: f32::MIN,
            ..VolumeSummary::default()
        };
        for record in &records {
            summary.avg_volume_liters += record.volume_liters / n;
            summary.avg_fill_percent += record.fill_percent / n;
            summary.avg_level_m += record.level_m / n;
            summary.avg_quality_score += record.quality_score as f32 / n;
            summary.min_volume_liters = summary.min_volume_liters.min(record.volume_liters);
            summary.max_volume_liters = summary.max_volume_liters.max(record.volume_liters);
            summary.min_fill_percent = summary.min_fill_percent.min(record.fill_percent);
            summary.max_fill_percent = summary.max_fill_percent.max(record.fill_percent);
        }
        summary.net_change_liters =
            records[count - 1].volume_liters - records[0].volume_liters;
        Ok(Some(summary))
    }

    /// Chronological usage and addition totals over an arbitrary range
    pub fn usage_between(
        &self,
        tank_id: &TankId,
        since: Timestamp,
        until: Timestamp,
    ) -> ProcessingResult<UsageTotals> {
        let mut records = self
            .history
            .lock()
            .expect("history store poisoned")
            .range(tank_id, since, until)?;
        records.reverse(); // chronological

        let mut totals = UsageTotals::default();
        for pair in records.windows(2) {
            let delta = pair[1].volume_liters - pair[0].volume_liters;
            if delta > 0.0 {
                totals.added_liters += delta;
            } else {
                totals.used_liters += -delta;
            }
        }
        Ok(totals)
    }

    /// All analytics buckets for one tank and period type, oldest first
    pub fn analytics(
        &self,
        tank_id: &TankId,
        period: PeriodType,
    ) -> ProcessingResult<Vec<PeriodRecord>> {
        Ok(self
            .analytics
            .lock()
            .expect("analytics store poisoned")
            .list(tank_id, period)?)
    }

    fn lookup_tank(&self, tank_id: &TankId) -> ProcessingResult<Arc<Mutex<TankEntry>>> {
        let tanks = self.tanks.read().expect("tank map poisoned");
        tanks
            .get(tank_id)
            .cloned()
            .ok_or_else(|| ValidationError::UnknownTank.into())
    }

    /// Build the history record for a reading, degrading instead of
    /// failing wherever a meaningful record can still be written
    fn build_record(
        &self,
        config: &TankConfig,
        reading: &SensorReading,
    ) -> ProcessingResult<VolumeRecord> {
        let mut issues = IssueList::new();
        let environment = reading.environment.sanitized(&mut issues);

        // A degenerate depth aborts the reading; there is no level to
        // hang a record on.
        let conversion = convert_to_level(reading.value, &config.install, config.geometry.depth())?;

        let mut quality = reading.quality;
        if conversion.degraded && quality.score() > DataQuality::Fair.score() {
            quality = DataQuality::Fair;
            let _ = issues.push(RecordIssue {
                code: "unknown_sensor_kind",
                message: "raw value passed through without conversion",
                severity: IssueSeverity::Medium,
            });
            warn!(
                "tank {}: unknown sensor kind, quality degraded to fair",
                config.id
            );
        }

        let computed = VolumeComputation::compute(
            &config.geometry,
            config.offset_depth_m,
            conversion.level_m,
            config.capacity_liters,
            config.material,
            config.density(),
        );

        let (volume, quality, validation_passed, method, error) = match computed {
            Ok(volume) => (Some(volume), quality, !conversion.degraded, "geometry_dispatch", None),
            Err(err) => {
                // Unsupported shapes and broken math still leave an audit
                // trail; the stored figures are placeholders.
                let quality = match err {
                    ComputationError::UnsupportedShape => DataQuality::UnsupportedShape,
                    _ => DataQuality::Error,
                };
                let _ = issues.push(RecordIssue {
                    code: "volume_computation",
                    message: "volume computation failed, figures are placeholders",
                    severity: IssueSeverity::High,
                });
                warn!("tank {}: volume computation failed: {}", config.id, err);
                (None, quality, false, "degraded", Some(error_text(err)))
            }
        };

        Ok(VolumeRecord {
            tank_id: config.id.clone(),
            device_id: reading.device_id.clone(),
            timestamp: reading.timestamp,
            raw_sensor_reading: reading.value,
            level_m: conversion.level_m,
            volume_liters: volume.map(|v| v.volume_liters).unwrap_or(0.0),
            volume_m3: volume.map(|v| v.volume_m3).unwrap_or(0.0),
            fill_percent: volume.map(|v| v.fill_percent).unwrap_or(0.0),
            mass_kg: volume.and_then(|v| v.mass_kg),
            quality,
            quality_score: quality.score(),
            snapshot: TankSnapshot::capture(config),
            environment,
            issues,
            processing: ProcessingInfo {
                processed_at: self.clock.now(),
                version: crate::VERSION,
                method,
                sensor_kind: config.install.kind.name(),
                validation_passed,
                error,
            },
            source: RecordSource::SensorReading,
        })
    }

    /// Upsert the four period buckets for a new record
    fn update_analytics(
        &self,
        tank_id: &TankId,
        record: &VolumeRecord,
        previous: Option<&VolumeRecord>,
    ) -> Result<(), PersistenceError> {
        let sample = flow_sample(record);
        let previous_sample = previous.map(flow_sample);

        let mut analytics = self.analytics.lock().expect("analytics store poisoned");
        for period in ALL_PERIODS {
            let key = PeriodKey::containing(tank_id.clone(), period, record.timestamp);
            analytics.upsert_with(&key, |existing| match existing {
                Some(bucket) => {
                    let mut bucket = bucket.clone();
                    bucket.apply(&sample, previous_sample.as_ref());
                    bucket
                }
                None => PeriodRecord::open(key.clone(), &sample),
            })?;
        }
        Ok(())
    }
}

fn flow_sample(record: &VolumeRecord) -> FlowSample {
    FlowSample {
        volume_liters: record.volume_liters,
        fill_percent: record.fill_percent,
        quality_score: record.quality_score,
        mass_kg: record.mass_kg,
        timestamp: record.timestamp,
    }
}

fn error_text(err: ComputationError) -> &'static str {
    match err {
        ComputationError::UnsupportedShape => "unsupported tank shape",
        ComputationError::DegenerateGeometry { reason } => reason,
        ComputationError::MissingDimension { dimension } => dimension,
        ComputationError::NonFiniteResult { stage } => stage,
    }
}

impl From<crate::frame::FrameError> for ProcessingError {
    fn from(_: crate::frame::FrameError) -> Self {
        // A frame that cannot be decoded carries no usable raw value
        ProcessingError::Validation(ValidationError::NotFinite { field: "frame" })
    }
}
