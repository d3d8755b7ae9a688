//! Period analytics records and their upsert arithmetic
//!
//! One record per tank × period type × period start. A record opens on
//! the first reading inside a not-yet-seen window and is updated by every
//! later reading in that window; it is never finalized, it simply stops
//! receiving updates once its window passes.
//!
//! Flow accounting: a delta against the previous reading is only booked
//! when that previous reading's timestamp is at or after the period
//! start - a delta straddling the boundary belongs to no bucket, which
//! keeps `net = added − used = closing − opening` exact within a bucket.

use crate::bucket::PeriodType;
use crate::tank::TankId;
use crate::time::Timestamp;

/// Identity of one analytics bucket
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PeriodKey {
    /// Tank the bucket belongs to
    pub tank_id: TankId,
    /// Window width
    pub period: PeriodType,
    /// Canonical window start, ms since the Unix epoch
    pub start: Timestamp,
}

impl PeriodKey {
    /// Key for the bucket containing `timestamp`
    pub fn containing(tank_id: TankId, period: PeriodType, timestamp: Timestamp) -> Self {
        Self {
            tank_id,
            period,
            start: period.period_start(timestamp),
        }
    }
}

/// A volume observation with its timestamp
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VolumePoint {
    /// Volume, liters
    pub volume_liters: f32,
    /// When it was observed
    pub timestamp: Timestamp,
}

/// Mass statistics mirrored when density is known
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WeightStats {
    /// Mass at window open, kg
    pub opening_kg: f32,
    /// Mass at the latest reading, kg
    pub closing_kg: f32,
    /// Minimum observed mass, kg
    pub minimum_kg: f32,
    /// Maximum observed mass, kg
    pub maximum_kg: f32,
    /// Running average mass, kg
    pub average_kg: f32,
    /// Mass added by fills, kg
    pub total_added_kg: f32,
    /// Mass removed by draws, kg
    pub total_used_kg: f32,
}

/// The figures one processed reading contributes to analytics
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowSample {
    /// Volume, liters
    pub volume_liters: f32,
    /// Fill percentage
    pub fill_percent: f32,
    /// Quality score of the underlying record
    pub quality_score: u8,
    /// Estimated mass, kg, when density known
    pub mass_kg: Option<f32>,
    /// Measurement timestamp
    pub timestamp: Timestamp,
}

/// One rolling analytics bucket, mutable until its window passes
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PeriodRecord {
    /// Bucket identity
    pub key: PeriodKey,
    /// Exclusive window end
    pub period_end: Timestamp,
    /// First observation in the window
    pub opening: VolumePoint,
    /// Latest observation in the window
    pub closing: VolumePoint,
    /// Minimum observation
    pub minimum: VolumePoint,
    /// Maximum observation
    pub maximum: VolumePoint,
    /// Running average volume, liters
    pub average_volume_liters: f32,
    /// Volume added by fills, liters
    pub total_added: f32,
    /// Volume removed by draws, liters
    pub total_used: f32,
    /// `total_added − total_used`
    pub net_change: f32,
    /// Number of readings booked into the window
    pub reading_count: u32,
    /// Running average fill percentage
    pub avg_fill_percent: f32,
    /// Minimum fill percentage
    pub min_fill_percent: f32,
    /// Maximum fill percentage
    pub max_fill_percent: f32,
    /// Running average quality score
    pub avg_quality_score: f32,
    /// Mass statistics, tracked when any reading carried mass
    pub weight: Option<WeightStats>,
}

impl PeriodRecord {
    /// Open a bucket from its first sample
    pub fn open(key: PeriodKey, sample: &FlowSample) -> Self {
        let point = VolumePoint {
            volume_liters: sample.volume_liters,
            timestamp: sample.timestamp,
        };
        let period_end = key.period.period_end(key.start);
        Self {
            key,
            period_end,
            opening: point,
            closing: point,
            minimum: point,
            maximum: point,
            average_volume_liters: sample.volume_liters,
            total_added: 0.0,
            total_used: 0.0,
            net_change: 0.0,
            reading_count: 1,
            avg_fill_percent: sample.fill_percent,
            min_fill_percent: sample.fill_percent,
            max_fill_percent: sample.fill_percent,
            avg_quality_score: sample.quality_score as f32,
            weight: sample.mass_kg.map(|mass| WeightStats {
                opening_kg: mass,
                closing_kg: mass,
                minimum_kg: mass,
                maximum_kg: mass,
                average_kg: mass,
                total_added_kg: 0.0,
                total_used_kg: 0.0,
            }),
        }
    }

    /// Book a subsequent sample into the bucket
    ///
    /// `previous` is the tank's prior reading - the same snapshot the
    /// history recorder used for its delta decision. Flow is only booked
    /// when the previous reading falls inside this bucket's window.
    pub fn apply(&mut self, sample: &FlowSample, previous: Option<&FlowSample>) {
        let point = VolumePoint {
            volume_liters: sample.volume_liters,
            timestamp: sample.timestamp,
        };

        self.closing = point;
        if sample.volume_liters < self.minimum.volume_liters {
            self.minimum = point;
        }
        if sample.volume_liters > self.maximum.volume_liters {
            self.maximum = point;
        }

        if let Some(prev) = previous {
            if prev.timestamp >= self.key.start {
                let delta = sample.volume_liters - prev.volume_liters;
                if delta > 0.0 {
                    self.total_added += delta;
                } else {
                    self.total_used += -delta;
                }
                self.net_change = self.total_added - self.total_used;

                if let (Some(stats), Some(mass), Some(prev_mass)) =
                    (self.weight.as_mut(), sample.mass_kg, prev.mass_kg)
                {
                    let weight_delta = mass - prev_mass;
                    if weight_delta > 0.0 {
                        stats.total_added_kg += weight_delta;
                    } else {
                        stats.total_used_kg += -weight_delta;
                    }
                }
            }
        }

        self.reading_count += 1;
        let n = self.reading_count as f32;
        self.average_volume_liters =
            (self.average_volume_liters * (n - 1.0) + sample.volume_liters) / n;
        self.avg_fill_percent = (self.avg_fill_percent * (n - 1.0) + sample.fill_percent) / n;
        self.avg_quality_score =
            (self.avg_quality_score * (n - 1.0) + sample.quality_score as f32) / n;
        self.min_fill_percent = self.min_fill_percent.min(sample.fill_percent);
        self.max_fill_percent = self.max_fill_percent.max(sample.fill_percent);

        if let Some(mass) = sample.mass_kg {
            match self.weight.as_mut() {
                Some(stats) => {
                    stats.closing_kg = mass;
                    stats.minimum_kg = stats.minimum_kg.min(mass);
                    stats.maximum_kg = stats.maximum_kg.max(mass);
                    stats.average_kg = (stats.average_kg * (n - 1.0) + mass) / n;
                }
                None => {
                    // First reading in the window to carry mass
                    self.weight = Some(WeightStats {
                        opening_kg: mass,
                        closing_kg: mass,
                        minimum_kg: mass,
                        maximum_kg: mass,
                        average_kg: mass,
                        total_added_kg: 0.0,
                        total_used_kg: 0.0,
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-3;

    fn sample(volume: f32, fill: f32, ts: Timestamp) -> FlowSample {
        FlowSample {
            volume_liters: volume,
            fill_percent: fill,
            quality_score: 80,
            mass_kg: None,
            timestamp: ts,
        }
    }

    fn key(ts: Timestamp) -> PeriodKey {
        PeriodKey::containing(TankId::try_from("tank-1").unwrap(), PeriodType::Hourly, ts)
    }

    #[test]
    fn flow_accumulation_within_one_bucket() {
        // 100 L -> 80 L -> 95 L inside one hour
        let t0: Timestamp = 1_710_000_000_000;
        let start = PeriodType::Hourly.period_start(t0);
        let s0 = sample(100.0, 10.0, start + 60_000);
        let s1 = sample(80.0, 8.0, start + 120_000);
        let s2 = sample(95.0, 9.5, start + 180_000);

        let mut record = PeriodRecord::open(key(s0.timestamp), &s0);
        record.apply(&s1, Some(&s0));
        record.apply(&s2, Some(&s1));

        assert!((record.total_used - 20.0).abs() < EPS);
        assert!((record.total_added - 15.0).abs() < EPS);
        assert!((record.net_change - -5.0).abs() < EPS);
        assert_eq!(record.opening.volume_liters, 100.0);
        assert_eq!(record.closing.volume_liters, 95.0);
        // Conservation law: net change equals closing minus opening
        assert!(
            (record.net_change - (record.closing.volume_liters - record.opening.volume_liters))
                .abs()
                < EPS
        );
        assert_eq!(record.reading_count, 3);
        assert_eq!(record.minimum.volume_liters, 80.0);
        assert_eq!(record.maximum.volume_liters, 100.0);
    }

    #[test]
    fn cross_boundary_delta_not_booked() {
        let t0: Timestamp = 1_710_000_000_000;
        let start = PeriodType::Hourly.period_start(t0);
        // Previous reading landed in the prior hour
        let prev = sample(100.0, 10.0, start - 60_000);
        let first = sample(70.0, 7.0, start + 60_000);

        let mut record = PeriodRecord::open(key(first.timestamp), &first);
        record.apply(&sample(60.0, 6.0, start + 120_000), Some(&prev));

        // Only the in-bucket delta would count, and prev is out of bucket
        assert_eq!(record.total_used, 0.0);
        assert_eq!(record.total_added, 0.0);
    }

    #[test]
    fn running_averages() {
        let t0: Timestamp = 1_710_000_000_000;
        let start = PeriodType::Hourly.period_start(t0);
        let s0 = sample(100.0, 50.0, start + 1000);
        let s1 = sample(200.0, 70.0, start + 2000);

        let mut record = PeriodRecord::open(key(s0.timestamp), &s0);
        record.apply(&s1, Some(&s0));

        assert!((record.average_volume_liters - 150.0).abs() < EPS);
        assert!((record.avg_fill_percent - 60.0).abs() < EPS);
        assert!((record.avg_quality_score - 80.0).abs() < EPS);
        assert_eq!(record.min_fill_percent, 50.0);
        assert_eq!(record.max_fill_percent, 70.0);
    }

    #[test]
    fn weight_stats_mirror_volume_flow() {
        let t0: Timestamp = 1_710_000_000_000;
        let start = PeriodType::Hourly.period_start(t0);
        let mut s0 = sample(100.0, 10.0, start + 1000);
        s0.mass_kg = Some(160.0);
        let mut s1 = sample(80.0, 8.0, start + 2000);
        s1.mass_kg = Some(128.0);

        let mut record = PeriodRecord::open(key(s0.timestamp), &s0);
        record.apply(&s1, Some(&s0));

        let w = record.weight.unwrap();
        assert_eq!(w.opening_kg, 160.0);
        assert_eq!(w.closing_kg, 128.0);
        assert!((w.total_used_kg - 32.0).abs() < EPS);
        assert_eq!(w.total_added_kg, 0.0);
        assert!((w.average_kg - 144.0).abs() < EPS);
    }

    #[test]
    fn quality_score_is_running_average() {
        let t0: Timestamp = 1_710_000_000_000;
        let start = PeriodType::Hourly.period_start(t0);
        let mut s0 = sample(100.0, 10.0, start + 1000);
        s0.quality_score = 100;
        let mut s1 = sample(100.0, 10.0, start + 2000);
        s1.quality_score = 60;

        let mut record = PeriodRecord::open(key(s0.timestamp), &s0);
        record.apply(&s1, Some(&s0));
        assert!((record.avg_quality_score - 80.0).abs() < EPS);
    }
}
