//! Period bucket boundaries
//!
//! Analytics buckets are derived from the *reading's* timestamp, not the
//! wall clock, so late-arriving data lands in the window it was measured
//! in. All boundaries are UTC; weeks are ISO weeks starting Monday.
//! Hour and day floors are plain millisecond arithmetic; weeks and
//! months need a calendar and go through `chrono`.

use chrono::{DateTime, Datelike, NaiveDate, Utc};

use crate::constants::time::{MS_PER_DAY, MS_PER_HOUR, MS_PER_WEEK};
use crate::time::Timestamp;

/// The four parallel rollup windows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[repr(u8)]
pub enum PeriodType {
    /// Hour-aligned window
    Hourly = 0,
    /// Day-aligned window (UTC midnight)
    Daily = 1,
    /// ISO week window (Monday 00:00 UTC)
    Weekly = 2,
    /// Calendar month window
    Monthly = 3,
}

/// All period types, in upsert order
pub const ALL_PERIODS: [PeriodType; 4] = [
    PeriodType::Hourly,
    PeriodType::Daily,
    PeriodType::Weekly,
    PeriodType::Monthly,
];

impl PeriodType {
    /// Stable wire label
    pub const fn label(&self) -> &'static str {
        match self {
            PeriodType::Hourly => "hourly",
            PeriodType::Daily => "daily",
            PeriodType::Weekly => "weekly",
            PeriodType::Monthly => "monthly",
        }
    }

    /// Canonical bucket start for a timestamp
    pub fn period_start(&self, timestamp: Timestamp) -> Timestamp {
        match self {
            PeriodType::Hourly => timestamp - timestamp % MS_PER_HOUR,
            PeriodType::Daily => timestamp - timestamp % MS_PER_DAY,
            PeriodType::Weekly => {
                let day_start = timestamp - timestamp % MS_PER_DAY;
                let days_from_monday = match DateTime::<Utc>::from_timestamp_millis(timestamp as i64)
                {
                    Some(dt) => dt.weekday().num_days_from_monday() as u64,
                    None => 0,
                };
                day_start.saturating_sub(days_from_monday * MS_PER_DAY)
            }
            PeriodType::Monthly => {
                match DateTime::<Utc>::from_timestamp_millis(timestamp as i64) {
                    Some(dt) => {
                        month_start_ms(dt.year(), dt.month()).unwrap_or(timestamp)
                    }
                    None => timestamp,
                }
            }
        }
    }

    /// Exclusive end of the bucket beginning at `period_start`
    pub fn period_end(&self, period_start: Timestamp) -> Timestamp {
        match self {
            PeriodType::Hourly => period_start + MS_PER_HOUR,
            PeriodType::Daily => period_start + MS_PER_DAY,
            PeriodType::Weekly => period_start + MS_PER_WEEK,
            PeriodType::Monthly => {
                match DateTime::<Utc>::from_timestamp_millis(period_start as i64) {
                    Some(dt) => {
                        let (year, month) = if dt.month() == 12 {
                            (dt.year() + 1, 1)
                        } else {
                            (dt.year(), dt.month() + 1)
                        };
                        month_start_ms(year, month).unwrap_or(period_start)
                    }
                    None => period_start,
                }
            }
        }
    }

    /// Whether a timestamp falls inside the bucket beginning at `start`
    pub fn contains(&self, start: Timestamp, timestamp: Timestamp) -> bool {
        timestamp >= start && timestamp < self.period_end(start)
    }
}

fn month_start_ms(year: i32, month: u32) -> Option<Timestamp> {
    let date = NaiveDate::from_ymd_opt(year, month, 1)?;
    let ms = date.and_hms_opt(0, 0, 0)?.and_utc().timestamp_millis();
    (ms >= 0).then_some(ms as Timestamp)
}
