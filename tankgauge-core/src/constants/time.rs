//! Period lengths and summary windows, in milliseconds
//!
//! Hour/day/week floors are plain millisecond arithmetic on the Unix
//! epoch (which begins on a Thursday - the week floor accounts for that
//! in `bucket`). Month boundaries need a calendar and live in `bucket`.

/// Milliseconds per second.
pub const MS_PER_SECOND: u64 = 1000;

/// Milliseconds per minute.
pub const MS_PER_MINUTE: u64 = 60 * MS_PER_SECOND;

/// Milliseconds per hour.
pub const MS_PER_HOUR: u64 = 60 * MS_PER_MINUTE;

/// Milliseconds per day.
pub const MS_PER_DAY: u64 = 24 * MS_PER_HOUR;

/// Milliseconds per ISO week.
pub const MS_PER_WEEK: u64 = 7 * MS_PER_DAY;

/// 24-hour summary window.
pub const WINDOW_24H_MS: u64 = MS_PER_DAY;

/// 7-day summary window.
pub const WINDOW_7D_MS: u64 = 7 * MS_PER_DAY;

/// 30-day summary window.
pub const WINDOW_30D_MS: u64 = 30 * MS_PER_DAY;

/// 90-day summary window.
pub const WINDOW_90D_MS: u64 = 90 * MS_PER_DAY;
