//! Vendor sensor frame codec
//!
//! The field sensors emit one hex frame per report, optionally prefixed
//! by a log timestamp when replayed from gateway logs:
//!
//! ```text
//! FEDC 19 16098522754E 0000002A 01 0024 <payload...>
//! │    │  │            │        │  │
//! │    │  │            │        │  └ payload length, 4 hex chars
//! │    │  │            │        └ frame order, 2 hex chars
//! │    │  │            └ session id, 8 hex chars
//! │    │  └ device serial, 12 hex chars
//! │    └ version byte, tenths (0x19 = 2.5)
//! └ header
//! ```
//!
//! The payload is a sequence of big-endian signed 32-bit values:
//! temperature (tenths °C), humidity (tenths %), PM2.5, PM10, noise
//! (tenths dB), liquid level (mm), RSSI raw, device error code, and an
//! optional trailing level repeat that is only consulted when the
//! primary level field is missing. Whitespace and `:` separators inside
//! the hex are tolerated. Malformed frames yield typed errors, never
//! panics.

use heapless::String;
use thiserror_no_std::Error;

use crate::constants::physics::MM_PER_M;
use crate::time::Timestamp;

/// Frame header all device reports start with
const HEADER: &str = "FEDC";

/// Minimum hex length: header through payload length
const MIN_HEX_CHARS: usize = 32;

/// Maximum cleaned frame we accept (header + 16 payload values)
const MAX_HEX_CHARS: usize = 192;

/// Device serial as carried in the frame, 12 hex chars
pub type FrameSerial = String<12>;

/// Frame decode failures
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    /// Input is empty or whitespace only
    #[error("empty frame")]
    Empty,
    /// A non-hex character remained after separator stripping
    #[error("invalid hex character")]
    InvalidHex,
    /// Fewer than the 32 header chars present
    #[error("frame too short: {chars} hex chars")]
    TooShort {
        /// Hex chars found
        chars: usize,
    },
    /// Frame exceeds the supported payload size
    #[error("frame too long")]
    TooLong,
    /// Header is not `FEDC`
    #[error("bad frame header")]
    BadHeader,
}

/// One decoded device frame
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeviceFrame {
    /// Device serial, 12 hex chars
    pub serial: FrameSerial,
    /// Protocol version (byte value in tenths)
    pub version: f32,
    /// Reporting session id
    pub session_id: u32,
    /// Frame order within the session
    pub order: u8,
    /// Declared payload length
    pub payload_len: u16,
    /// Temperature, °C
    pub temperature_c: Option<f32>,
    /// Relative humidity, %
    pub humidity_pct: Option<f32>,
    /// PM2.5 concentration
    pub pm2_5: Option<i32>,
    /// PM10 concentration
    pub pm10: Option<i32>,
    /// Noise level, dB
    pub noise_db: Option<f32>,
    /// Liquid level, m
    pub level_m: Option<f32>,
    /// RSSI as reported by the radio
    pub rssi_raw: Option<i32>,
    /// RSSI mapped to dBm
    pub rssi_dbm: Option<f32>,
    /// Device error code, zero meaning none
    pub error_code: Option<i32>,
    /// Log timestamp when the line carried one
    pub timestamp: Option<Timestamp>,
}

impl DeviceFrame {
    /// Decode one log line or raw hex frame
    pub fn parse(line: &str) -> Result<Self, FrameError> {
        let line = line.trim();
        if line.is_empty() {
            return Err(FrameError::Empty);
        }

        let (timestamp, hex_part) = split_timestamp(line);

        // Tolerate whitespace and ':' separators inside the hex body
        let mut hex: String<MAX_HEX_CHARS> = String::new();
        for c in hex_part.chars() {
            if c.is_whitespace() || c == ':' {
                continue;
            }
            if !c.is_ascii_hexdigit() {
                return Err(FrameError::InvalidHex);
            }
            hex.push(c.to_ascii_uppercase())
                .map_err(|_| FrameError::TooLong)?;
        }

        if hex.len() < MIN_HEX_CHARS {
            return Err(FrameError::TooShort { chars: hex.len() });
        }
        if &hex[0..4] != HEADER {
            return Err(FrameError::BadHeader);
        }

        let serial = FrameSerial::try_from(&hex[6..18]).map_err(|_| FrameError::InvalidHex)?;
        let version = parse_hex_u32(&hex[4..6]) as f32 / 10.0;
        let session_id = parse_hex_u32(&hex[18..26]);
        let order = parse_hex_u32(&hex[26..28]) as u8;
        let payload_len = parse_hex_u32(&hex[28..32]) as u16;

        let mut cursor = FieldCursor {
            hex: &hex,
            index: MIN_HEX_CHARS,
        };

        let temperature_c = cursor.next().map(|v| v as f32 / 10.0);
        let humidity_pct = cursor.next().map(|v| v as f32 / 10.0);
        let pm2_5 = cursor.next();
        let pm10 = cursor.next();
        let noise_db = cursor.next().map(|v| v as f32 / 10.0);
        let mut level_m = cursor.next().map(|v| v as f32 / MM_PER_M);
        let rssi_raw = cursor.next();
        let rssi_dbm = rssi_raw.map(map_rssi_dbm);
        let error_code = cursor.next();

        // Trailing level repeat, consulted only when the primary field
        // did not make it into the frame
        if level_m.is_none() {
            level_m = cursor.next().map(|v| v as f32 / MM_PER_M);
        }

        Ok(Self {
            serial,
            version,
            session_id,
            order,
            payload_len,
            temperature_c,
            humidity_pct,
            pm2_5,
            pm10,
            noise_db,
            level_m,
            rssi_raw,
            rssi_dbm,
            error_code,
            timestamp,
        })
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for FrameError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::Empty => defmt::write!(fmt, "empty frame"),
            Self::InvalidHex => defmt::write!(fmt, "invalid hex"),
            Self::TooShort { chars } => defmt::write!(fmt, "too short: {}", chars),
            Self::TooLong => defmt::write!(fmt, "too long"),
            Self::BadHeader => defmt::write!(fmt, "bad header"),
        }
    }
}

/// Big-endian signed 32-bit payload field reader
struct FieldCursor<'a> {
    hex: &'a str,
    index: usize,
}

impl FieldCursor<'_> {
    fn next(&mut self) -> Option<i32> {
        if self.index + 8 > self.hex.len() {
            return None;
        }
        let raw = parse_hex_u32(&self.hex[self.index..self.index + 8]);
        self.index += 8;
        Some(raw as i32)
    }
}

/// Map the radio's raw RSSI to dBm: 0 means no signal information
fn map_rssi_dbm(raw: i32) -> f32 {
    if raw == 0 {
        -100.0
    } else {
        (-(100 - raw) as f32).max(-100.0).min(0.0)
    }
}

/// Parse uppercase hex digits; callers guarantee the slice is valid hex
fn parse_hex_u32(hex: &str) -> u32 {
    hex.bytes().fold(0u32, |acc, b| {
        let digit = match b {
            b'0'..=b'9' => b - b'0',
            b'A'..=b'F' => b - b'A' + 10,
            _ => 0,
        };
        acc.wrapping_shl(4) | digit as u32
    })
}

/// Split a leading log timestamp off a replayed line
///
/// Lines start with an ISO-ish date (`2024-03-13 15:42:07.500Z ...` or
/// with a `T` separator) when they come from gateway logs; live frames
/// start straight at the hex. Offsets and unparseable prefixes degrade
/// to "no timestamp" rather than failing the frame.
fn split_timestamp(line: &str) -> (Option<Timestamp>, &str) {
    let looks_dated = line.len() > 5
        && line.as_bytes()[0..4].iter().all(u8::is_ascii_digit)
        && line.as_bytes()[4] == b'-';
    if !looks_dated {
        return (None, line);
    }
    match line.rsplit_once(char::is_whitespace) {
        Some((prefix, hex)) => (parse_log_timestamp(prefix.trim()), hex),
        None => (None, line),
    }
}

fn parse_log_timestamp(text: &str) -> Option<Timestamp> {
    use chrono::{DateTime, NaiveDateTime};

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        let ms = dt.timestamp_millis();
        return (ms >= 0).then_some(ms as Timestamp);
    }
    let trimmed = text.trim_end_matches('Z');
    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            let ms = naive.and_utc().timestamp_millis();
            return (ms >= 0).then_some(ms as Timestamp);
        }
    }
    None
}
