//! Time Zone and Logging Abstractions
//!
//! Provides an injectable view of the host's local time zone, used when
//! comparing remote UTC timestamps against local file metadata, and the
//! shared log level type.

use chrono::{DateTime, NaiveDateTime, Utc};

/// Host time zone probe
///
/// The offset is taken from the machine's *current* state: the standard
/// offset of the zone, shifted by one hour while daylight saving time is in
/// effect right now. It is deliberately not resolved per historical date.
pub trait LocalZone: Send + Sync {
    /// Seconds west of UTC for the zone's standard (non-DST) time
    fn standard_offset_west_secs(&self) -> i64;

    /// Whether the local clock is observing daylight saving time now
    fn observing_dst(&self) -> bool;

    /// Convert a Unix timestamp to local wall-clock time
    fn to_local(&self, unix_secs: i64) -> Option<NaiveDateTime>;

    /// Offset applied to remote UTC timestamps before comparison
    fn comparison_offset_secs(&self) -> i64 {
        let mut offset = self.standard_offset_west_secs();
        if self.observing_dst() {
            offset -= 3600;
        }
        offset
    }
}

/// A zone with a fixed offset and DST flag, for deterministic callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedZone {
    pub offset_west_secs: i64,
    pub dst: bool,
}

impl FixedZone {
    pub fn utc() -> Self {
        Self {
            offset_west_secs: 0,
            dst: false,
        }
    }
}

impl LocalZone for FixedZone {
    fn standard_offset_west_secs(&self) -> i64 {
        self.offset_west_secs
    }

    fn observing_dst(&self) -> bool {
        self.dst
    }

    fn to_local(&self, unix_secs: i64) -> Option<NaiveDateTime> {
        let effective_east = -self.comparison_offset_secs();
        DateTime::<Utc>::from_timestamp(unix_secs + effective_east, 0).map(|dt| dt.naive_utc())
    }
}

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}
