//! Host time zone probe backed by `chrono::Local`

use bridge_traits::time::LocalZone;
use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};

/// Reads the machine's local time zone.
///
/// The standard offset is the smaller of the January and July offsets of the
/// current year; the clock is considered to be on DST whenever today's offset
/// differs from it.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemZone;

impl SystemZone {
    pub fn new() -> Self {
        Self
    }

    fn east_offset_at(year: i32, month: u32) -> Option<i32> {
        let naive = NaiveDate::from_ymd_opt(year, month, 1)?.and_hms_opt(12, 0, 0)?;
        Some(Local.from_utc_datetime(&naive).offset().fix().local_minus_utc())
    }

    fn standard_east_secs(year: i32) -> i32 {
        let january = Self::east_offset_at(year, 1);
        let july = Self::east_offset_at(year, 7);
        match (january, july) {
            (Some(a), Some(b)) => a.min(b),
            (Some(a), None) | (None, Some(a)) => a,
            (None, None) => Local::now().offset().fix().local_minus_utc(),
        }
    }
}

impl LocalZone for SystemZone {
    fn standard_offset_west_secs(&self) -> i64 {
        -(Self::standard_east_secs(Local::now().year()) as i64)
    }

    fn observing_dst(&self) -> bool {
        let now = Local::now();
        now.offset().fix().local_minus_utc() != Self::standard_east_secs(now.year())
    }

    fn to_local(&self, unix_secs: i64) -> Option<NaiveDateTime> {
        DateTime::<Utc>::from_timestamp(unix_secs, 0).map(|dt| dt.with_timezone(&Local).naive_local())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offsets_are_consistent_with_local_clock() {
        let zone = SystemZone::new();
        let now = Local::now();
        let effective_west = -(now.offset().fix().local_minus_utc() as i64);

        assert_eq!(zone.comparison_offset_secs(), effective_west);
    }

    #[test]
    fn test_to_local_matches_chrono() {
        let zone = SystemZone::new();
        let expected = Local.timestamp_opt(1_685_613_600, 0).unwrap().naive_local();

        assert_eq!(zone.to_local(1_685_613_600), Some(expected));
    }
}
