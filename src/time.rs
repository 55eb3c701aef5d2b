//! Minute-of-day arithmetic and locale-tolerant parsing.
//!
//! Times of day are plain minutes since midnight (`u32`). `chrono` types
//! appear only at the parse/format boundary, which keeps interval math on
//! integers and sidesteps the un-representable `24:00:00` end time: an
//! interval may end exactly at minute 1440 but never beyond it.
//!
//! Input data uses Brazilian locale conventions: `DD/MM/YYYY` dates,
//! comma-as-decimal fractional hours, and `HH:MM:SS` hour totals.

use chrono::{NaiveDate, NaiveTime, Timelike};

use crate::error::{DayOverflow, FormatError};

/// Minutes in a calendar day; the exclusive upper bound for start times
/// and the inclusive upper bound for end times.
pub const MINUTES_PER_DAY: u32 = 1440;

/// Parses `HH:MM:SS` (or `HH:MM`) into minutes since midnight.
///
/// Seconds are truncated; `"08:30:45"` parses to minute 510.
pub fn parse_time_of_day(value: &str) -> Result<u32, FormatError> {
    let trimmed = value.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
        .map(|t| t.num_seconds_from_midnight() / 60)
        .map_err(|_| FormatError::Time(value.to_string()))
}

/// Parses a `DD/MM/YYYY` date.
pub fn parse_date(value: &str) -> Result<NaiveDate, FormatError> {
    NaiveDate::parse_from_str(value.trim(), "%d/%m/%Y")
        .map_err(|_| FormatError::Date(value.to_string()))
}

/// Parses fractional hours into whole minutes, accepting either a comma
/// or a dot as the decimal separator: `"1,5"` and `"1.5"` both give 90.
///
/// Fractions of a minute are truncated, matching the upstream data feed.
pub fn parse_effort_hours(value: &str) -> Result<u32, FormatError> {
    let normalized = value.trim().replace(',', ".");
    let hours: f64 = normalized
        .parse()
        .map_err(|_| FormatError::Duration(value.to_string()))?;
    if !hours.is_finite() || hours < 0.0 {
        return Err(FormatError::Duration(value.to_string()));
    }
    Ok((hours * 60.0) as u32)
}

/// Parses an `HH:MM:SS` (or `HH:MM`) total into whole minutes.
///
/// The hour field may exceed 24; `"176:00:00"` is a valid monthly budget
/// of 10560 minutes. Leftover seconds are truncated.
pub fn parse_minute_budget(value: &str) -> Result<u32, FormatError> {
    let parts: Result<Vec<u64>, _> = value
        .trim()
        .split(':')
        .map(|part| part.parse::<u64>())
        .collect();
    let parts = parts.map_err(|_| FormatError::Duration(value.to_string()))?;
    let total_seconds = match parts.as_slice() {
        [hours, minutes, seconds] if *minutes < 60 && *seconds < 60 => {
            hours * 3600 + minutes * 60 + seconds
        }
        [hours, minutes] if *minutes < 60 => hours * 3600 + minutes * 60,
        _ => return Err(FormatError::Duration(value.to_string())),
    };
    Ok((total_seconds / 60) as u32)
}

/// Computes the end minute of an interval.
///
/// Errors when the interval would run past midnight. An end of exactly
/// [`MINUTES_PER_DAY`] is allowed and formats as `24:00:00`.
pub fn end_minute(start_minute: u32, effort_minutes: u32) -> Result<u32, DayOverflow> {
    let end = u64::from(start_minute) + u64::from(effort_minutes);
    if end > u64::from(MINUTES_PER_DAY) {
        return Err(DayOverflow {
            start_minute,
            effort_minutes,
        });
    }
    Ok(end as u32)
}

/// Half-open interval overlap: `[a_start, a_end)` intersects `[b_start, b_end)`.
#[inline]
pub fn overlaps(a_start: u32, a_end: u32, b_start: u32, b_end: u32) -> bool {
    a_start < b_end && b_start < a_end
}

/// Formats minutes since midnight as `HH:MM:SS`.
///
/// Minute 1440 formats as `24:00:00`, marking an end exactly at midnight.
pub fn format_minute(minute: u32) -> String {
    format!("{:02}:{:02}:00", minute / 60, minute % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_time_of_day() {
        assert_eq!(parse_time_of_day("09:00:00").unwrap(), 540);
        assert_eq!(parse_time_of_day("08:30").unwrap(), 510);
        assert_eq!(parse_time_of_day(" 23:59:59 ").unwrap(), 1439);
        assert!(parse_time_of_day("25:00:00").is_err());
        assert!(parse_time_of_day("not a time").is_err());
    }

    #[test]
    fn test_parse_date() {
        let date = parse_date("14/03/2024").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 3, 14).unwrap());
        assert!(parse_date("2024-03-14").is_err());
        assert!(parse_date("31/02/2024").is_err());
    }

    #[test]
    fn test_parse_effort_hours() {
        assert_eq!(parse_effort_hours("1,5").unwrap(), 90);
        assert_eq!(parse_effort_hours("1.5").unwrap(), 90);
        assert_eq!(parse_effort_hours("0,25").unwrap(), 15);
        assert_eq!(parse_effort_hours("8").unwrap(), 480);
        assert!(parse_effort_hours("-1").is_err());
        assert!(parse_effort_hours("abc").is_err());
    }

    #[test]
    fn test_parse_minute_budget() {
        assert_eq!(parse_minute_budget("08:00:00").unwrap(), 480);
        assert_eq!(parse_minute_budget("176:00:00").unwrap(), 10560);
        assert_eq!(parse_minute_budget("01:30").unwrap(), 90);
        assert_eq!(parse_minute_budget("00:45:30").unwrap(), 45);
        assert!(parse_minute_budget("08:75:00").is_err());
        assert!(parse_minute_budget("oops").is_err());
    }

    #[test]
    fn test_end_minute_determinism() {
        // 09:00:00 plus 90 minutes is 10:30:00.
        let start = parse_time_of_day("09:00:00").unwrap();
        let end = end_minute(start, 90).unwrap();
        assert_eq!(format_minute(end), "10:30:00");
    }

    #[test]
    fn test_end_minute_midnight_boundary() {
        assert_eq!(end_minute(1380, 60).unwrap(), MINUTES_PER_DAY);
        assert!(end_minute(1380, 61).is_err());
        assert!(end_minute(1441, 0).is_err());
    }

    #[test]
    fn test_overlaps_half_open() {
        // [480, 540) against neighbors.
        assert!(overlaps(480, 540, 500, 520));
        assert!(overlaps(480, 540, 530, 600));
        assert!(!overlaps(480, 540, 540, 600)); // touching is not overlap
        assert!(!overlaps(480, 540, 400, 480));
    }

    #[test]
    fn test_format_minute() {
        assert_eq!(format_minute(0), "00:00:00");
        assert_eq!(format_minute(510), "08:30:00");
        assert_eq!(format_minute(MINUTES_PER_DAY), "24:00:00");
    }
}
