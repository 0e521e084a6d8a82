//! Grammar and formatting shared by the AppSync temporal scalars.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use time::{Date, Month, Time, UtcOffset};

use super::zone::AwsTimeZone;
use crate::error::{CoreError, Result};

// ============================================================================
// Grammar
// ============================================================================

const DATE_PATTERN: &str = r"([0-9]{4})-(1[0-2]|0[1-9])-(3[01]|[12][0-9]|0[1-9])";
const TIME_PATTERN: &str = r"(2[0-3]|[01][0-9]):([0-5][0-9])(?::([0-5][0-9])(?:\.([0-9]{3}))?)?";
const ZONE_PATTERN: &str = r"Z|([+-])(2[0-3]|[01][0-9])(?::([0-5][0-9])(?::([0-5][0-9]))?)?";

static DATE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("^{DATE_PATTERN}")).expect("Invalid date regex")
});

static TIME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("^{TIME_PATTERN}")).expect("Invalid time regex")
});

static DATE_TIME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("^{DATE_PATTERN}T{TIME_PATTERN}")).expect("Invalid date-time regex")
});

static ZONE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("^(?:{ZONE_PATTERN})$")).expect("Invalid timezone regex")
});

const DATE_SUGGESTION: &str = "Verify that date matches 'YYYY-MM-DD' pattern.";
const TIME_SUGGESTION: &str = "Verify that time matches 'hh:mm:ss.sss' pattern.";
const DATE_TIME_SUGGESTION: &str = "Verify that date/time matches 'YYYY-MM-DDThh:mm:ss.sss' pattern.";
const ZONE_SUGGESTION: &str = "Verify that timezone offset matches 'Z|±hh:mm:ss' pattern.";
const ZONE_REQUIRED_SUGGESTION: &str =
    "Please specify the offset in the following format: 'Z|±hh:mm:ss'.";

// ============================================================================
// Parsing
// ============================================================================

/// Parse `YYYY-MM-DD` followed by an optional zone suffix.
pub(crate) fn parse_date(input: &str) -> Result<(Date, Option<AwsTimeZone>)> {
    let invalid = || CoreError::invalid_temporal(input, "Failed to parse Date", DATE_SUGGESTION);
    let caps = DATE_REGEX.captures(input).ok_or_else(invalid)?;
    let date = calendar_date(&caps, 1).ok_or_else(invalid)?;
    let zone = parse_zone(&input[caps.get(0).map_or(0, |m| m.end())..])?;
    Ok((date, zone))
}

/// Parse `hh:mm[:ss[.sss]]` followed by an optional zone suffix.
pub(crate) fn parse_time(input: &str) -> Result<(Time, Option<AwsTimeZone>)> {
    let invalid = || CoreError::invalid_temporal(input, "Failed to parse Time", TIME_SUGGESTION);
    let caps = TIME_REGEX.captures(input).ok_or_else(invalid)?;
    let time = clock_time(&caps, 1).ok_or_else(invalid)?;
    let zone = parse_zone(&input[caps.get(0).map_or(0, |m| m.end())..])?;
    Ok((time, zone))
}

/// Parse `<date>T<time><zone>`; the zone is mandatory.
pub(crate) fn parse_date_time(input: &str) -> Result<(Date, Time, AwsTimeZone)> {
    let invalid =
        || CoreError::invalid_temporal(input, "Failed to parse DateTime", DATE_TIME_SUGGESTION);
    let caps = DATE_TIME_REGEX.captures(input).ok_or_else(invalid)?;
    let date = calendar_date(&caps, 1).ok_or_else(invalid)?;
    let time = clock_time(&caps, 4).ok_or_else(invalid)?;

    let rest = &input[caps.get(0).map_or(0, |m| m.end())..];
    let zone = parse_zone(rest)?.ok_or_else(|| {
        CoreError::invalid_temporal(
            input,
            "The time zone offset is compulsory for AWSDateTime scalar",
            ZONE_REQUIRED_SUGGESTION,
        )
    })?;
    Ok((date, time, zone))
}

/// Parse a zone suffix. An empty suffix yields `None`.
pub(crate) fn parse_zone(input: &str) -> Result<Option<AwsTimeZone>> {
    if input.is_empty() {
        return Ok(None);
    }
    let invalid =
        || CoreError::invalid_temporal(input, "Failed to parse timezone offset", ZONE_SUGGESTION);
    let caps = ZONE_REGEX.captures(input).ok_or_else(invalid)?;
    if input == "Z" {
        return Ok(Some(AwsTimeZone::utc()));
    }

    let negative = caps.get(1).is_some_and(|m| m.as_str() == "-");
    let hours = group_number(&caps, 2) as i8;
    let minutes = group_number(&caps, 3) as i8;
    let seconds = group_number(&caps, 4) as i8;
    let offset = if negative {
        UtcOffset::from_hms(-hours, -minutes, -seconds)
    } else {
        UtcOffset::from_hms(hours, minutes, seconds)
    }
    .map_err(|_| invalid())?;

    Ok(Some(AwsTimeZone::from_offset(offset)))
}

fn calendar_date(caps: &Captures<'_>, first: usize) -> Option<Date> {
    let year = group_number(caps, first) as i32;
    let month = Month::try_from(group_number(caps, first + 1) as u8).ok()?;
    let day = group_number(caps, first + 2) as u8;
    Date::from_calendar_date(year, month, day).ok()
}

fn clock_time(caps: &Captures<'_>, first: usize) -> Option<Time> {
    Time::from_hms_milli(
        group_number(caps, first) as u8,
        group_number(caps, first + 1) as u8,
        group_number(caps, first + 2) as u8,
        group_number(caps, first + 3) as u16,
    )
    .ok()
}

/// Numeric value of an optional capture group; absent groups read as zero.
fn group_number(caps: &Captures<'_>, index: usize) -> u32 {
    caps.get(index)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

// ============================================================================
// Formatting
// ============================================================================

pub(crate) fn format_offset(offset: UtcOffset) -> String {
    if offset.is_utc() {
        return "Z".to_string();
    }
    let sign = if offset.is_negative() { '-' } else { '+' };
    let (hours, minutes, seconds) = offset.as_hms();
    if seconds != 0 {
        format!(
            "{sign}{:02}:{:02}:{:02}",
            hours.unsigned_abs(),
            minutes.unsigned_abs(),
            seconds.unsigned_abs()
        )
    } else {
        format!("{sign}{:02}:{:02}", hours.unsigned_abs(), minutes.unsigned_abs())
    }
}

/// Drops precision finer than the milliseconds carried on the wire.
pub(crate) fn truncate_to_millis(time: Time) -> Time {
    time.replace_nanosecond(u32::from(time.millisecond()) * 1_000_000)
        .unwrap_or(time)
}

pub(crate) fn format_date(date: Date) -> String {
    format!("{:04}-{:02}-{:02}", date.year(), u8::from(date.month()), date.day())
}

/// `hh:mm:ss`, with `.sss` only when the milliseconds are non-zero.
pub(crate) fn format_time(time: Time) -> String {
    let base = format!("{:02}:{:02}:{:02}", time.hour(), time.minute(), time.second());
    match time.millisecond() {
        0 => base,
        millis => format!("{base}.{millis:03}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, offset, time};

    #[test]
    fn test_parse_date_with_and_without_zone() {
        let (parsed, zone) = parse_date("2020-01-15").unwrap();
        assert_eq!(parsed, date!(2020 - 01 - 15));
        assert!(zone.is_none());

        let (_, zone) = parse_date("2020-01-15-05:00").unwrap();
        assert_eq!(zone.unwrap().utc_offset(), offset!(-5));
    }

    #[test]
    fn test_parse_date_rejects_impossible_day() {
        let err = parse_date("2021-02-30").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Failed to parse Date in [2021-02-30]. Verify that date matches 'YYYY-MM-DD' pattern."
        );
    }

    #[test]
    fn test_parse_date_rejects_short_fields() {
        assert!(parse_date("2020-1-15").is_err());
        assert!(parse_date("20-01-15").is_err());
    }

    #[test]
    fn test_trailing_garbage_is_zone_error() {
        let err = parse_date("2020-01-15junk").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Failed to parse timezone offset in [junk]. Verify that timezone offset matches 'Z|±hh:mm:ss' pattern."
        );
    }

    #[test]
    fn test_parse_time_variants() {
        assert_eq!(parse_time("10:30").unwrap().0, time!(10:30));
        assert_eq!(parse_time("10:30:15").unwrap().0, time!(10:30:15));
        assert_eq!(parse_time("10:30:15.250").unwrap().0, time!(10:30:15.250));
        assert!(parse_time("24:00").is_err());
        assert!(parse_time("10:30:15.25").is_err());
    }

    #[test]
    fn test_parse_date_time_requires_zone() {
        let err = parse_date_time("2020-01-15T10:00:00").unwrap_err();
        assert!(err.to_string().starts_with(
            "The time zone offset is compulsory for AWSDateTime scalar in [2020-01-15T10:00:00]."
        ));
        assert!(parse_date_time("2020-01-15 10:00:00Z").is_err());
    }

    #[test]
    fn test_parse_zone_forms() {
        assert_eq!(parse_zone("Z").unwrap().unwrap().id(), "UTC");
        assert_eq!(parse_zone("+05").unwrap().unwrap().utc_offset(), offset!(+5));
        assert_eq!(parse_zone("-05:30").unwrap().unwrap().id(), "GMT-05:30");
        assert!(parse_zone("+05:30:15").unwrap().unwrap().is_extended());
        assert_eq!(parse_zone("-00:00").unwrap().unwrap().suffix(), "Z");
        assert!(parse_zone("+24:00").is_err());
        assert!(parse_zone("z").is_err());
    }

    #[test]
    fn test_format_offset() {
        assert_eq!(format_offset(offset!(UTC)), "Z");
        assert_eq!(format_offset(offset!(-5)), "-05:00");
        assert_eq!(format_offset(offset!(+5:30)), "+05:30");
        assert_eq!(format_offset(offset!(-1:02:03)), "-01:02:03");
    }

    #[test]
    fn test_format_time_millis() {
        assert_eq!(format_time(time!(09:05)), "09:05:00");
        assert_eq!(format_time(time!(09:05:07.008)), "09:05:07.008");
    }
}
