use std::fmt;

use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};

use super::parse::{format_date, parse_date};
use super::zone::AwsTimeZone;
use crate::error::Result;

/// An `AWSDate` scalar: a calendar date at midnight in a retained time zone.
#[derive(Debug, Clone)]
pub struct AwsDate {
    date_time: OffsetDateTime,
    zone: AwsTimeZone,
}

impl AwsDate {
    pub fn new(date: Date, zone: AwsTimeZone) -> Self {
        let date_time = PrimitiveDateTime::new(date, Time::MIDNIGHT)
            .assume_offset(zone.utc_offset());
        Self { date_time, zone }
    }

    /// Parse `YYYY-MM-DD[Z|±hh:mm[:ss]]`; a missing zone means the local zone.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidTemporal` on any deviation from the grammar.
    pub fn parse(input: &str) -> Result<Self> {
        let (date, zone) = parse_date(input)?;
        let zone = zone.unwrap_or_else(|| {
            AwsTimeZone::local_at(PrimitiveDateTime::new(date, Time::MIDNIGHT))
        });
        Ok(Self::new(date, zone))
    }

    pub fn date(&self) -> Date {
        self.date_time.date()
    }

    pub fn time_zone(&self) -> &AwsTimeZone {
        &self.zone
    }

    pub fn offset_seconds(&self) -> i32 {
        self.zone.offset_seconds()
    }

    /// Milliseconds since the Unix epoch of midnight in the retained zone.
    pub fn epoch_millis(&self) -> i64 {
        (self.instant_nanos() / 1_000_000) as i64
    }

    pub fn to_offset_date_time(&self) -> OffsetDateTime {
        self.date_time
    }

    fn instant_nanos(&self) -> i128 {
        self.date_time.unix_timestamp_nanos()
    }
}

impl From<OffsetDateTime> for AwsDate {
    /// Takes the calendar date as seen at the value's own offset.
    fn from(value: OffsetDateTime) -> Self {
        Self::new(value.date(), AwsTimeZone::from_offset(value.offset()))
    }
}

impl From<AwsDate> for OffsetDateTime {
    fn from(value: AwsDate) -> Self {
        value.date_time
    }
}

impl fmt::Display for AwsDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", format_date(self.date()), self.zone.suffix())
    }
}

impl_temporal_scalar!(AwsDate, "an AWSDate string (YYYY-MM-DD with optional offset)");
