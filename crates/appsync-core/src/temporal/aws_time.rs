use std::fmt;

use time::{OffsetDateTime, PrimitiveDateTime, Time};

use super::parse::{format_time, parse_time, truncate_to_millis};
use super::zone::AwsTimeZone;
use crate::error::Result;

/// An `AWSTime` scalar: a time of day in a retained time zone.
///
/// The instant is anchored to 1970-01-01 so two times compare by their
/// position on that day once offsets are applied.
#[derive(Debug, Clone)]
pub struct AwsTime {
    date_time: OffsetDateTime,
    zone: AwsTimeZone,
}

impl AwsTime {
    pub fn new(time: Time, zone: AwsTimeZone) -> Self {
        let date_time = PrimitiveDateTime::new(OffsetDateTime::UNIX_EPOCH.date(), time)
            .assume_offset(zone.utc_offset());
        Self { date_time, zone }
    }

    /// Parse `hh:mm[:ss[.sss]][Z|±hh:mm[:ss]]`; a missing zone means the local zone.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidTemporal` on any deviation from the grammar.
    pub fn parse(input: &str) -> Result<Self> {
        let (time, zone) = parse_time(input)?;
        let zone = zone.unwrap_or_else(|| {
            AwsTimeZone::local_at(PrimitiveDateTime::new(OffsetDateTime::UNIX_EPOCH.date(), time))
        });
        Ok(Self::new(time, zone))
    }

    pub fn time(&self) -> Time {
        self.date_time.time()
    }

    pub fn time_zone(&self) -> &AwsTimeZone {
        &self.zone
    }

    pub fn offset_seconds(&self) -> i32 {
        self.zone.offset_seconds()
    }

    pub fn epoch_millis(&self) -> i64 {
        (self.instant_nanos() / 1_000_000) as i64
    }

    fn instant_nanos(&self) -> i128 {
        self.date_time.unix_timestamp_nanos()
    }
}

impl From<OffsetDateTime> for AwsTime {
    /// Takes the wall-clock time as seen at the value's own offset.
    fn from(value: OffsetDateTime) -> Self {
        Self::new(truncate_to_millis(value.time()), AwsTimeZone::from_offset(value.offset()))
    }
}

impl fmt::Display for AwsTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", format_time(self.time()), self.zone.suffix())
    }
}

impl_temporal_scalar!(AwsTime, "an AWSTime string (hh:mm[:ss[.sss]] with optional offset)");
