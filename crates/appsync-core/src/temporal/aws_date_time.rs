use std::fmt;

use time::{OffsetDateTime, PrimitiveDateTime};

use super::parse::{format_date, format_time, parse_date_time, truncate_to_millis};
use super::zone::AwsTimeZone;
use crate::error::{CoreError, Result};

/// An `AWSDateTime` scalar: an instant with a mandatory, retained time zone.
#[derive(Debug, Clone)]
pub struct AwsDateTime {
    date_time: OffsetDateTime,
    zone: AwsTimeZone,
}

impl AwsDateTime {
    pub fn new(date_time: PrimitiveDateTime, zone: AwsTimeZone) -> Self {
        Self {
            date_time: date_time.assume_offset(zone.utc_offset()),
            zone,
        }
    }

    /// Build from epoch milliseconds viewed in `zone`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidTemporal` when the instant is out of range.
    pub fn from_epoch_millis(millis: i64, zone: AwsTimeZone) -> Result<Self> {
        let instant = OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000)
            .map_err(|err| {
                CoreError::invalid_temporal(
                    millis.to_string(),
                    format!("Epoch milliseconds out of range ({err})"),
                    "Verify that the instant lies between years -9999 and 9999.",
                )
            })?;
        Ok(Self {
            date_time: instant.to_offset(zone.utc_offset()),
            zone,
        })
    }

    /// Parse `YYYY-MM-DDThh:mm[:ss[.sss]](Z|±hh:mm[:ss])`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidTemporal` on any deviation from the grammar,
    /// including a missing zone.
    pub fn parse(input: &str) -> Result<Self> {
        let (date, time, zone) = parse_date_time(input)?;
        Ok(Self::new(PrimitiveDateTime::new(date, time), zone))
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

    pub fn to_offset_date_time(&self) -> OffsetDateTime {
        self.date_time
    }

    fn instant_nanos(&self) -> i128 {
        self.date_time.unix_timestamp_nanos()
    }
}

impl From<OffsetDateTime> for AwsDateTime {
    /// Keeps millisecond precision, matching what the wire format can carry.
    fn from(value: OffsetDateTime) -> Self {
        Self {
            zone: AwsTimeZone::from_offset(value.offset()),
            date_time: value.replace_time(truncate_to_millis(value.time())),
        }
    }
}

impl From<AwsDateTime> for OffsetDateTime {
    fn from(value: AwsDateTime) -> Self {
        value.date_time
    }
}

impl fmt::Display for AwsDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}T{}{}",
            format_date(self.date_time.date()),
            format_time(self.date_time.time()),
            self.zone.suffix()
        )
    }
}

impl_temporal_scalar!(AwsDateTime, "an AWSDateTime string (YYYY-MM-DDThh:mm:ss.sss with offset)");
