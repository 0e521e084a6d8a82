use std::fmt;

use time::{PrimitiveDateTime, UtcOffset};
use tracing::warn;

use super::parse::format_offset;
use crate::error::{CoreError, Result};

/// A time zone retained alongside a temporal value.
///
/// Offsets with a whole-minute component map to a standard `GMT±hh:mm` zone
/// (or `UTC`). Offsets carrying seconds cannot be named by a standard zone
/// id, so they are tagged with [`AwsTimeZone::EXTENDED_ID`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AwsTimeZone {
    id: String,
    offset: UtcOffset,
}

impl AwsTimeZone {
    /// Identifier of zones synthesized for offsets with a seconds component.
    pub const EXTENDED_ID: &'static str = "Extended";

    pub const UTC_ID: &'static str = "UTC";

    pub fn utc() -> Self {
        Self {
            id: Self::UTC_ID.to_string(),
            offset: UtcOffset::UTC,
        }
    }

    pub fn from_offset(offset: UtcOffset) -> Self {
        if offset.is_utc() {
            return Self::utc();
        }
        let (hours, minutes, seconds) = offset.as_hms();
        if seconds != 0 {
            return Self::extended(offset);
        }
        let sign = if offset.is_negative() { '-' } else { '+' };
        Self {
            id: format!(
                "GMT{sign}{:02}:{:02}",
                hours.unsigned_abs(),
                minutes.unsigned_abs()
            ),
            offset,
        }
    }

    /// A zone carrying the raw offset under the extended sentinel id.
    pub fn extended(offset: UtcOffset) -> Self {
        Self {
            id: Self::EXTENDED_ID.to_string(),
            offset,
        }
    }

    /// # Errors
    ///
    /// Returns `CoreError::InvalidTemporal` when the offset is outside ±25:59:59.
    pub fn from_offset_seconds(seconds: i32) -> Result<Self> {
        UtcOffset::from_whole_seconds(seconds)
            .map(Self::from_offset)
            .map_err(|err| {
                CoreError::invalid_temporal(
                    seconds.to_string(),
                    format!("Invalid timezone offset ({err})"),
                    "Verify that timezone offset matches 'Z|±hh:mm:ss' pattern.",
                )
            })
    }

    /// The local zone of this process as it applies to `wall_clock`, so
    /// daylight saving follows the date being read rather than today.
    ///
    /// Falls back to UTC when the local offset cannot be determined.
    pub fn local_at(wall_clock: PrimitiveDateTime) -> Self {
        match UtcOffset::local_offset_at(wall_clock.assume_utc()) {
            Ok(offset) => Self::from_offset(offset),
            Err(err) => {
                warn!(
                    error = %err,
                    wall_clock = %wall_clock,
                    "Local timezone offset is indeterminate, falling back to UTC"
                );
                Self::utc()
            }
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn utc_offset(&self) -> UtcOffset {
        self.offset
    }

    pub fn offset_seconds(&self) -> i32 {
        self.offset.whole_seconds()
    }

    pub fn raw_offset_millis(&self) -> i32 {
        self.offset.whole_seconds() * 1000
    }

    pub fn is_extended(&self) -> bool {
        self.id == Self::EXTENDED_ID
    }

    /// Wire suffix: `Z`, `±hh:mm` or `±hh:mm:ss`.
    pub fn suffix(&self) -> String {
        format_offset(self.offset)
    }
}

impl Default for AwsTimeZone {
    fn default() -> Self {
        Self::utc()
    }
}

impl fmt::Display for AwsTimeZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}
