//! AppSync temporal scalars: `AWSDate`, `AWSTime` and `AWSDateTime`.
//!
//! Each value keeps the absolute instant *and* the time zone it was written
//! in, so formatting reproduces the offset the server sent. Equality,
//! ordering and hashing look at the instant only: `10:00Z` and `05:00-05:00`
//! on the same day are the same value.
//!
//! Wire formats:
//!
//! | Scalar | Format |
//! |--------|--------|
//! | `AWSDate` | `YYYY-MM-DD[Z\|±hh:mm[:ss]]` |
//! | `AWSTime` | `hh:mm[:ss[.sss]][Z\|±hh:mm[:ss]]` |
//! | `AWSDateTime` | `YYYY-MM-DDThh:mm[:ss[.sss]](Z\|±hh:mm[:ss])` |
//!
//! A date or time written without a zone is read in the local zone of the
//! process, using the offset in effect at that wall-clock time (times use
//! 1970-01-01). A date-time without a zone is rejected. Values converted
//! from `OffsetDateTime` keep millisecond precision only.

/// Implements instant-based comparison, `FromStr` and string serde for a temporal scalar.
///
/// The type must provide `fn instant_nanos(&self) -> i128` and
/// `fn parse(&str) -> crate::error::Result<Self>`, and implement `Display`.
macro_rules! impl_temporal_scalar {
    ($ty:ident, $expecting:literal) => {
        impl PartialEq for $ty {
            fn eq(&self, other: &Self) -> bool {
                self.instant_nanos() == other.instant_nanos()
            }
        }

        impl Eq for $ty {}

        impl std::hash::Hash for $ty {
            fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
                self.instant_nanos().hash(state);
            }
        }

        impl PartialOrd for $ty {
            fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
                Some(self.cmp(other))
            }
        }

        impl Ord for $ty {
            fn cmp(&self, other: &Self) -> std::cmp::Ordering {
                self.instant_nanos().cmp(&other.instant_nanos())
            }
        }

        impl std::str::FromStr for $ty {
            type Err = crate::error::CoreError;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl serde::Serialize for $ty {
            fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.collect_str(self)
            }
        }

        impl<'de> serde::Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                struct Visitor;

                impl serde::de::Visitor<'_> for Visitor {
                    type Value = $ty;

                    fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                        f.write_str($expecting)
                    }

                    fn visit_str<E: serde::de::Error>(self, v: &str) -> std::result::Result<$ty, E> {
                        $ty::parse(v).map_err(E::custom)
                    }
                }

                deserializer.deserialize_str(Visitor)
            }
        }
    };
}

mod aws_date;
mod aws_date_time;
mod aws_time;
mod parse;
mod zone;

pub use aws_date::AwsDate;
pub use aws_date_time::AwsDateTime;
pub use aws_time::AwsTime;
pub use zone::AwsTimeZone;
