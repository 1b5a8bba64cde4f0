//! UTC timestamps with microsecond precision.
//!
//! The canonical text form is an RFC 3339 profile:
//! - always UTC with a `Z` suffix
//! - fractional seconds only when non-zero, trailing zeros trimmed
//! - four-digit years, 0000 through 9999
//!
//! Parsing accepts any RFC 3339 offset and normalizes to UTC.

use std::fmt;
use std::str::FromStr;

use time::format_description::well_known::Rfc3339;
use time::{Duration, OffsetDateTime};

use crate::error::FormatError;

const NANOS_PER_MICRO: i128 = 1_000;
const MIN_YEAR: i32 = 0;
const MAX_YEAR: i32 = 9999;

/// A point in time, stored in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Timestamp(OffsetDateTime);

impl Timestamp {
    /// 1970-01-01T00:00:00Z
    pub const UNIX_EPOCH: Timestamp = Timestamp(OffsetDateTime::UNIX_EPOCH);

    /// The current time, truncated to microseconds.
    pub fn now() -> Self {
        let now = OffsetDateTime::now_utc();
        Timestamp(now - Duration::nanoseconds(i64::from(now.nanosecond() % 1_000)))
    }

    /// Creates a timestamp from microseconds since the Unix epoch.
    pub fn from_epoch_micros(micros: i64) -> Result<Self, FormatError> {
        let nanos = i128::from(micros) * NANOS_PER_MICRO;
        let dt = OffsetDateTime::from_unix_timestamp_nanos(nanos)
            .map_err(|_| FormatError::TimestampOutOfRange { epoch_nanos: nanos })?;
        Self::checked(dt)
    }

    /// Creates a timestamp from milliseconds since the Unix epoch.
    pub fn from_epoch_millis(millis: i64) -> Result<Self, FormatError> {
        let micros = millis
            .checked_mul(1_000)
            .ok_or(FormatError::TimestampOutOfRange { epoch_nanos: i128::from(millis) * 1_000_000 })?;
        Self::from_epoch_micros(micros)
    }

    /// Converts any date-time to a timestamp, dropping sub-microsecond digits.
    pub fn from_datetime(dt: OffsetDateTime) -> Result<Self, FormatError> {
        let nanos = dt.unix_timestamp_nanos();
        let nanos = nanos - nanos.rem_euclid(NANOS_PER_MICRO);
        let utc = OffsetDateTime::from_unix_timestamp_nanos(nanos)
            .map_err(|_| FormatError::TimestampOutOfRange { epoch_nanos: nanos })?;
        Self::checked(utc)
    }

    fn checked(utc: OffsetDateTime) -> Result<Self, FormatError> {
        if !(MIN_YEAR..=MAX_YEAR).contains(&utc.year()) {
            return Err(FormatError::TimestampOutOfRange {
                epoch_nanos: utc.unix_timestamp_nanos(),
            });
        }
        Ok(Timestamp(utc))
    }

    /// Microseconds since the Unix epoch.
    pub fn epoch_micros(&self) -> i64 {
        let micros = self.0.unix_timestamp_nanos() / NANOS_PER_MICRO;
        // Saturation is unreachable for years 0000-9999.
        i64::try_from(micros).unwrap_or(if micros < 0 { i64::MIN } else { i64::MAX })
    }

    pub fn as_datetime(&self) -> OffsetDateTime {
        self.0
    }

    /// Parses RFC 3339 text.
    ///
    /// Sub-microsecond digits are rejected rather than truncated.
    pub fn from_text(s: &str) -> Result<Self, FormatError> {
        let parsed = OffsetDateTime::parse(s, &Rfc3339).map_err(|err| FormatError::Timestamp {
            input: s.to_string(),
            reason: err.to_string(),
        })?;
        if parsed.nanosecond() % 1_000 != 0 {
            return Err(FormatError::Timestamp {
                input: s.to_string(),
                reason: "precision finer than microseconds".to_string(),
            });
        }
        Self::from_datetime(parsed)
    }

    /// Returns the canonical text form.
    ///
    /// Formatting fails only outside years 0000-9999, which construction
    /// already rules out.
    pub fn to_text(&self) -> Result<String, FormatError> {
        self.0.format(&Rfc3339).map_err(|_| FormatError::TimestampOutOfRange {
            epoch_nanos: self.0.unix_timestamp_nanos(),
        })
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self.to_text().map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

impl FromStr for Timestamp {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Timestamp::from_text(s)
    }
}

impl TryFrom<OffsetDateTime> for Timestamp {
    type Error = FormatError;

    fn try_from(dt: OffsetDateTime) -> Result<Self, Self::Error> {
        Timestamp::from_datetime(dt)
    }
}
