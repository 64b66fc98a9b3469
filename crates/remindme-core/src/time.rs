//! Reminder time handling.
//!
//! A [`ReminderTime`] is an instant carrying the UTC offset it was entered
//! with. It accepts two textual shapes:
//!
//! - RFC 3339 / ISO 8601 with an offset, e.g. `2024-05-01T10:00:00-07:00`
//! - a browser `datetime-local` value without an offset, e.g.
//!   `2024-05-01T10:00`, interpreted in a given time zone (the local one by
//!   default)
//!
//! On the wire it is always written back as RFC 3339 with second precision.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Offset-less layouts accepted as local wall-clock times.
const LOCAL_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// The scheduled time of a reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReminderTime(DateTime<FixedOffset>);

impl ReminderTime {
    /// Wraps an already resolved instant.
    pub fn new(at: DateTime<FixedOffset>) -> Self {
        Self(at)
    }

    /// Parses a reminder time, reading offset-less input in the local zone.
    pub fn parse(input: &str) -> CoreResult<Self> {
        Self::parse_in(input, &Local)
    }

    /// Parses a reminder time, reading offset-less input in `tz`.
    pub fn parse_in<Tz: TimeZone>(input: &str, tz: &Tz) -> CoreResult<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(CoreError::invalid_time(input, "empty value"));
        }

        if let Ok(at) = DateTime::parse_from_rfc3339(trimmed) {
            return Ok(Self(at));
        }

        for format in LOCAL_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
                // Ambiguous wall-clock times (DST fall-back) resolve to the earlier instant.
                return tz
                    .from_local_datetime(&naive)
                    .earliest()
                    .map(|at| Self(at.fixed_offset()))
                    .ok_or_else(|| {
                        CoreError::invalid_time(input, "time does not exist in this time zone")
                    });
            }
        }

        Err(CoreError::invalid_time(
            input,
            "expected RFC 3339 (2024-05-01T10:00:00-07:00) or YYYY-MM-DDTHH:MM",
        ))
    }

    /// Returns the instant with its own UTC offset.
    pub fn as_datetime(&self) -> &DateTime<FixedOffset> {
        &self.0
    }

    /// Returns the instant in UTC.
    pub fn to_utc(&self) -> DateTime<Utc> {
        self.0.with_timezone(&Utc)
    }

    /// Returns true if the reminder time is already behind `now`.
    pub fn is_past(&self, now: DateTime<Utc>) -> bool {
        self.to_utc() < now
    }

    /// Formats the time in the given zone for display.
    pub fn display_in<Tz: TimeZone>(&self, tz: &Tz) -> String
    where
        Tz::Offset: fmt::Display,
    {
        self.0.with_timezone(tz).format("%Y-%m-%d %H:%M").to_string()
    }
}

impl fmt::Display for ReminderTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_rfc3339_opts(SecondsFormat::Secs, false))
    }
}

impl FromStr for ReminderTime {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ReminderTime {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ReminderTime> for String {
    fn from(value: ReminderTime) -> Self {
        value.to_string()
    }
}

impl From<DateTime<FixedOffset>> for ReminderTime {
    fn from(value: DateTime<FixedOffset>) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn pacific() -> FixedOffset {
        FixedOffset::west_opt(7 * 3600).unwrap()
    }

    #[test]
    fn parses_rfc3339_with_offset() {
        let t = ReminderTime::parse_in("2024-05-01T10:00:00-07:00", &Utc).unwrap();
        assert_eq!(t.to_string(), "2024-05-01T10:00:00-07:00");
        assert_eq!(t.to_utc().to_rfc3339(), "2024-05-01T17:00:00+00:00");
    }

    #[test]
    fn parses_datetime_local_in_zone() {
        let t = ReminderTime::parse_in("2024-05-01T10:00", &pacific()).unwrap();
        assert_eq!(t.to_string(), "2024-05-01T10:00:00-07:00");

        let with_seconds = ReminderTime::parse_in("2024-05-01 10:00:30", &pacific()).unwrap();
        assert_eq!(with_seconds.to_string(), "2024-05-01T10:00:30-07:00");
    }

    #[test]
    fn rejects_garbage_and_empty() {
        assert!(matches!(
            ReminderTime::parse_in("", &Utc),
            Err(CoreError::InvalidTime { .. })
        ));
        assert!(matches!(
            ReminderTime::parse_in("tomorrow at noon", &Utc),
            Err(CoreError::InvalidTime { .. })
        ));
    }

    #[test]
    fn equal_instants_compare_equal_across_offsets() {
        let a = ReminderTime::parse_in("2024-05-01T10:00:00-07:00", &Utc).unwrap();
        let b = ReminderTime::parse_in("2024-05-01T17:00:00Z", &Utc).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn serde_uses_rfc3339_string() {
        let t = ReminderTime::parse_in("2024-05-01T10:00:00+02:00", &Utc).unwrap();
        let json = serde_json::to_string(&t).unwrap();
        assert_eq!(json, "\"2024-05-01T10:00:00+02:00\"");

        let err = serde_json::from_str::<ReminderTime>("\"not a time\"");
        assert!(err.is_err());
    }

    #[test]
    fn is_past_compares_against_now() {
        let now = Utc::now();
        let earlier = ReminderTime::new((now - Duration::hours(1)).fixed_offset());
        let later = ReminderTime::new((now + Duration::hours(1)).fixed_offset());
        assert!(earlier.is_past(now));
        assert!(!later.is_past(now));
    }

    #[test]
    fn display_in_zone() {
        let t = ReminderTime::parse_in("2024-05-01T17:00:00Z", &Utc).unwrap();
        assert_eq!(t.display_in(&pacific()), "2024-05-01 10:00");
    }
}
