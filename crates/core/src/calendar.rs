//! Fixed calendar used for every derived time field.
//!
//! All derivations use the proleptic Gregorian calendar in UTC. Weekdays are
//! numbered 1 = Sunday .. 7 = Saturday.

use chrono::{DateTime, Datelike, Timelike, Utc};
use serde::{Deserialize, Serialize};

const SECS_PER_HOUR: i64 = 3_600;
const SECS_PER_DAY: i64 = 86_400;

/// Calendar fields derived from a timestamp.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CalendarFields {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub weekday: u32,
}

impl CalendarFields {
    pub fn from_timestamp(ts: &DateTime<Utc>) -> Self {
        Self {
            year: ts.year(),
            month: ts.month(),
            day: ts.day(),
            hour: ts.hour(),
            weekday: ts.weekday().number_from_sunday(),
        }
    }

    /// Saturday or Sunday.
    pub fn is_weekend(&self) -> bool {
        self.weekday == 1 || self.weekday == 7
    }
}

/// An hour-wide bucket: whole hours since the Unix epoch.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HourBucket(pub i64);

impl HourBucket {
    /// Truncate a timestamp to the start of its hour.
    pub fn of(ts: &DateTime<Utc>) -> Self {
        Self(ts.timestamp().div_euclid(SECS_PER_HOUR))
    }

    /// The bucket `hours` earlier.
    pub fn back(self, hours: i64) -> Self {
        Self(self.0 - hours)
    }

    pub fn start(self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.0 * SECS_PER_HOUR, 0).unwrap_or_default()
    }

    pub fn calendar(self) -> CalendarFields {
        CalendarFields::from_timestamp(&self.start())
    }
}

/// A day-wide bucket: whole UTC days since the Unix epoch.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DayBucket(pub i64);

impl DayBucket {
    /// Truncate a timestamp to the start of its UTC day.
    pub fn of(ts: &DateTime<Utc>) -> Self {
        Self(ts.timestamp().div_euclid(SECS_PER_DAY))
    }

    /// The bucket `days` earlier.
    pub fn back(self, days: i64) -> Self {
        Self(self.0 - days)
    }

    pub fn start(self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.0 * SECS_PER_DAY, 0).unwrap_or_default()
    }

    pub fn calendar(self) -> CalendarFields {
        CalendarFields::from_timestamp(&self.start())
    }
}
