//! Daily rotation schedule
//!
//! The deadline is today's `hh:mm:00` in local time when that is still ahead
//! of `now`, otherwise that instant plus 24 hours. Across a DST change the
//! wall-clock time of the next deadline moves by the shift. It is computed
//! at construction and again only when a rotation fires.

use std::fmt;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone};

use crate::common::{Result, SinkError};

/// Source of the current local time
pub trait Clock: Send + Sync {
    /// Current local time
    fn now(&self) -> DateTime<Local>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Validated time of day at which a daily sink rotates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationTime {
    hour: u32,
    minute: u32,
}

impl RotationTime {
    /// Midnight
    pub const MIDNIGHT: Self = Self { hour: 0, minute: 0 };

    /// Validate `hour` (0-23) and `minute` (0-59)
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::InvalidRotationTime`] when either is out of range.
    pub fn new(hour: u32, minute: u32) -> Result<Self> {
        if hour > 23 || minute > 59 {
            return Err(SinkError::InvalidRotationTime { hour, minute });
        }
        Ok(Self { hour, minute })
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    pub fn minute(&self) -> u32 {
        self.minute
    }

    /// Next rotation instant strictly after `now`
    ///
    /// Generic over the zone so the arithmetic can run outside `Local`.
    pub fn next_after<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> DateTime<Tz> {
        let mut deadline = self.on(&now.timezone(), now.date_naive());
        // Once on ordinary days; late on a 25-hour day still needs a second step
        while deadline <= *now {
            deadline = deadline + TimeDelta::hours(24);
        }
        deadline
    }

    /// This time of day on `date`, resolved in `tz`
    fn on<Tz: TimeZone>(&self, tz: &Tz, date: NaiveDate) -> DateTime<Tz> {
        let time = NaiveTime::from_hms_opt(self.hour, self.minute, 0).unwrap_or_default();
        resolve_local(tz, date.and_time(time))
    }
}

impl Default for RotationTime {
    fn default() -> Self {
        Self::MIDNIGHT
    }
}

impl fmt::Display for RotationTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// Map a local wall-clock time to an instant
///
/// A time inside a DST fold takes the earlier instant; a time inside a DST
/// gap is shifted forward an hour at a time until it exists.
fn resolve_local<Tz: TimeZone>(tz: &Tz, mut naive: NaiveDateTime) -> DateTime<Tz> {
    for _ in 0..24 {
        if let Some(instant) = tz.from_local_datetime(&naive).earliest() {
            return instant;
        }
        naive += TimeDelta::hours(1);
    }
    // No zone skips a whole day of wall-clock time
    tz.from_utc_datetime(&naive)
}

#[cfg(test)]
#[path = "schedule_test.rs"]
mod schedule_test;
