//! Time based triggers

use crate::error::{CaretakerError, Result};
use chrono::{Datelike, Duration as ChronoDuration, NaiveDateTime, NaiveTime, Weekday};
use std::fmt;
use std::time::Duration;

/// When a task becomes due
///
/// All arithmetic happens on local naive date-times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    DailyAt(NaiveTime),
    WeeklyAt(Weekday, NaiveTime),
    Every(Duration),
}

impl Trigger {
    /// `"HH:MM"` or `"HH:MM:SS"`
    pub fn daily_at(time: &str) -> Result<Self> {
        Ok(Trigger::DailyAt(parse_time(time)?))
    }

    pub fn weekly_at(weekday: &str, time: &str) -> Result<Self> {
        Ok(Trigger::WeeklyAt(parse_weekday(weekday)?, parse_time(time)?))
    }

    pub fn every(interval: Duration) -> Result<Self> {
        if interval.is_zero() {
            return Err(CaretakerError::schedule("Interval must be greater than zero"));
        }
        Ok(Trigger::Every(interval))
    }

    pub fn every_minutes(minutes: u64) -> Result<Self> {
        Self::every(Duration::from_secs(minutes.saturating_mul(60)))
    }

    /// First firing time strictly after `from`
    pub fn next_after(&self, from: NaiveDateTime) -> NaiveDateTime {
        match *self {
            Trigger::Every(interval) => {
                let step = ChronoDuration::from_std(interval).unwrap_or(ChronoDuration::MAX);
                from.checked_add_signed(step).unwrap_or(NaiveDateTime::MAX)
            }
            Trigger::DailyAt(time) => {
                let today = from.date().and_time(time);
                if today > from {
                    today
                } else {
                    today + ChronoDuration::days(1)
                }
            }
            Trigger::WeeklyAt(weekday, time) => {
                let days_ahead = (i64::from(weekday.num_days_from_monday())
                    - i64::from(from.weekday().num_days_from_monday()))
                .rem_euclid(7);
                let candidate = (from.date() + ChronoDuration::days(days_ahead)).and_time(time);
                if candidate > from {
                    candidate
                } else {
                    candidate + ChronoDuration::days(7)
                }
            }
        }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trigger::DailyAt(time) => write!(f, "daily at {}", time.format("%H:%M")),
            Trigger::WeeklyAt(day, time) => {
                write!(f, "every {} at {}", day, time.format("%H:%M"))
            }
            Trigger::Every(interval) => {
                let secs = interval.as_secs();
                if secs >= 3600 && secs % 3600 == 0 {
                    write!(f, "every {} hours", secs / 3600)
                } else if secs >= 60 && secs % 60 == 0 {
                    write!(f, "every {} minutes", secs / 60)
                } else {
                    write!(f, "every {} seconds", secs)
                }
            }
        }
    }
}

pub fn parse_time(value: &str) -> Result<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|_| CaretakerError::schedule(format!("Invalid time '{}', expected HH:MM", value)))
}

pub fn parse_weekday(value: &str) -> Result<Weekday> {
    value
        .trim()
        .parse::<Weekday>()
        .map_err(|_| CaretakerError::schedule(format!("Invalid weekday '{}'", value)))
}
