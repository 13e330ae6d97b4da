//! Access schedules
//!
//! A schedule is the conjunction of an inclusive date range, a set of allowed
//! weekdays and an inclusive daily time window.

use crate::types::Moment;
use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Weekdays from Monday to Friday
pub const WORKING_DAYS: [Weekday; 5] =
    [Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu, Weekday::Fri];

/// Every day of the week
pub const ALL_DAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Why a moment falls outside a schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleMiss {
    /// The date is outside `[start_date, end_date]`
    DateRange,
    /// The weekday is not allowed
    Weekday,
    /// The time of day is outside `[daily_start, daily_end]`
    TimeOfDay,
}

impl fmt::Display for ScheduleMiss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleMiss::DateRange => write!(f, "date range"),
            ScheduleMiss::Weekday => write!(f, "weekday"),
            ScheduleMiss::TimeOfDay => write!(f, "time of day"),
        }
    }
}

/// Window of time during which a group's permissions are active
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    /// First allowed date (inclusive)
    pub start_date: NaiveDate,
    /// Last allowed date (inclusive)
    pub end_date: NaiveDate,
    /// Allowed weekdays; empty means never
    pub allowed_weekdays: HashSet<Weekday>,
    /// Start of the daily window (inclusive)
    pub daily_start: NaiveTime,
    /// End of the daily window (inclusive)
    pub daily_end: NaiveTime,
}

impl Schedule {
    /// Create a new schedule
    pub fn new(
        start_date: NaiveDate,
        end_date: NaiveDate,
        allowed_weekdays: impl IntoIterator<Item = Weekday>,
        daily_start: NaiveTime,
        daily_end: NaiveTime,
    ) -> Self {
        Self {
            start_date,
            end_date,
            allowed_weekdays: allowed_weekdays.into_iter().collect(),
            daily_start,
            daily_end,
        }
    }

    /// A degenerate schedule that never matches.
    ///
    /// The date range ends the day before it starts and no weekday is
    /// allowed; this is how "no access" groups are built.
    pub fn never(today: NaiveDate) -> Self {
        let yesterday = today.pred_opt().unwrap_or(NaiveDate::MIN);
        Self {
            start_date: today,
            end_date: yesterday,
            allowed_weekdays: HashSet::new(),
            daily_start: NaiveTime::MIN,
            daily_end: NaiveTime::MIN,
        }
    }

    /// Whether the schedule can never match any moment
    pub fn is_never(&self) -> bool {
        self.allowed_weekdays.is_empty()
            || self.end_date < self.start_date
            || self.daily_end < self.daily_start
    }

    /// Check a moment, naming the first failing component
    pub fn check(&self, moment: Moment) -> Result<(), ScheduleMiss> {
        let date = moment.date();
        if date < self.start_date || date > self.end_date {
            return Err(ScheduleMiss::DateRange);
        }

        if !self.allowed_weekdays.contains(&date.weekday()) {
            return Err(ScheduleMiss::Weekday);
        }

        let time = moment.time();
        if time < self.daily_start || time > self.daily_end {
            return Err(ScheduleMiss::TimeOfDay);
        }

        Ok(())
    }

    /// Whether the moment is inside the schedule
    pub fn contains(&self, moment: Moment) -> bool {
        self.check(moment).is_ok()
    }
}
