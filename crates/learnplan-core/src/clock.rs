//! Learner-local time as the planner sees it.

use chrono::{DateTime, Datelike, Days, FixedOffset, NaiveDate, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::schedule::Slot;

/// Current position on the weekly grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockReading {
    /// Hour of day, 0..=23.
    pub period: u8,
    /// Day of week, Monday = 1.
    pub day: u8,
    /// Calendar weeks since the one the learner's schedule was created in.
    pub week: u32,
}

impl ClockReading {
    pub fn slot(&self) -> Slot {
        Slot {
            day: self.day,
            period: self.period,
        }
    }
}

pub trait Clock {
    fn now(&self) -> ClockReading;
}

/// Wall clock in a fixed UTC offset.
///
/// Weeks start on Monday 00:00 local time, matching the wrap of the
/// weekly grid, and are counted from the week containing `created_at`.
#[derive(Debug, Clone)]
pub struct SystemClock {
    offset: FixedOffset,
    week_origin: NaiveDate,
    pinned: Option<DateTime<Utc>>,
}

impl SystemClock {
    pub fn new(offset: FixedOffset, created_at: DateTime<Utc>) -> Self {
        let created = created_at.with_timezone(&offset).date_naive();
        let since_monday = u64::from(created.weekday().num_days_from_monday());
        let week_origin = created
            .checked_sub_days(Days::new(since_monday))
            .unwrap_or(created);
        Self {
            offset,
            week_origin,
            pinned: None,
        }
    }

    /// The same clock stopped at `at`.
    pub fn pinned_at(self, at: DateTime<Utc>) -> Self {
        Self {
            pinned: Some(at),
            ..self
        }
    }

    /// Reading for an arbitrary instant. Weeks before the creation week are week 0.
    pub fn reading_at(&self, at: DateTime<Utc>) -> ClockReading {
        let local = at.with_timezone(&self.offset);
        let days = (local.date_naive() - self.week_origin).num_days();
        let week = days.div_euclid(7).max(0);
        ClockReading {
            period: local.hour() as u8,
            day: local.weekday().number_from_monday() as u8,
            week: u32::try_from(week).unwrap_or(u32::MAX),
        }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> ClockReading {
        self.reading_at(self.pinned.unwrap_or_else(Utc::now))
    }
}

/// Always returns the same reading.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub ClockReading);

impl Clock for FixedClock {
    fn now(&self) -> ClockReading {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn reading_uses_local_offset() {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let clock = SystemClock::new(FixedOffset::east_opt(3 * 3600).unwrap(), created);

        // Sunday 22:30 UTC is Monday 01:30 at +03:00.
        let at = Utc.with_ymd_and_hms(2024, 1, 21, 22, 30, 0).unwrap();
        let reading = clock.reading_at(at);

        assert_eq!(reading.day, 1);
        assert_eq!(reading.period, 1);
        assert_eq!(reading.week, 3);
        assert_eq!(reading.slot(), Slot { day: 1, period: 1 });
    }

    #[test]
    fn instants_before_creation_are_week_zero() {
        let created = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let clock = SystemClock::new(FixedOffset::east_opt(0).unwrap(), created);
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(clock.reading_at(at).week, 0);
    }

    #[test]
    fn week_turns_over_on_monday_midnight() {
        // Created on a Monday mid-morning.
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        let clock = SystemClock::new(FixedOffset::east_opt(0).unwrap(), created);

        let week_of = |d, h| {
            let at = Utc.with_ymd_and_hms(2024, 1, d, h, 0, 0).unwrap();
            clock.reading_at(at).week
        };
        assert_eq!(week_of(1, 9), 0);
        assert_eq!(week_of(7, 23), 0);
        assert_eq!(week_of(8, 0), 1);
        assert_eq!(week_of(8, 9), 1);
        assert_eq!(week_of(8, 11), 1);
    }

    #[test]
    fn pinned_clock_reads_the_pinned_instant() {
        let created = Utc.with_ymd_and_hms(2024, 1, 3, 0, 0, 0).unwrap();
        let at = Utc.with_ymd_and_hms(2024, 1, 17, 14, 0, 0).unwrap();
        let clock = SystemClock::new(FixedOffset::east_opt(0).unwrap(), created).pinned_at(at);
        assert_eq!(
            clock.now(),
            ClockReading {
                period: 14,
                day: 3,
                week: 2,
            }
        );
    }

    #[test]
    fn fixed_clock_is_fixed() {
        let reading = ClockReading {
            period: 9,
            day: 3,
            week: 4,
        };
        assert_eq!(FixedClock(reading).now(), reading);
    }
}
