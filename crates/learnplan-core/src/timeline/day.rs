//! User-day window and its free periods.

use serde::{Deserialize, Serialize};

use crate::schedule::Slot;

/// Smallest share of an hour a free slot is worth, whatever the readiness.
pub const READINESS_FLOOR: f64 = 0.2;

const SECONDS_PER_HOUR: f64 = 3600.0;

/// One free hour inside a [`FreePeriodGroup`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FreePeriodGroupElement {
    pub period: u8,
    /// `sin(free hours so far today) / 2`
    pub wave: f64,
    pub readiness: f64,
}

/// A contiguous run of free slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreePeriodGroup {
    pub start: Slot,
    pub elements: Vec<FreePeriodGroupElement>,
    pub total_duration_sec: f64,
    pub modified_duration_sec: f64,
}

impl FreePeriodGroup {
    pub fn new(start: Slot) -> Self {
        Self {
            start,
            elements: Vec::new(),
            total_duration_sec: 0.0,
            modified_duration_sec: 0.0,
        }
    }

    /// Returns the group extended by one free hour.
    pub fn with_element(mut self, element: FreePeriodGroupElement) -> Self {
        self.total_duration_sec += SECONDS_PER_HOUR;
        self.modified_duration_sec += element.readiness.max(READINESS_FLOOR) * SECONDS_PER_HOUR;
        self.elements.push(element);
        self
    }

    pub fn start_period(&self) -> u8 {
        self.start.period
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Usable hours after weighting each slot by readiness.
    pub fn modified_duration_hours(&self) -> f64 {
        self.modified_duration_sec / SECONDS_PER_HOUR
    }
}

/// Identity of a user-day: where it begins and in which week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DayPeriodInfo {
    pub week: u32,
    pub day: u8,
    pub begin_period: u8,
}

/// A circular "user day" bounded by sleep, with its free periods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayInfo {
    pub begin: Slot,
    pub end: Slot,
    pub week: u32,
    pub groups: Vec<FreePeriodGroup>,
}

impl DayInfo {
    pub fn day_period(&self) -> DayPeriodInfo {
        DayPeriodInfo {
            week: self.week,
            day: self.begin.day,
            begin_period: self.begin.period,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(period: u8, readiness: f64) -> FreePeriodGroupElement {
        FreePeriodGroupElement {
            period,
            wave: 0.0,
            readiness,
        }
    }

    #[test]
    fn group_sums_use_readiness_with_floor() {
        let group = FreePeriodGroup::new(Slot { day: 1, period: 8 })
            .with_element(element(8, 0.5))
            .with_element(element(9, 0.0))
            .with_element(element(10, 1.0));

        assert_eq!(group.len(), 3);
        assert_eq!(group.total_duration_sec, 3.0 * 3600.0);
        assert!((group.modified_duration_hours() - 1.7).abs() < 1e-9);
        assert_eq!(group.start_period(), 8);
    }

    #[test]
    fn day_period_identifies_the_window_start() {
        let day = DayInfo {
            begin: Slot { day: 4, period: 7 },
            end: Slot { day: 5, period: 6 },
            week: 12,
            groups: vec![],
        };
        assert_eq!(
            day.day_period(),
            DayPeriodInfo {
                week: 12,
                day: 4,
                begin_period: 7
            }
        );
    }
}
