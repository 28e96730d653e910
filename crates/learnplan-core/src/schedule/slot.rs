//! Circular weekly time grid.
//!
//! A [`Slot`] is one hour of the week. Days run Monday=1..Sunday=7 and
//! periods 0..23; both wrap, so stepping past Sunday 23:00 lands on
//! Monday 00:00.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// First day index (Monday).
pub const DAY_INDEX_MIN: u8 = 1;
/// Last day index (Sunday).
pub const DAY_INDEX_MAX: u8 = 7;
/// First hourly period of a day.
pub const PERIOD_INDEX_MIN: u8 = 0;
/// Last hourly period of a day.
pub const PERIOD_INDEX_MAX: u8 = 23;
/// Hourly periods per day.
pub const PERIODS_PER_DAY: usize = 24;
/// Slots in one week (7 * 24).
pub const SLOTS_PER_WEEK: usize = 7 * PERIODS_PER_DAY;

/// A (day, period) pair on the circular weekly calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Slot {
    pub day: u8,
    pub period: u8,
}

impl Slot {
    /// Create a slot, rejecting indices outside the weekly grid.
    pub fn new(day: u8, period: u8) -> Result<Self, ValidationError> {
        check_day(day)?;
        check_period(period)?;
        Ok(Self { day, period })
    }

    /// The following hour, wrapping period then day.
    pub fn next(self) -> Self {
        if self.period < PERIOD_INDEX_MAX {
            Self {
                day: self.day,
                period: self.period + 1,
            }
        } else if self.day < DAY_INDEX_MAX {
            Self {
                day: self.day + 1,
                period: PERIOD_INDEX_MIN,
            }
        } else {
            Self {
                day: DAY_INDEX_MIN,
                period: PERIOD_INDEX_MIN,
            }
        }
    }

    /// The preceding hour, wrapping period then day.
    pub fn prev(self) -> Self {
        if self.period > PERIOD_INDEX_MIN {
            Self {
                day: self.day,
                period: self.period - 1,
            }
        } else if self.day > DAY_INDEX_MIN {
            Self {
                day: self.day - 1,
                period: PERIOD_INDEX_MAX,
            }
        } else {
            Self {
                day: DAY_INDEX_MAX,
                period: PERIOD_INDEX_MAX,
            }
        }
    }

    /// Every slot of the week in calendar order.
    pub fn all() -> impl Iterator<Item = Slot> {
        (DAY_INDEX_MIN..=DAY_INDEX_MAX).flat_map(|day| {
            (PERIOD_INDEX_MIN..=PERIOD_INDEX_MAX).map(move |period| Slot { day, period })
        })
    }
}

/// Validate a day index.
pub fn check_day(day: u8) -> Result<(), ValidationError> {
    if (DAY_INDEX_MIN..=DAY_INDEX_MAX).contains(&day) {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            field: "day",
            value: day as i64,
            min: DAY_INDEX_MIN as i64,
            max: DAY_INDEX_MAX as i64,
        })
    }
}

/// Validate a period index.
pub fn check_period(period: u8) -> Result<(), ValidationError> {
    if period <= PERIOD_INDEX_MAX {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            field: "period",
            value: period as i64,
            min: PERIOD_INDEX_MIN as i64,
            max: PERIOD_INDEX_MAX as i64,
        })
    }
}

/// Learner availability for one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotStatus {
    Sleep,
    Busy,
    Free,
}

impl SlotStatus {
    /// Decode the stored/submitted integer code.
    pub fn from_code(code: i64) -> Result<Self, ValidationError> {
        match code {
            -1 => Ok(Self::Sleep),
            0 => Ok(Self::Busy),
            1 => Ok(Self::Free),
            other => Err(ValidationError::InvalidStatus(other)),
        }
    }

    pub fn code(self) -> i64 {
        match self {
            Self::Sleep => -1,
            Self::Busy => 0,
            Self::Free => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_wraps_day_and_week() {
        assert_eq!(Slot { day: 1, period: 5 }.next(), Slot { day: 1, period: 6 });
        assert_eq!(Slot { day: 3, period: 23 }.next(), Slot { day: 4, period: 0 });
        assert_eq!(Slot { day: 7, period: 23 }.next(), Slot { day: 1, period: 0 });
    }

    #[test]
    fn prev_wraps_day_and_week() {
        assert_eq!(Slot { day: 2, period: 0 }.prev(), Slot { day: 1, period: 23 });
        assert_eq!(Slot { day: 1, period: 0 }.prev(), Slot { day: 7, period: 23 });
    }

    #[test]
    fn full_cycle_returns_to_start() {
        let start = Slot { day: 5, period: 17 };
        let mut slot = start;
        for _ in 0..SLOTS_PER_WEEK {
            slot = slot.next();
        }
        assert_eq!(slot, start);
    }

    #[test]
    fn all_covers_the_week_in_order() {
        let slots: Vec<_> = Slot::all().collect();
        assert_eq!(slots.len(), SLOTS_PER_WEEK);
        assert_eq!(slots[0], Slot { day: 1, period: 0 });
        assert_eq!(slots[SLOTS_PER_WEEK - 1], Slot { day: 7, period: 23 });
    }

    #[test]
    fn new_rejects_out_of_grid_indices() {
        assert!(Slot::new(0, 3).is_err());
        assert!(Slot::new(8, 3).is_err());
        assert!(Slot::new(2, 24).is_err());
        assert!(Slot::new(7, 23).is_ok());
    }

    #[test]
    fn status_codes() {
        assert_eq!(SlotStatus::from_code(-1).unwrap(), SlotStatus::Sleep);
        assert_eq!(SlotStatus::from_code(0).unwrap(), SlotStatus::Busy);
        assert_eq!(SlotStatus::from_code(1).unwrap(), SlotStatus::Free);
        assert_eq!(
            SlotStatus::from_code(2),
            Err(ValidationError::InvalidStatus(2))
        );
        assert_eq!(SlotStatus::Sleep.code(), -1);
    }
}
