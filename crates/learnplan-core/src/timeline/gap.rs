//! Free time extraction over the circular weekly calendar.
//!
//! "Today" is not the calendar day but the window from the learner's last
//! wake-up to the next one, so a day can run past midnight. Inside that
//! window, runs of free slots become [`FreePeriodGroup`]s.

use super::day::{DayInfo, FreePeriodGroup, FreePeriodGroupElement};
use crate::schedule::{
    Slot, SlotStatus, WeeklySchedule, PERIOD_INDEX_MAX, PERIOD_INDEX_MIN, SLOTS_PER_WEEK,
};

/// Upper bound on any walk around the week.
const WALK_LIMIT: usize = SLOTS_PER_WEEK;

/// Finds the current user-day and its free periods.
pub struct FreeTimeExtractor<'a> {
    schedule: &'a WeeklySchedule,
}

impl<'a> FreeTimeExtractor<'a> {
    pub fn new(schedule: &'a WeeklySchedule) -> Self {
        Self { schedule }
    }

    fn is_sleep(&self, slot: Slot) -> bool {
        self.schedule.status(slot) == SlotStatus::Sleep
    }

    /// First slot of the user-day containing `current`.
    ///
    /// Awake: the slot right after the preceding sleep run. Asleep: the
    /// first slot of the current sleep run. Without any sleep/awake
    /// transition the calendar day start is used.
    pub fn day_begin(&self, current: Slot) -> Slot {
        let sleeping = self.is_sleep(current);
        let mut slot = current;
        for _ in 0..WALK_LIMIT {
            let prev = slot.prev();
            if self.is_sleep(prev) != sleeping {
                return slot;
            }
            slot = prev;
        }
        Slot {
            day: current.day,
            period: PERIOD_INDEX_MIN,
        }
    }

    /// Last slot of the user-day that starts at `begin`: the slot before
    /// the next wake-up. Falls back to the calendar day end of `current`.
    pub fn day_end(&self, begin: Slot, current: Slot) -> Slot {
        let mut slot = begin;
        let mut passed_sleep = self.is_sleep(begin);
        for _ in 0..WALK_LIMIT {
            let next = slot.next();
            if self.is_sleep(next) {
                passed_sleep = true;
            } else if passed_sleep {
                return slot;
            }
            slot = next;
        }
        Slot {
            day: current.day,
            period: PERIOD_INDEX_MAX,
        }
    }

    /// Build the user-day for `current` in week `week`.
    ///
    /// The day belongs to the week its first slot falls in, so a window
    /// that began on Sunday keeps Sunday's week after midnight.
    pub fn extract(&self, current: Slot, week: u32) -> DayInfo {
        let begin = self.day_begin(current);
        let end = self.day_end(begin, current);
        let week = if begin > current {
            week.saturating_sub(1)
        } else {
            week
        };
        let groups = self.free_groups(begin, end);

        tracing::debug!(
            ?current,
            ?begin,
            ?end,
            groups = groups.len(),
            "user-day extracted"
        );

        DayInfo {
            begin,
            end,
            week,
            groups,
        }
    }

    fn free_groups(&self, begin: Slot, end: Slot) -> Vec<FreePeriodGroup> {
        let mut groups = Vec::new();
        let mut open: Option<FreePeriodGroup> = None;
        let mut free_hours_today = 0u32;

        let mut slot = begin;
        for _ in 0..WALK_LIMIT {
            if self.schedule.status(slot) == SlotStatus::Free {
                let element = FreePeriodGroupElement {
                    period: slot.period,
                    wave: (free_hours_today as f64).sin() / 2.0,
                    readiness: self.schedule.readiness(slot.period),
                };
                free_hours_today += 1;
                let group = open.take().unwrap_or_else(|| FreePeriodGroup::new(slot));
                open = Some(group.with_element(element));
            } else if let Some(group) = open.take() {
                groups.push(group);
            }

            if slot == end {
                break;
            }
            slot = slot.next();
        }

        if let Some(group) = open {
            groups.push(group);
        }
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schedule(sleep: std::ops::RangeInclusive<u8>, rest: SlotStatus) -> WeeklySchedule {
        let mut schedule = WeeklySchedule::new();
        for slot in Slot::all() {
            if sleep.contains(&slot.period) {
                schedule.set_slot_status(slot, SlotStatus::Sleep);
            }
        }
        schedule.fill_unset_with(rest, 0.5).unwrap();
        schedule
    }

    #[test]
    fn window_runs_from_wake_up_to_next_wake_up() {
        let schedule = schedule(2..=11, SlotStatus::Free);
        let day = FreeTimeExtractor::new(&schedule).extract(Slot { day: 1, period: 14 }, 0);

        assert_eq!(day.begin, Slot { day: 1, period: 12 });
        assert_eq!(day.end, Slot { day: 2, period: 11 });
        // 12..23 on day 1 and 0..1 on day 2 form one run across midnight.
        assert_eq!(day.groups.len(), 1);
        assert_eq!(day.groups[0].start, Slot { day: 1, period: 12 });
        assert_eq!(day.groups[0].len(), 14);
    }

    #[test]
    fn window_before_midnight_sleep() {
        let schedule = schedule(0..=7, SlotStatus::Free);
        let day = FreeTimeExtractor::new(&schedule).extract(Slot { day: 3, period: 9 }, 2);

        assert_eq!(day.begin, Slot { day: 3, period: 8 });
        assert_eq!(day.end, Slot { day: 4, period: 7 });
        assert_eq!(day.week, 2);
        assert_eq!(day.groups.len(), 1);
        assert_eq!(day.groups[0].len(), 16);
    }

    #[test]
    fn query_on_sunday_wraps_to_monday() {
        let schedule = schedule(0..=5, SlotStatus::Free);
        let day = FreeTimeExtractor::new(&schedule).extract(Slot { day: 7, period: 20 }, 0);
        assert_eq!(day.begin, Slot { day: 7, period: 6 });
        assert_eq!(day.end, Slot { day: 1, period: 5 });
    }

    #[test]
    fn window_started_on_sunday_keeps_its_week_after_midnight() {
        let schedule = schedule(6..=9, SlotStatus::Free);
        let extractor = FreeTimeExtractor::new(&schedule);

        let evening = extractor.extract(Slot { day: 7, period: 22 }, 4);
        let after_midnight = extractor.extract(Slot { day: 1, period: 2 }, 5);

        assert_eq!(evening.begin, Slot { day: 7, period: 10 });
        assert_eq!(after_midnight.begin, evening.begin);
        assert_eq!(after_midnight.week, 4);
        assert_eq!(after_midnight.day_period(), evening.day_period());
    }

    #[test]
    fn asleep_window_is_the_sleep_run() {
        let schedule = schedule(0..=7, SlotStatus::Free);
        let day = FreeTimeExtractor::new(&schedule).extract(Slot { day: 2, period: 3 }, 0);
        assert_eq!(day.begin, Slot { day: 2, period: 0 });
        assert_eq!(day.end, Slot { day: 2, period: 7 });
        assert!(day.groups.is_empty());
    }

    #[test]
    fn no_sleep_falls_back_to_calendar_day() {
        let mut schedule = WeeklySchedule::new();
        schedule.fill_unset_with(SlotStatus::Free, 1.0).unwrap();
        let day = FreeTimeExtractor::new(&schedule).extract(Slot { day: 5, period: 13 }, 0);

        assert_eq!(day.begin, Slot { day: 5, period: 0 });
        assert_eq!(day.end, Slot { day: 5, period: 23 });
        assert_eq!(day.groups.len(), 1);
        assert_eq!(day.groups[0].len(), 24);
    }

    #[test]
    fn busy_slots_split_groups_and_wave_keeps_counting() {
        let mut schedule = schedule(0..=7, SlotStatus::Free);
        for period in [10, 11, 15] {
            schedule.set_slot_status(Slot { day: 1, period }, SlotStatus::Busy);
        }
        let day = FreeTimeExtractor::new(&schedule).extract(Slot { day: 1, period: 8 }, 0);

        let sizes: Vec<_> = day.groups.iter().map(FreePeriodGroup::len).collect();
        assert_eq!(sizes, vec![2, 3, 8]);
        assert_eq!(day.groups[1].start.period, 12);

        // Third free hour of the day is the first element of group two.
        let wave = day.groups[1].elements[0].wave;
        assert!((wave - 2f64.sin() / 2.0).abs() < 1e-12);
        assert_eq!(day.groups[1].elements[0].readiness, 0.5);
    }
}
