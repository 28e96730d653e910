//! Proposed agenda items.
//!
//! A proposal is an insertion-ordered map from a synthetic key to a
//! [`ProposedObject`]. Activities are keyed by their id, relax breaks by
//! negative indices so the two never collide.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::day::DayPeriodInfo;
use crate::activity::{ActivityRef, InteractionInfo};
use crate::schedule::{Slot, DAY_INDEX_MAX, DAY_INDEX_MIN, PERIODS_PER_DAY, SLOTS_PER_WEEK};

/// Ordered allocator output for one user-day.
pub type Proposal = IndexMap<i64, ProposedObject>;

/// An activity slotted into the agenda.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposedActivity {
    pub activity: ActivityRef,
    /// Interaction counts when the proposal was made.
    pub snapshot: InteractionInfo,
}

impl ProposedActivity {
    /// Whether the learner worked on the activity since it was proposed.
    pub fn is_touched(&self, current: &InteractionInfo) -> bool {
        *current != self.snapshot
    }
}

/// A fixed-length rest break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposedRelax {
    pub minutes: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProposedItem {
    Activity(ProposedActivity),
    Relax(ProposedRelax),
}

/// One entry of the agenda.
///
/// `period_idx_begin` is the fractional hour on `day` where the item
/// starts; `period_idx_end` may run past 24 when the item crosses
/// midnight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposedObject {
    pub key: i64,
    pub modified_duration_sec: u64,
    pub day: u8,
    pub period_idx_begin: f64,
    pub period_idx_end: f64,
    pub day_period: DayPeriodInfo,
    pub item: ProposedItem,
}

impl ProposedObject {
    /// Place an item `offset_hours` after `start`.
    pub fn place(
        key: i64,
        item: ProposedItem,
        duration_sec: f64,
        start: Slot,
        offset_hours: f64,
        day_period: DayPeriodInfo,
    ) -> Self {
        let modified_duration_sec = duration_sec.max(0.0).ceil() as u64;
        let absolute = start.period as f64 + offset_hours;
        let day_shift = (absolute / PERIODS_PER_DAY as f64).floor() as i64;
        let begin = absolute - day_shift as f64 * PERIODS_PER_DAY as f64;
        let day_span = (DAY_INDEX_MAX - DAY_INDEX_MIN + 1) as i64;
        let day = ((start.day - DAY_INDEX_MIN) as i64 + day_shift).rem_euclid(day_span) as u8
            + DAY_INDEX_MIN;

        Self {
            key,
            modified_duration_sec,
            day,
            period_idx_begin: begin,
            period_idx_end: begin + modified_duration_sec as f64 / 3600.0,
            day_period,
            item,
        }
    }

    pub fn duration_hours(&self) -> f64 {
        self.modified_duration_sec as f64 / 3600.0
    }

    pub fn is_relax(&self) -> bool {
        matches!(self.item, ProposedItem::Relax(_))
    }

    pub fn activity(&self) -> Option<&ProposedActivity> {
        match &self.item {
            ProposedItem::Activity(activity) => Some(activity),
            ProposedItem::Relax(_) => None,
        }
    }

    /// True once the learner's clock has moved past the item.
    pub fn is_skipped_by_time(&self, cur_day: u8, cur_period: u8) -> bool {
        cur_day > self.day
            || (cur_day == self.day
                && cur_period as f64 > self.period_idx_begin + self.duration_hours())
    }

    /// Like [`is_skipped_by_time`](Self::is_skipped_by_time), but hours are
    /// counted from the start of the item's user-day, so a day running from
    /// Sunday into Monday still orders its hours correctly.
    pub fn is_passed_in_day(&self, cur_day: u8, cur_period: u8) -> bool {
        let origin = Slot {
            day: self.day_period.day,
            period: self.day_period.begin_period,
        };
        let now = hours_since(origin, cur_day, cur_period as f64);
        let end = hours_since(origin, self.day, self.period_idx_begin) + self.duration_hours();
        now > end
    }
}

/// Hours from `origin` forward to (`day`, `period`) around the week.
fn hours_since(origin: Slot, day: u8, period: f64) -> f64 {
    let position = |day: u8, period: f64| {
        day.saturating_sub(DAY_INDEX_MIN) as f64 * PERIODS_PER_DAY as f64 + period
    };
    (position(day, period) - position(origin.day, origin.period as f64))
        .rem_euclid(SLOTS_PER_WEEK as f64)
}

/// Free-function form of [`ProposedObject::is_skipped_by_time`].
pub fn is_proposed_element_skipped_by_time(
    item: &ProposedObject,
    cur_day: u8,
    cur_period: u8,
) -> bool {
    item.is_skipped_by_time(cur_day, cur_period)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::PracticeOutcome;

    fn day_period() -> DayPeriodInfo {
        DayPeriodInfo {
            week: 0,
            day: 2,
            begin_period: 8,
        }
    }

    fn relax_at(start: Slot, offset: f64) -> ProposedObject {
        ProposedObject::place(
            -1,
            ProposedItem::Relax(ProposedRelax { minutes: 30 }),
            1800.0,
            start,
            offset,
            day_period(),
        )
    }

    #[test]
    fn place_rounds_duration_up() {
        let obj = ProposedObject::place(
            4,
            ProposedItem::Relax(ProposedRelax { minutes: 67 }),
            4006.2,
            Slot { day: 2, period: 8 },
            0.5,
            day_period(),
        );
        assert_eq!(obj.modified_duration_sec, 4007);
        assert_eq!(obj.day, 2);
        assert_eq!(obj.period_idx_begin, 8.5);
        assert!((obj.period_idx_end - (8.5 + 4007.0 / 3600.0)).abs() < 1e-12);
    }

    #[test]
    fn place_moves_to_next_day_after_midnight() {
        let obj = relax_at(Slot { day: 7, period: 22 }, 3.25);
        assert_eq!(obj.day, 1);
        assert!((obj.period_idx_begin - 1.25).abs() < 1e-12);
    }

    #[test]
    fn skipped_by_time() {
        let obj = relax_at(Slot { day: 2, period: 10 }, 0.0);
        // Ends at 10.5 on day 2.
        assert!(!obj.is_skipped_by_time(1, 23));
        assert!(!obj.is_skipped_by_time(2, 9));
        assert!(!obj.is_skipped_by_time(2, 10));
        assert!(obj.is_skipped_by_time(2, 11));
        assert!(obj.is_skipped_by_time(3, 0));
        assert!(is_proposed_element_skipped_by_time(&obj, 3, 0));
    }

    #[test]
    fn passed_in_day_follows_the_window_across_sunday() {
        let sunday_evening = DayPeriodInfo {
            week: 3,
            day: 7,
            begin_period: 18,
        };
        // Placed at Monday 01:00 - 01:30.
        let obj = ProposedObject::place(
            -1,
            ProposedItem::Relax(ProposedRelax { minutes: 30 }),
            1800.0,
            Slot { day: 7, period: 18 },
            7.0,
            sunday_evening,
        );
        assert_eq!(obj.day, 1);

        assert!(obj.is_skipped_by_time(7, 22));
        assert!(!obj.is_passed_in_day(7, 22));
        assert!(!obj.is_passed_in_day(1, 1));
        assert!(obj.is_passed_in_day(1, 2));
    }

    #[test]
    fn passed_in_day_matches_calendar_check_inside_one_day() {
        let obj = relax_at(Slot { day: 2, period: 10 }, 0.0);
        for period in 8..24 {
            assert_eq!(
                obj.is_passed_in_day(2, period),
                obj.is_skipped_by_time(2, period),
                "period {period}"
            );
        }
    }

    #[test]
    fn touched_compares_with_snapshot() {
        let proposed = ProposedActivity {
            activity: ActivityRef {
                id: 1,
                modname: "quiz".into(),
                name: "Quiz".into(),
                icon: None,
            },
            snapshot: InteractionInfo::Practice {
                attempts: 1,
                outcome: PracticeOutcome::Failed,
            },
        };
        assert!(!proposed.is_touched(&InteractionInfo::Practice {
            attempts: 1,
            outcome: PracticeOutcome::Failed
        }));
        assert!(proposed.is_touched(&InteractionInfo::Practice {
            attempts: 2,
            outcome: PracticeOutcome::Passed
        }));
    }

    #[test]
    fn serialized_form_is_tagged() {
        let obj = relax_at(Slot { day: 2, period: 8 }, 0.0);
        let json = serde_json::to_string(&obj).unwrap();
        assert!(json.contains("\"type\":\"relax\""));
        let decoded: ProposedObject = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, obj);
    }
}
