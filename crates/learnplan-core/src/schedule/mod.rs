//! Weekly availability: the circular slot grid and the learner's schedule.

mod slot;
mod weekly;

pub use slot::{
    check_day, check_period, Slot, SlotStatus, DAY_INDEX_MAX, DAY_INDEX_MIN, PERIODS_PER_DAY,
    PERIOD_INDEX_MAX, PERIOD_INDEX_MIN, SLOTS_PER_WEEK,
};
pub use weekly::{WeeklySchedule, DEFAULT_READINESS, DEFAULT_STATUS};
