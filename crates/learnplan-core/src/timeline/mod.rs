//! User-day timeline.
//!
//! This module provides:
//! - Day window detection bounded by the learner's sleep
//! - Free period grouping with readiness weighting
//! - The proposed agenda item types

mod day;
mod gap;
mod proposal;

pub use day::{DayInfo, DayPeriodInfo, FreePeriodGroup, FreePeriodGroupElement, READINESS_FLOOR};
pub use gap::FreeTimeExtractor;
pub use proposal::{
    is_proposed_element_skipped_by_time, Proposal, ProposedActivity, ProposedItem,
    ProposedObject, ProposedRelax,
};
