//! Day allocator.
//!
//! Fills each free period group of a user-day with learning objects:
//! - Whole categories first, longest first, while they fit
//! - Then single lectures of the remaining categories, shortest category first
//! - Leftover time is turned into periodic relax breaks
//!
//! Objects are laid out back to back from the group's first hour.

use std::collections::HashSet;

use crate::category::{Category, LearningObject};
use crate::storage::config::RelaxConfig;
use crate::timeline::{
    DayInfo, FreePeriodGroup, Proposal, ProposedActivity, ProposedItem, ProposedObject,
    ProposedRelax,
};

/// Fills user-days with categories, activities and relax breaks.
#[derive(Debug, Clone)]
pub struct Allocator {
    relax: RelaxConfig,
}

/// Bookkeeping shared by all groups of one day.
#[derive(Default)]
struct DayState {
    assigned: HashSet<i64>,
    consumed: HashSet<String>,
    next_relax_key: i64,
}

impl DayState {
    fn relax_key(&mut self) -> i64 {
        self.next_relax_key -= 1;
        self.next_relax_key
    }
}

impl Allocator {
    pub fn new(relax: RelaxConfig) -> Self {
        Self { relax }
    }

    /// Allocate `categories` (ordered longest first) into `day`.
    pub fn allocate(&self, day: &DayInfo, categories: &[Category]) -> Proposal {
        let mut state = DayState::default();
        let mut proposal = Proposal::new();

        for group in &day.groups {
            let (objects, free_hours_left) = self.select(group, categories, &mut state);
            self.lay_out(day, group, &objects, free_hours_left, &mut state, &mut proposal);
        }

        tracing::debug!(
            objects = proposal.len(),
            relax = proposal.values().filter(|o| o.is_relax()).count(),
            "day allocated"
        );
        proposal
    }

    /// Pick the objects for one group. Returns them with the unused hours.
    fn select<'c>(
        &self,
        group: &FreePeriodGroup,
        categories: &'c [Category],
        state: &mut DayState,
    ) -> (Vec<&'c LearningObject>, f64) {
        let mut free_hours = group.modified_duration_hours();
        let mut objects: Vec<&LearningObject> = Vec::new();

        for category in categories {
            if state.consumed.contains(&category.id) {
                continue;
            }
            let pending: Vec<&LearningObject> = category
                .objects()
                .filter(|o| !state.assigned.contains(&o.activity.id))
                .collect();
            let hours: f64 = pending.iter().map(|o| o.modified_duration_hours()).sum();
            if hours > free_hours {
                continue;
            }
            free_hours -= hours;
            for object in pending {
                state.assigned.insert(object.activity.id);
                objects.push(object);
            }
            state.consumed.insert(category.id.clone());
        }

        let mut remaining: Vec<&Category> = categories
            .iter()
            .filter(|c| !state.consumed.contains(&c.id))
            .collect();
        remaining.sort_by(|a, b| a.modified_duration_sec.total_cmp(&b.modified_duration_sec));

        for category in remaining {
            for lecture in &category.lectures {
                if state.assigned.contains(&lecture.activity.id) {
                    continue;
                }
                let hours = lecture.modified_duration_hours();
                if hours <= free_hours {
                    free_hours -= hours;
                    state.assigned.insert(lecture.activity.id);
                    objects.push(lecture);
                }
            }
        }

        (objects, free_hours)
    }

    /// Number of relax breaks the leftover time pays for.
    pub fn relax_item_count(&self, free_hours_left: f64) -> u32 {
        let per_item = self.relax.minimum_minutes.max(1) as f64;
        let raw = (free_hours_left.max(0.0) * 60.0 / per_item).floor() as u32;
        self.relax.clamp_count(raw)
    }

    fn lay_out(
        &self,
        day: &DayInfo,
        group: &FreePeriodGroup,
        objects: &[&LearningObject],
        free_hours_left: f64,
        state: &mut DayState,
        proposal: &mut Proposal,
    ) {
        let day_period = day.day_period();
        let relax_count = self.relax_item_count(free_hours_left) as usize;
        let periodicity = if relax_count >= 1 {
            objects.len() / relax_count
        } else {
            0
        };
        let relax_sec = self.relax.duration_minutes as f64 * 60.0;

        let mut offset = 0.0;
        let mut breaks = 0;
        for (i, object) in objects.iter().enumerate() {
            if periodicity >= 1 && i > 0 && i % periodicity == 0 && breaks < relax_count {
                breaks += 1;
                let relax = ProposedObject::place(
                    state.relax_key(),
                    ProposedItem::Relax(ProposedRelax {
                        minutes: self.relax.duration_minutes,
                    }),
                    relax_sec,
                    group.start,
                    offset,
                    day_period,
                );
                offset += relax.duration_hours();
                proposal.insert(relax.key, relax);
            }

            let placed = ProposedObject::place(
                object.activity.id,
                ProposedItem::Activity(ProposedActivity {
                    activity: object.activity.clone(),
                    snapshot: object.interaction,
                }),
                object.modified_duration_sec,
                group.start,
                offset,
                day_period,
            );
            offset += placed.duration_hours();
            proposal.insert(placed.key, placed);
        }
    }
}
