//! Proposal engine entry points.
//!
//! [`Planner`] wires the pieces together for one request:
//! schedule → user-day window → categories → allocation → cache.
//!
//! Persistence failures on the proposal path degrade to "no
//! personalization" (empty schedule, no configuration, uncached result)
//! and are logged, never returned.

use std::collections::HashMap;

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

use crate::activity::{ActivityConfig, ActivityInfo, ActivityProvider};
use crate::cache::ProposalCache;
use crate::category::CategoryBuilder;
use crate::clock::{Clock, ClockReading, SystemClock};
use crate::duration::DurationModel;
use crate::error::Result;
use crate::schedule::{WeeklySchedule, DEFAULT_READINESS, DEFAULT_STATUS};
use crate::scheduler::Allocator;
use crate::storage::{CacheKey, Config, PlannerStore};
use crate::timeline::{DayInfo, FreeTimeExtractor, ProposedObject};

/// Who asks, for which course, and when.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalRequest {
    pub user_id: i64,
    pub course_id: i64,
    /// Activity instance owning the schedule, configuration and cache.
    pub instance_id: i64,
    pub age: u32,
    pub reading: ClockReading,
}

impl ProposalRequest {
    /// A request stamped with the clock's current reading.
    pub fn new(
        user_id: i64,
        course_id: i64,
        instance_id: i64,
        age: u32,
        clock: &dyn Clock,
    ) -> Self {
        Self {
            user_id,
            course_id,
            instance_id,
            age,
            reading: clock.now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgendaStatus {
    Upcoming,
    /// The learner's clock is past the item.
    Missed,
    /// The learner worked on the activity since it was proposed.
    Touched,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgendaItem {
    pub object: ProposedObject,
    pub status: AgendaStatus,
}

pub struct Planner<'a, S: PlannerStore + ?Sized, P: ActivityProvider + ?Sized> {
    config: &'a Config,
    store: &'a S,
    provider: &'a P,
}

impl<'a, S, P> Planner<'a, S, P>
where
    S: PlannerStore + ?Sized,
    P: ActivityProvider + ?Sized,
{
    pub fn new(config: &'a Config, store: &'a S, provider: &'a P) -> Self {
        Self {
            config,
            store,
            provider,
        }
    }

    /// Validate and store a learner's schedule, replacing any previous one.
    ///
    /// Slots and periods left unset are stored as busy with zero readiness.
    pub fn submit_schedule(
        &self,
        user_id: i64,
        instance_id: i64,
        mut schedule: WeeklySchedule,
    ) -> Result<()> {
        schedule.validate_submission()?;
        schedule.fill_unset_with(DEFAULT_STATUS, DEFAULT_READINESS)?;
        self.store.save_schedule(user_id, instance_id, &schedule)?;
        tracing::info!(user_id, instance_id, "schedule submitted");
        Ok(())
    }

    /// Stored schedule, or an empty one when missing or unreadable.
    pub fn schedule(&self, user_id: i64, instance_id: i64) -> WeeklySchedule {
        match self.store.load_schedule(user_id, instance_id) {
            Ok(Some(schedule)) => schedule,
            Ok(None) => {
                tracing::debug!(user_id, instance_id, "no schedule stored");
                WeeklySchedule::new()
            }
            Err(e) => {
                tracing::warn!(error = %e, user_id, instance_id, "schedule unavailable");
                WeeklySchedule::new()
            }
        }
    }

    /// Wall clock for the learner, with weeks counted from their schedule's creation.
    pub fn clock_for(&self, user_id: i64, instance_id: i64, offset: FixedOffset) -> SystemClock {
        SystemClock::new(offset, self.schedule(user_id, instance_id).created_at())
    }

    /// The user-day containing the request's clock reading.
    pub fn day(&self, request: &ProposalRequest) -> DayInfo {
        let schedule = self.schedule(request.user_id, request.instance_id);
        FreeTimeExtractor::new(&schedule).extract(request.reading.slot(), request.reading.week)
    }

    /// Proposal for the current user-day, served from the cache when present.
    pub fn proposals(&self, request: &ProposalRequest) -> Vec<ProposedObject> {
        let day = self.day(request);
        let key = CacheKey::for_day(request.user_id, request.instance_id, &day);
        let index = self.provider.activity_index(request.course_id);

        ProposalCache::new(self.store).get_or_compute(&key, &index, || {
            let categories = CategoryBuilder::new(
                self.config.rules.clone(),
                DurationModel::new(self.config.limits.clone()),
            )
            .build(self.activities(request), request.age);
            Allocator::new(self.config.relax.clone()).allocate(&day, &categories)
        })
    }

    /// Proposal with each item's status relative to the request's clock.
    pub fn agenda(&self, request: &ProposalRequest) -> Vec<AgendaItem> {
        let interactions = self
            .provider
            .interaction_info(request.user_id, request.course_id);
        let ClockReading { day, period, .. } = request.reading;

        self.proposals(request)
            .into_iter()
            .map(|object| {
                let touched = object.activity().is_some_and(|proposed| {
                    let current = interactions
                        .get(&proposed.activity.id)
                        .copied()
                        .unwrap_or_default();
                    proposed.is_touched(&current)
                });
                let status = if touched {
                    AgendaStatus::Touched
                } else if object.is_passed_in_day(day, period) {
                    AgendaStatus::Missed
                } else {
                    AgendaStatus::Upcoming
                };
                AgendaItem { object, status }
            })
            .collect()
    }

    fn activity_config(&self, instance_id: i64) -> HashMap<i64, ActivityConfig> {
        self.store.activity_config(instance_id).unwrap_or_else(|e| {
            tracing::warn!(error = %e, instance_id, "activity configuration unavailable");
            HashMap::new()
        })
    }

    fn activities(&self, request: &ProposalRequest) -> Vec<ActivityInfo> {
        let mut configs = self.activity_config(request.instance_id);
        let interactions = self
            .provider
            .interaction_info(request.user_id, request.course_id);

        self.provider
            .uncompleted_activities(request.course_id, request.user_id)
            .into_iter()
            .map(|activity| ActivityInfo {
                config: configs.remove(&activity.id),
                interaction: interactions.get(&activity.id).copied().unwrap_or_default(),
                activity,
            })
            .collect()
    }
}
