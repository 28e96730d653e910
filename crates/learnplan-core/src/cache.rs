//! Per user-day memoization of proposals.
//!
//! The key carries the day window and week, so a new user-day simply misses.
//! Two requests missing the same key at once both compute and save; the
//! later save wins.

use std::collections::HashMap;

use crate::activity::ActivityRef;
use crate::storage::{CacheKey, PlannerStore};
use crate::timeline::{Proposal, ProposedItem, ProposedObject};

pub struct ProposalCache<'a, S: PlannerStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: PlannerStore + ?Sized> ProposalCache<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Stored proposal for `key`, or the result of `compute` after saving it.
    ///
    /// Store failures never surface: a failed read counts as a miss and a
    /// failed write only loses the memo.
    pub fn get_or_compute(
        &self,
        key: &CacheKey,
        activity_index: &HashMap<i64, ActivityRef>,
        compute: impl FnOnce() -> Proposal,
    ) -> Vec<ProposedObject> {
        let cached = self.store.cache_entries(key).unwrap_or_else(|e| {
            tracing::warn!(error = %e, ?key, "proposal cache read failed");
            Vec::new()
        });

        if !cached.is_empty() {
            tracing::info!(?key, entries = cached.len(), "proposal cache hit");
            return resolve(cached, activity_index);
        }

        tracing::info!(?key, "proposal cache miss");
        let computed: Vec<ProposedObject> = compute().into_values().collect();
        if let Err(e) = self.store.save_cache_entries(key, &computed) {
            tracing::warn!(error = %e, ?key, "proposal cache write failed");
        }
        computed
    }
}

/// Refresh activity references and drop the ones no longer in the course.
fn resolve(
    cached: Vec<ProposedObject>,
    activity_index: &HashMap<i64, ActivityRef>,
) -> Vec<ProposedObject> {
    cached
        .into_iter()
        .filter_map(|mut object| {
            if let ProposedItem::Activity(proposed) = &mut object.item {
                let current = activity_index.get(&proposed.activity.id)?;
                proposed.activity = current.clone();
            }
            Some(object)
        })
        .collect()
}
