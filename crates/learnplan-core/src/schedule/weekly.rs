//! The learner's weekly availability grid and readiness curve.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use super::slot::{check_period, Slot, SlotStatus, PERIOD_INDEX_MAX, PERIOD_INDEX_MIN};
use crate::error::ValidationError;

/// Status used for any slot that was never set.
pub const DEFAULT_STATUS: SlotStatus = SlotStatus::Busy;
/// Readiness used for any period that was never set.
pub const DEFAULT_READINESS: f64 = 0.0;

/// Availability grid owned by one learner.
///
/// Status is per slot, readiness is per period of day and shared by all
/// seven days. Reads are always dense: unset entries read as
/// [`DEFAULT_STATUS`] / [`DEFAULT_READINESS`].
#[derive(Debug, Clone, PartialEq)]
pub struct WeeklySchedule {
    statuses: BTreeMap<Slot, SlotStatus>,
    readiness: BTreeMap<u8, f64>,
    created_at: DateTime<Utc>,
}

impl Default for WeeklySchedule {
    fn default() -> Self {
        Self::new()
    }
}

impl WeeklySchedule {
    /// An empty schedule created now.
    pub fn new() -> Self {
        Self::with_created_at(Utc::now())
    }

    /// An empty schedule with an explicit creation time (week index origin).
    pub fn with_created_at(created_at: DateTime<Utc>) -> Self {
        Self {
            statuses: BTreeMap::new(),
            readiness: BTreeMap::new(),
            created_at,
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Set a slot from a raw status code (-1 sleep, 0 busy, 1 free).
    pub fn set_status(&mut self, slot: Slot, code: i64) -> Result<(), ValidationError> {
        let status = SlotStatus::from_code(code)?;
        self.statuses.insert(slot, status);
        Ok(())
    }

    /// Set a slot from an already decoded status.
    pub fn set_slot_status(&mut self, slot: Slot, status: SlotStatus) {
        self.statuses.insert(slot, status);
    }

    /// Set readiness for a period of day.
    pub fn set_readiness(&mut self, period: u8, value: f64) -> Result<(), ValidationError> {
        check_period(period)?;
        check_readiness(period, value)?;
        self.readiness.insert(period, value);
        Ok(())
    }

    /// Backfill every slot and period that was never set. Existing entries
    /// are left untouched, so repeated calls are no-ops. An invalid
    /// readiness leaves the schedule as it was.
    pub fn fill_unset_with(
        &mut self,
        status: SlotStatus,
        readiness: f64,
    ) -> Result<(), ValidationError> {
        check_readiness(PERIOD_INDEX_MIN, readiness)?;
        for slot in Slot::all() {
            self.statuses.entry(slot).or_insert(status);
        }
        for period in PERIOD_INDEX_MIN..=PERIOD_INDEX_MAX {
            self.readiness.entry(period).or_insert(readiness);
        }
        Ok(())
    }

    pub fn status(&self, slot: Slot) -> SlotStatus {
        self.statuses.get(&slot).copied().unwrap_or(DEFAULT_STATUS)
    }

    pub fn readiness(&self, period: u8) -> f64 {
        self.readiness
            .get(&period)
            .copied()
            .unwrap_or(DEFAULT_READINESS)
    }

    /// Dense status grid over all 168 slots.
    pub fn statuses(&self) -> BTreeMap<Slot, SlotStatus> {
        Slot::all().map(|slot| (slot, self.status(slot))).collect()
    }

    /// Dense readiness map over all 24 periods.
    pub fn readinesses(&self) -> BTreeMap<u8, f64> {
        (PERIOD_INDEX_MIN..=PERIOD_INDEX_MAX)
            .map(|period| (period, self.readiness(period)))
            .collect()
    }

    /// Entries that were explicitly set, for persistence.
    pub fn explicit_statuses(&self) -> impl Iterator<Item = (Slot, SlotStatus)> + '_ {
        self.statuses.iter().map(|(slot, status)| (*slot, *status))
    }

    /// Readiness values that were explicitly set, for persistence.
    pub fn explicit_readiness(&self) -> impl Iterator<Item = (u8, f64)> + '_ {
        self.readiness.iter().map(|(period, value)| (*period, *value))
    }

    pub fn has_free_slot(&self) -> bool {
        self.statuses.values().any(|s| *s == SlotStatus::Free)
    }

    /// Checks a learner submission before it replaces the stored grid.
    pub fn validate_submission(&self) -> Result<(), ValidationError> {
        if !self.has_free_slot() {
            return Err(ValidationError::NoFreeSlot);
        }
        Ok(())
    }
}

fn check_readiness(period: u8, value: f64) -> Result<(), ValidationError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::InvalidReadiness { period, value })
    }
}
