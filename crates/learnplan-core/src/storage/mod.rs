pub mod config;
pub mod database;

pub use config::Config;
pub use database::Database;

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::activity::ActivityConfig;
use crate::error::{ConfigError, Result};
use crate::schedule::WeeklySchedule;
use crate::timeline::{DayInfo, ProposedObject};

/// Returns `~/.config/learnplan[-dev]/` based on LEARNPLAN_ENV.
///
/// Set LEARNPLAN_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("LEARNPLAN_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("learnplan-dev")
    } else {
        base_dir.join("learnplan")
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}

/// Lookup key of one cached user-day proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    pub user_id: i64,
    pub instance_id: i64,
    pub day_begin_day: u8,
    pub day_begin_period: u8,
    pub week: u32,
}

impl CacheKey {
    pub fn for_day(user_id: i64, instance_id: i64, day: &DayInfo) -> Self {
        Self {
            user_id,
            instance_id,
            day_begin_day: day.begin.day,
            day_begin_period: day.begin.period,
            week: day.week,
        }
    }
}

/// Persistence the planner depends on.
///
/// Every save replaces the owner's previous rows wholesale.
pub trait PlannerStore {
    /// The learner's schedule for an activity instance, if one was submitted.
    fn load_schedule(&self, user_id: i64, instance_id: i64) -> Result<Option<WeeklySchedule>>;

    fn save_schedule(&self, user_id: i64, instance_id: i64, schedule: &WeeklySchedule)
        -> Result<()>;

    /// Author configuration keyed by activity id.
    fn activity_config(&self, instance_id: i64) -> Result<HashMap<i64, ActivityConfig>>;

    fn save_activity_config(
        &self,
        instance_id: i64,
        config: &HashMap<i64, ActivityConfig>,
    ) -> Result<()>;

    /// Cached proposal in stored order. Empty when nothing is cached.
    fn cache_entries(&self, key: &CacheKey) -> Result<Vec<ProposedObject>>;

    fn save_cache_entries(&self, key: &CacheKey, entries: &[ProposedObject]) -> Result<()>;
}
