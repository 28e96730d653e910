//! Activity/completion provider seam and a JSON-backed catalogue.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::types::{ActivityRef, InteractionInfo, ModuleType, PracticeOutcome};
use crate::error::Result;

/// Read-only view of the host's course activities and learner progress.
pub trait ActivityProvider {
    /// Activities of `course_id` the learner has not completed yet.
    fn uncompleted_activities(&self, course_id: i64, user_id: i64) -> Vec<ActivityRef>;

    /// Interaction counts of the learner, keyed by activity id.
    fn interaction_info(&self, user_id: i64, course_id: i64) -> HashMap<i64, InteractionInfo>;

    /// Every activity currently in the course, keyed by id.
    fn activity_index(&self, course_id: i64) -> HashMap<i64, ActivityRef>;
}

/// Raw progress record as the host exports it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProgressRecord {
    #[serde(default)]
    pub actions: u32,
    #[serde(default)]
    pub attempts: u32,
    #[serde(default)]
    pub passed: bool,
    #[serde(default)]
    pub not_rated: bool,
}

impl ProgressRecord {
    /// Collapse to the uniform interaction union for the given module type.
    pub fn to_interaction(&self, module: ModuleType) -> InteractionInfo {
        if module.reports_practice() {
            let outcome = if self.not_rated {
                PracticeOutcome::NotRated
            } else if self.passed {
                PracticeOutcome::Passed
            } else {
                PracticeOutcome::Failed
            };
            InteractionInfo::Practice {
                attempts: self.attempts,
                outcome,
            }
        } else {
            InteractionInfo::Simple {
                actions: self.actions,
            }
        }
    }
}

/// One activity in a [`ActivityCatalog`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogActivity {
    #[serde(flatten)]
    pub activity: ActivityRef,
    /// Learners who completed the activity.
    #[serde(default)]
    pub completed_by: Vec<i64>,
    /// Progress per learner id.
    #[serde(default)]
    pub progress: HashMap<i64, ProgressRecord>,
}

/// In-memory course catalogue, loadable from JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActivityCatalog {
    pub course_id: i64,
    #[serde(default)]
    pub activities: Vec<CatalogActivity>,
}

impl ActivityCatalog {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    fn course(&self, course_id: i64) -> impl Iterator<Item = &CatalogActivity> {
        let matches = self.course_id == course_id;
        self.activities.iter().filter(move |_| matches)
    }
}

impl ActivityProvider for ActivityCatalog {
    fn uncompleted_activities(&self, course_id: i64, user_id: i64) -> Vec<ActivityRef> {
        self.course(course_id)
            .filter(|a| !a.completed_by.contains(&user_id))
            .map(|a| a.activity.clone())
            .collect()
    }

    fn interaction_info(&self, user_id: i64, course_id: i64) -> HashMap<i64, InteractionInfo> {
        self.course(course_id)
            .map(|a| {
                let module = ModuleType::from_modname(&a.activity.modname);
                let info = a
                    .progress
                    .get(&user_id)
                    .cloned()
                    .unwrap_or_default()
                    .to_interaction(module);
                (a.activity.id, info)
            })
            .collect()
    }

    fn activity_index(&self, course_id: i64) -> HashMap<i64, ActivityRef> {
        self.course(course_id)
            .map(|a| (a.activity.id, a.activity.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"{
        "course_id": 3,
        "activities": [
            {"id": 10, "modname": "page", "name": "Intro", "completed_by": [7]},
            {"id": 11, "modname": "quiz", "name": "Check",
             "progress": {"5": {"attempts": 2, "passed": true}}},
            {"id": 12, "modname": "url", "name": "Reading",
             "progress": {"5": {"actions": 4}}}
        ]
    }"#;

    #[test]
    fn uncompleted_filters_per_learner() {
        let catalog = ActivityCatalog::from_json(CATALOG).unwrap();
        let for_5: Vec<_> = catalog
            .uncompleted_activities(3, 5)
            .into_iter()
            .map(|a| a.id)
            .collect();
        assert_eq!(for_5, vec![10, 11, 12]);

        let for_7 = catalog.uncompleted_activities(3, 7);
        assert_eq!(for_7.len(), 2);
        assert!(catalog.uncompleted_activities(4, 5).is_empty());
    }

    #[test]
    fn interaction_uses_module_type() {
        let catalog = ActivityCatalog::from_json(CATALOG).unwrap();
        let info = catalog.interaction_info(5, 3);
        assert_eq!(
            info[&11],
            InteractionInfo::Practice {
                attempts: 2,
                outcome: PracticeOutcome::Passed
            }
        );
        assert_eq!(info[&12], InteractionInfo::Simple { actions: 4 });
        assert_eq!(info[&10], InteractionInfo::Simple { actions: 0 });
    }

    #[test]
    fn not_rated_wins_over_passed_flag() {
        let record = ProgressRecord {
            attempts: 1,
            passed: true,
            not_rated: true,
            ..Default::default()
        };
        assert_eq!(
            record.to_interaction(ModuleType::Quiz),
            InteractionInfo::Practice {
                attempts: 1,
                outcome: PracticeOutcome::NotRated
            }
        );
    }
}
