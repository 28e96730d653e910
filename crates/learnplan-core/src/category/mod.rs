//! Weighted activity categories.
//!
//! Uncompleted activities are grouped by their configured category, split
//! into lectures and practices, filtered by the skip rules and sized with
//! the duration model. Categories then compete as units for free time.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::activity::{classify, ActivityInfo, ActivityRef, InteractionInfo, ObjectKind};
use crate::duration::DurationModel;
use crate::storage::config::RulesConfig;

/// One activity sized for a specific learner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningObject {
    pub activity: ActivityRef,
    pub kind: ObjectKind,
    pub total_duration_sec: f64,
    pub modified_duration_sec: f64,
    pub interaction: InteractionInfo,
}

impl LearningObject {
    pub fn modified_duration_hours(&self) -> f64 {
        self.modified_duration_sec / 3600.0
    }
}

/// A group of activities sharing a category key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub lectures: Vec<LearningObject>,
    pub practices: Vec<LearningObject>,
    pub total_duration_sec: f64,
    pub modified_duration_sec: f64,
    pub is_passed: bool,
    pub attempts: u32,
}

impl Category {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            lectures: Vec::new(),
            practices: Vec::new(),
            total_duration_sec: 0.0,
            modified_duration_sec: 0.0,
            is_passed: false,
            attempts: 0,
        }
    }

    /// Returns the category extended by `object`, with sums updated.
    pub fn with_object(mut self, object: LearningObject) -> Self {
        self.total_duration_sec += object.total_duration_sec;
        self.modified_duration_sec += object.modified_duration_sec;
        match object.kind {
            ObjectKind::Lecture => self.lectures.push(object),
            ObjectKind::Practice => self.practices.push(object),
        }
        self
    }

    /// Lectures first, then practices, each in weight order.
    pub fn objects(&self) -> impl Iterator<Item = &LearningObject> {
        self.lectures.iter().chain(self.practices.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.lectures.is_empty() && self.practices.is_empty()
    }

    pub fn modified_duration_hours(&self) -> f64 {
        self.modified_duration_sec / 3600.0
    }
}

/// Why a whole category was left out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    AlreadyPassed,
    NoPractice,
    TooManyAttempts,
}

/// Category before sizing: classified members and practice aggregates.
#[derive(Debug, Clone)]
struct CategoryDraft {
    id: String,
    members: Vec<(ActivityInfo, ObjectKind)>,
    is_passed: bool,
    attempts: u32,
    practice_count: usize,
}

impl CategoryDraft {
    fn new(id: String) -> Self {
        Self {
            id,
            members: Vec::new(),
            is_passed: false,
            attempts: 0,
            practice_count: 0,
        }
    }

    fn push(&mut self, info: ActivityInfo, kind: ObjectKind) {
        if kind == ObjectKind::Practice {
            self.practice_count += 1;
            self.attempts += info.interaction.attempts();
            self.is_passed |= info.interaction.is_passed();
        }
        self.members.push((info, kind));
    }
}

/// Builds the ordered category list fed to the allocator.
#[derive(Debug, Clone)]
pub struct CategoryBuilder {
    rules: RulesConfig,
    model: DurationModel,
}

impl CategoryBuilder {
    pub fn new(rules: RulesConfig, model: DurationModel) -> Self {
        Self { rules, model }
    }

    /// Group, filter and size `activities` for a learner of `age`.
    ///
    /// The result is sorted by modified duration, longest first.
    pub fn build(&self, mut activities: Vec<ActivityInfo>, age: u32) -> Vec<Category> {
        activities.sort_by_key(|a| a.config.as_ref().map_or(i32::MAX, |c| c.weight));

        let mut drafts: IndexMap<String, CategoryDraft> = IndexMap::new();
        for info in activities {
            let Some(config) = info.config.as_ref() else {
                continue;
            };
            if config.is_ignored || self.rules.ignored_modules.contains(&info.activity.modname) {
                continue;
            }
            let Some(kind) = classify(&info.activity.modname) else {
                tracing::debug!(
                    activity = info.activity.id,
                    modname = %info.activity.modname,
                    "unknown module type, not planned"
                );
                continue;
            };
            let category = config.category.clone();
            drafts
                .entry(category.clone())
                .or_insert_with(|| CategoryDraft::new(category))
                .push(info, kind);
        }

        let mut categories: Vec<Category> = drafts
            .into_values()
            .filter(|draft| match self.skip_reason(draft) {
                Some(reason) => {
                    tracing::debug!(category = %draft.id, ?reason, "category skipped");
                    false
                }
                None => true,
            })
            .map(|draft| self.size(draft, age))
            .filter(|category| !category.is_empty())
            .collect();

        categories.sort_by(|a, b| b.modified_duration_sec.total_cmp(&a.modified_duration_sec));
        categories
    }

    fn skip_reason(&self, draft: &CategoryDraft) -> Option<SkipReason> {
        if self.rules.skip_passed_categories && draft.is_passed {
            Some(SkipReason::AlreadyPassed)
        } else if self.rules.skip_categories_without_practice && draft.practice_count == 0 {
            Some(SkipReason::NoPractice)
        } else if draft.attempts > self.rules.max_category_attempts {
            Some(SkipReason::TooManyAttempts)
        } else {
            None
        }
    }

    fn size(&self, draft: CategoryDraft, age: u32) -> Category {
        let base = Category {
            is_passed: draft.is_passed,
            attempts: draft.attempts,
            ..Category::new(draft.id)
        };

        draft
            .members
            .into_iter()
            .filter_map(|(info, kind)| {
                let config = info.config?;
                let total = config.duration_sec as f64;
                let modified = self.model.adjust(total, info.interaction.attempts(), age)?;
                Some(LearningObject {
                    activity: info.activity,
                    kind,
                    total_duration_sec: total,
                    modified_duration_sec: modified,
                    interaction: info.interaction,
                })
            })
            .fold(base, Category::with_object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::{ActivityConfig, PracticeOutcome};
    use crate::storage::config::LimitsConfig;

    fn info(id: i64, modname: &str, category: &str, weight: i32, duration: u32) -> ActivityInfo {
        ActivityInfo {
            activity: ActivityRef {
                id,
                modname: modname.to_string(),
                name: format!("activity {id}"),
                icon: None,
            },
            config: Some(ActivityConfig {
                duration_sec: duration,
                category: category.to_string(),
                weight,
                is_ignored: false,
            }),
            interaction: InteractionInfo::default(),
        }
    }

    fn builder(rules: RulesConfig) -> CategoryBuilder {
        CategoryBuilder::new(rules, DurationModel::new(LimitsConfig::default()))
    }

    #[test]
    fn groups_by_category_and_orders_by_weight() {
        let activities = vec![
            info(1, "page", "a", 3, 600),
            info(2, "page", "a", 1, 600),
            info(3, "quiz", "a", 2, 600),
            info(4, "url", "b", 1, 600),
        ];
        let categories = builder(RulesConfig::default()).build(activities, 15);

        assert_eq!(categories.len(), 2);
        let a = categories.iter().find(|c| c.id == "a").unwrap();
        let lecture_ids: Vec<_> = a.lectures.iter().map(|o| o.activity.id).collect();
        assert_eq!(lecture_ids, vec![2, 1]);
        assert_eq!(a.practices.len(), 1);
        assert_eq!(a.total_duration_sec, 1800.0);
    }

    #[test]
    fn sorted_by_modified_duration_descending() {
        let activities = vec![
            info(1, "page", "short", 1, 300),
            info(2, "page", "long", 1, 3000),
            info(3, "page", "mid", 1, 1200),
        ];
        let ids: Vec<_> = builder(RulesConfig::default())
            .build(activities, 15)
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec!["long", "mid", "short"]);
    }

    #[test]
    fn skips_unconfigured_ignored_and_unknown_activities() {
        let mut ignored = info(2, "page", "a", 1, 600);
        ignored.config.as_mut().unwrap().is_ignored = true;
        let mut unconfigured = info(3, "page", "a", 1, 600);
        unconfigured.config = None;
        let activities = vec![
            info(1, "page", "a", 1, 600),
            ignored,
            unconfigured,
            info(4, "forum", "a", 1, 600),
            info(5, "url", "a", 1, 600),
        ];
        let rules = RulesConfig {
            ignored_modules: vec!["url".to_string()],
            ..RulesConfig::default()
        };
        let categories = builder(rules).build(activities, 15);
        assert_eq!(categories.len(), 1);
        let ids: Vec<_> = categories[0].objects().map(|o| o.activity.id).collect();
        assert_eq!(ids, vec![1]);
    }

    #[test]
    fn passed_category_is_dropped_when_configured() {
        let mut quiz = info(2, "quiz", "a", 2, 600);
        quiz.interaction = InteractionInfo::Practice {
            attempts: 1,
            outcome: PracticeOutcome::Passed,
        };
        let activities = vec![info(1, "page", "a", 1, 600), quiz];

        assert!(builder(RulesConfig::default())
            .build(activities.clone(), 15)
            .is_empty());

        let keep = RulesConfig {
            skip_passed_categories: false,
            ..RulesConfig::default()
        };
        let categories = builder(keep).build(activities, 15);
        assert_eq!(categories.len(), 1);
        assert!(categories[0].is_passed);
        assert_eq!(categories[0].attempts, 1);
    }

    #[test]
    fn category_without_practice_is_dropped_when_configured() {
        let rules = RulesConfig {
            skip_categories_without_practice: true,
            ..RulesConfig::default()
        };
        let categories = builder(rules).build(
            vec![info(1, "page", "a", 1, 600), info(2, "quiz", "b", 1, 600)],
            15,
        );
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].id, "b");
    }

    #[test]
    fn attempts_over_ceiling_drop_category() {
        let mut quiz = info(1, "quiz", "a", 1, 600);
        quiz.interaction = InteractionInfo::Practice {
            attempts: 11,
            outcome: PracticeOutcome::Failed,
        };
        assert!(builder(RulesConfig::default()).build(vec![quiz], 15).is_empty());
    }

    #[test]
    fn exhausted_activities_are_excluded_individually() {
        let mut viewed = info(2, "page", "a", 2, 1);
        viewed.interaction = InteractionInfo::Simple { actions: 3 };
        let categories =
            builder(RulesConfig::default()).build(vec![info(1, "page", "a", 1, 600), viewed], 15);
        assert_eq!(categories[0].lectures.len(), 1);
        assert_eq!(categories[0].modified_duration_sec, 600.0);
    }

    #[test]
    fn with_object_accumulates_sums() {
        let object = |id, kind, secs| LearningObject {
            activity: ActivityRef {
                id,
                modname: "page".into(),
                name: String::new(),
                icon: None,
            },
            kind,
            total_duration_sec: secs,
            modified_duration_sec: secs * 2.0,
            interaction: InteractionInfo::default(),
        };
        let category = Category::new("x")
            .with_object(object(1, ObjectKind::Lecture, 100.0))
            .with_object(object(2, ObjectKind::Practice, 50.0));
        assert_eq!(category.total_duration_sec, 150.0);
        assert_eq!(category.modified_duration_sec, 300.0);
        assert_eq!(category.lectures.len(), 1);
        assert_eq!(category.practices.len(), 1);
    }
}
