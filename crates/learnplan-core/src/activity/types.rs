//! Activity descriptors supplied by the host platform.

use serde::{Deserialize, Serialize};

/// Module names that deliver content.
const LECTURE_MODULES: &[&str] = &[
    "page", "resource", "url", "book", "folder", "lesson", "imscp", "label", "survey", "feedback",
    "choice",
];

/// Module names that exercise and grade the learner.
const PRACTICE_MODULES: &[&str] = &["quiz", "assign", "workshop", "h5pactivity"];

/// A course activity as the host references it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRef {
    pub id: i64,
    pub modname: String,
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
}

/// Host module type, resolved once at the provider boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleType {
    Quiz,
    Survey,
    Assignment,
    Feedback,
    Choice,
    Generic,
}

impl ModuleType {
    pub fn from_modname(modname: &str) -> Self {
        match modname {
            "quiz" => Self::Quiz,
            "survey" => Self::Survey,
            "assign" => Self::Assignment,
            "feedback" => Self::Feedback,
            "choice" => Self::Choice,
            _ => Self::Generic,
        }
    }

    /// Whether the module reports attempts and a pass/fail outcome.
    pub fn reports_practice(self) -> bool {
        matches!(self, Self::Quiz | Self::Assignment)
    }
}

/// Whether a learning object is content or practice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    Lecture,
    Practice,
}

/// Classify a module name. Unknown modules yield `None` and are not planned.
pub fn classify(modname: &str) -> Option<ObjectKind> {
    if PRACTICE_MODULES.contains(&modname) {
        Some(ObjectKind::Practice)
    } else if LECTURE_MODULES.contains(&modname) {
        Some(ObjectKind::Lecture)
    } else {
        None
    }
}

/// Grading state of a practice activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PracticeOutcome {
    Passed,
    Failed,
    NotRated,
}

/// Learner interaction with one activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InteractionInfo {
    Simple {
        actions: u32,
    },
    Practice {
        attempts: u32,
        outcome: PracticeOutcome,
    },
}

impl Default for InteractionInfo {
    fn default() -> Self {
        Self::Simple { actions: 0 }
    }
}

impl InteractionInfo {
    /// Count fed into the duration model.
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Simple { actions } => *actions,
            Self::Practice { attempts, .. } => *attempts,
        }
    }

    pub fn is_passed(&self) -> bool {
        matches!(
            self,
            Self::Practice {
                outcome: PracticeOutcome::Passed,
                ..
            }
        )
    }
}

/// Per-activity planning configuration set by the course author.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityConfig {
    pub duration_sec: u32,
    pub category: String,
    pub weight: i32,
    #[serde(default)]
    pub is_ignored: bool,
}

/// Everything the category builder needs about one uncompleted activity.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityInfo {
    pub activity: ActivityRef,
    pub config: Option<ActivityConfig>,
    pub interaction: InteractionInfo,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_table() {
        assert_eq!(classify("page"), Some(ObjectKind::Lecture));
        assert_eq!(classify("quiz"), Some(ObjectKind::Practice));
        assert_eq!(classify("assign"), Some(ObjectKind::Practice));
        assert_eq!(classify("forum"), None);
    }

    #[test]
    fn module_type_resolution() {
        assert_eq!(ModuleType::from_modname("assign"), ModuleType::Assignment);
        assert_eq!(ModuleType::from_modname("page"), ModuleType::Generic);
        assert!(ModuleType::Quiz.reports_practice());
        assert!(!ModuleType::Choice.reports_practice());
    }

    #[test]
    fn interaction_serialization_is_tagged() {
        let info = InteractionInfo::Practice {
            attempts: 2,
            outcome: PracticeOutcome::NotRated,
        };
        let json = serde_json::to_string(&info).unwrap();
        assert!(json.contains("\"kind\":\"practice\""));
        let decoded: InteractionInfo = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, info);
        assert_eq!(decoded.attempts(), 2);
        assert!(!decoded.is_passed());
    }
}
