//! Duration model.
//!
//! Turns an activity's configured duration into the time a specific learner
//! should budget for it, based on prior attempts and age.

mod curve;

pub use curve::{
    adjust_duration, memory_retention, DurationModel, Retention, RetentionCurve,
    REFERENCE_AGES, REFERENCE_RETENTION,
};
