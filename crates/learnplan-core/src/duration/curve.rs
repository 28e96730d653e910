//! Age-based memory retention curve and duration adjustment.
//!
//! Retention is a piecewise-linear curve over a few reference ages. The gap
//! between a learner's retention and the best retention on the curve is
//! added on top of an activity's base duration.

use serde::{Deserialize, Serialize};

use crate::storage::config::LimitsConfig;

/// Reference ages of the default curve.
pub const REFERENCE_AGES: [f64; 3] = [0.0, 15.0, 100.0];
/// Retention values at [`REFERENCE_AGES`]. The drop after 15 is intentional.
pub const REFERENCE_RETENTION: [f64; 3] = [1.0, 6.0, 2.8];

/// Retention at one age, with the best value reachable on the curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Retention {
    pub value: f64,
    pub max_possible: f64,
}

/// Piecewise-linear retention curve.
#[derive(Debug, Clone, PartialEq)]
pub struct RetentionCurve {
    ages: Vec<f64>,
    values: Vec<f64>,
}

impl Default for RetentionCurve {
    fn default() -> Self {
        Self::reference()
    }
}

impl RetentionCurve {
    /// The curve built from the published memory-duration reference points.
    pub fn reference() -> Self {
        Self {
            ages: REFERENCE_AGES.to_vec(),
            values: REFERENCE_RETENTION.to_vec(),
        }
    }

    /// Retention at `age`, clamped to the endpoint values outside the
    /// reference range.
    pub fn retention_at(&self, age: f64) -> Retention {
        let max_possible = self
            .values
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);
        Retention {
            value: self.interpolate(age),
            max_possible,
        }
    }

    fn interpolate(&self, x: f64) -> f64 {
        let n = self.ages.len();
        if x <= self.ages[0] {
            return self.values[0];
        }
        if x >= self.ages[n - 1] {
            return self.values[n - 1];
        }

        // Last bracket also covers everything from its left edge onward.
        let i = if x >= self.ages[n - 2] {
            n - 2
        } else {
            self.ages
                .windows(2)
                .position(|w| x >= w[0] && x < w[1])
                .unwrap_or(n - 2)
        };

        let (x0, x1) = (self.ages[i], self.ages[i + 1]);
        let (y0, y1) = (self.values[i], self.values[i + 1]);
        y0 + (y1 - y0) * (x - x0) / (x1 - x0)
    }
}

/// Retention on the reference curve.
pub fn memory_retention(age: f64) -> Retention {
    RetentionCurve::reference().retention_at(age)
}

/// Adjust a base duration for prior attempts and learner age.
///
/// Returns `None` when the attempt-reduced duration is exhausted, meaning
/// the activity should not be proposed at all.
pub fn adjust_duration(base_duration_sec: f64, attempts: u32, age: f64) -> Option<f64> {
    adjust_with_curve(&RetentionCurve::reference(), base_duration_sec, attempts, age)
}

fn adjust_with_curve(
    curve: &RetentionCurve,
    base_duration_sec: f64,
    attempts: u32,
    age: f64,
) -> Option<f64> {
    // Attempts are subtracted as attempts / base, not scaled to seconds.
    let new_duration = if attempts == 0 {
        base_duration_sec
    } else {
        base_duration_sec - attempts as f64 / base_duration_sec
    };
    if new_duration <= 0.0 || new_duration.is_nan() {
        return None;
    }

    let retention = curve.retention_at(age);
    Some(new_duration + new_duration * (retention.max_possible - retention.value))
}

/// Duration model bound to a curve and the configured age bounds.
#[derive(Debug, Clone)]
pub struct DurationModel {
    curve: RetentionCurve,
    limits: LimitsConfig,
}

impl DurationModel {
    pub fn new(limits: LimitsConfig) -> Self {
        Self {
            curve: RetentionCurve::reference(),
            limits,
        }
    }

    /// The learner age after clamping to the configured bounds.
    pub fn effective_age(&self, age: u32) -> u32 {
        self.limits.clamp_age(age)
    }

    /// [`adjust_duration`] with the age clamped first.
    pub fn adjust(&self, base_duration_sec: f64, attempts: u32, age: u32) -> Option<f64> {
        let age = self.effective_age(age) as f64;
        adjust_with_curve(&self.curve, base_duration_sec, attempts, age)
    }
}
