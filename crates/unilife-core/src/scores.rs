//! Score Aggregator - cumulative counters to normalized 0-100 scores.
//!
//! All three scores clamp to [10, 100] no matter how extreme the counters
//! get (negative budget, zeroed sleep, penalty-driven negative study time).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Category, UserState};

const MAX_SCORE: i64 = 100;
const MIN_SCORE: i64 = 10;
const BASE_SCORE: f64 = 50.0;

/// Tunable score thresholds. Defaults match the reference policy:
/// 7h/day sleep is a full score, 5h/day study is a full score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreTargets {
    /// Daily sleep minutes for a score of 100.
    pub target_sleep_minutes: f64,
    /// Daily sleep minutes below which the low-band formula applies.
    pub sleep_floor_minutes: f64,
    /// Daily study hours for a score of 100.
    pub target_study_hours: f64,
}

impl Default for ScoreTargets {
    fn default() -> Self {
        Self {
            target_sleep_minutes: 420.0,
            sleep_floor_minutes: 300.0,
            target_study_hours: 5.0,
        }
    }
}

/// Normalized scores, each in [10, 100].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scores {
    pub study: u8,
    pub sleep: u8,
    pub finance: u8,
}

impl Scores {
    pub fn get(&self, category: Category) -> u8 {
        match category {
            Category::Study => self.study,
            Category::Sleep => self.sleep,
            Category::Finance => self.finance,
        }
    }
}

/// Whole days elapsed since the week started, rounded up, minimum 1.
pub fn days_passed(week_start: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let elapsed = (now - week_start).num_seconds();
    let days = (elapsed as f64 / 86_400.0).ceil() as i64;
    days.max(1)
}

fn clamp(score: f64) -> u8 {
    (score.round() as i64).clamp(MIN_SCORE, MAX_SCORE) as u8
}

/// Compute the three normalized scores for a user as of `now`.
pub fn compute_scores(state: &UserState, now: DateTime<Utc>, targets: &ScoreTargets) -> Scores {
    let days = days_passed(state.week_start, now) as f64;

    // Finance: proportion of the starting budget still available. A
    // non-positive starting budget has no meaningful ratio and floors out.
    let finance = if state.initial_budget <= 0 {
        MIN_SCORE as u8
    } else {
        clamp(state.current_budget as f64 / state.initial_budget as f64 * 100.0)
    };

    let avg_sleep = state.total_sleep_minutes as f64 / days;
    let sleep = if avg_sleep >= targets.target_sleep_minutes {
        MAX_SCORE as u8
    } else if avg_sleep >= targets.sleep_floor_minutes {
        let span = targets.target_sleep_minutes - targets.sleep_floor_minutes;
        clamp(BASE_SCORE + (avg_sleep - targets.sleep_floor_minutes) / span * 50.0)
    } else {
        clamp(30.0 + avg_sleep / targets.sleep_floor_minutes * 20.0)
    };

    let avg_study_hours = (state.total_study_minutes as f64 / 60.0) / days;
    let study = if avg_study_hours >= targets.target_study_hours {
        MAX_SCORE as u8
    } else {
        clamp(BASE_SCORE + avg_study_hours * (100.0 - BASE_SCORE) / targets.target_study_hours)
    };

    Scores {
        study,
        sleep,
        finance,
    }
}

/// The category with the lowest score. Ties resolve to Study; it is checked
/// first and only a strictly lower score displaces it.
pub fn weakest_category(scores: &Scores) -> Category {
    let mut weakest = Category::Study;
    let mut min = scores.study;
    for candidate in [Category::Sleep, Category::Finance] {
        let value = scores.get(candidate);
        if value < min {
            min = value;
            weakest = candidate;
        }
    }
    weakest
}
