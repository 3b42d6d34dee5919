//! UserState - the versioned cumulative ledger.
//!
//! Counters are never mutated in place: `apply` constructs the successor
//! record with a bumped version, and stores reject a write whose version does
//! not follow the stored one. That keeps concurrent duplicate submissions
//! from double-applying a delta.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Timetable;

/// Signed effect of one decision on the three cumulative counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateDelta {
    pub finance_change: i64,
    pub sleep_change_minutes: i64,
    pub study_change_minutes: i64,
}

impl StateDelta {
    pub const ZERO: StateDelta = StateDelta {
        finance_change: 0,
        sleep_change_minutes: 0,
        study_change_minutes: 0,
    };

    /// The delta that exactly undoes this one.
    pub fn inverse(&self) -> StateDelta {
        StateDelta {
            finance_change: -self.finance_change,
            sleep_change_minutes: -self.sleep_change_minutes,
            study_change_minutes: -self.study_change_minutes,
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == StateDelta::ZERO
    }
}

/// One user's cumulative week state.
///
/// Created on first settings submission, advanced by every committed decision
/// transaction, and replaced wholesale by an explicit reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserState {
    pub user_id: String,
    /// Budget the week started with (currency units).
    pub initial_budget: i64,
    /// Running budget; decisions move it in either direction.
    pub current_budget: i64,
    /// When the cumulative counters started accruing.
    pub week_start: DateTime<Utc>,
    /// Cumulative sleep minutes; penalties may drive it negative.
    pub total_sleep_minutes: i64,
    /// Cumulative study minutes; penalties may drive it negative.
    pub total_study_minutes: i64,
    pub timetable: Timetable,
    /// Monotonic record version, used for optimistic writes.
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserState {
    /// Fresh state for a first settings submission.
    pub fn new(
        user_id: impl Into<String>,
        initial_budget: i64,
        timetable: Timetable,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            initial_budget,
            current_budget: initial_budget,
            week_start: now,
            total_sleep_minutes: 0,
            total_study_minutes: 0,
            timetable,
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }

    /// Pure reducer: successor state with the delta applied and the version
    /// bumped. The receiver is left untouched.
    pub fn apply(&self, delta: &StateDelta, now: DateTime<Utc>) -> UserState {
        let mut next = self.clone();
        next.current_budget += delta.finance_change;
        next.total_sleep_minutes += delta.sleep_change_minutes;
        next.total_study_minutes += delta.study_change_minutes;
        next.version += 1;
        next.updated_at = now;
        next
    }

    /// Zero the counters and restart the week, keeping the timetable.
    pub fn reset(&self, now: DateTime<Utc>) -> UserState {
        let mut next = self.clone();
        next.current_budget = next.initial_budget;
        next.total_sleep_minutes = 0;
        next.total_study_minutes = 0;
        next.week_start = now;
        next.version += 1;
        next.updated_at = now;
        next
    }
}
