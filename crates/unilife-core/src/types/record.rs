//! Choice and Branch - the per-slot records of both universes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Category, SlotType, StateDelta};

/// The actual-universe record: what the user really did for one
/// (user, weekday, hour) slot. At most one exists per slot; once created it
/// is the permanent record of that hour, mutable only through an explicit
/// correction that also rolls back and reapplies its effect on UserState.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub id: String,
    pub user_id: String,
    /// Weekday index 0-4 (Monday-Friday).
    pub day: u8,
    /// Hour of day 0-23.
    pub hour: u8,
    pub slot_type: SlotType,
    /// Action identifier, e.g. "attend", "skip_play", "choice_A".
    pub action: String,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub category: Option<Category>,
    /// Raw cost magnitude as submitted; the signed effect lives in `delta`.
    pub cost: i64,
    pub duration_minutes: i64,
    /// Signed effect this choice had on the cumulative counters.
    pub delta: StateDelta,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl Choice {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_id: impl Into<String>,
        day: u8,
        hour: u8,
        slot_type: SlotType,
        action: impl Into<String>,
        cost: i64,
        duration_minutes: i64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            day,
            hour,
            slot_type,
            action: action.into(),
            subject: None,
            category: None,
            cost,
            duration_minutes,
            delta: StateDelta::ZERO,
            description: String::new(),
            created_at: now,
        }
    }
}

/// A counterfactual record: the alternate action for a slot and its own
/// independent deltas. Branches never feed back into UserState; they are
/// read-only narrative artifacts, deleted and recreated whenever the parent
/// Choice is edited or removed. The free-time case stores two per slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    pub id: String,
    pub user_id: String,
    pub day: u8,
    pub hour: u8,
    pub slot_type: SlotType,
    pub opposite_action: String,
    pub opposite_cost: i64,
    pub opposite_description: String,
    /// What the counters would have done in the alternate universe.
    pub opposite_delta: StateDelta,
    pub created_at: DateTime<Utc>,
}

impl Branch {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_id: impl Into<String>,
        day: u8,
        hour: u8,
        slot_type: SlotType,
        opposite_action: impl Into<String>,
        opposite_cost: i64,
        opposite_description: impl Into<String>,
        opposite_delta: StateDelta,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            day,
            hour,
            slot_type,
            opposite_action: opposite_action.into(),
            opposite_cost,
            opposite_description: opposite_description.into(),
            opposite_delta,
            created_at: now,
        }
    }
}
