use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use unilife_core::scores::Scores;
use unilife_core::types::{
    Branch, Category, Choice, SlotType, StateDelta, Timetable, WeekSchedule,
};

/// First-time (or replacement) settings submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsRequest {
    pub initial_budget: i64,
    pub timetable: Timetable,
    pub schedule: WeekSchedule,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsView {
    pub user_id: String,
    pub initial_budget: i64,
    pub current_budget: i64,
    pub week_start: DateTime<Utc>,
    pub timetable: Timetable,
    pub schedule: WeekSchedule,
}

/// One unchosen option of a two-way fork, submitted alongside the pick so
/// its counterfactual record can be written under the same slot key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParallelOption {
    pub action: String,
    pub label: String,
    pub category: Category,
    #[serde(default)]
    pub cost: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitChoiceRequest {
    pub day: u8,
    pub hour: u8,
    pub slot_type: SlotType,
    pub action: String,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub category: Option<Category>,
    /// Cost magnitude; sign is decided by the delta rules.
    #[serde(default)]
    pub cost: Option<i64>,
    /// Defaults to one hour.
    #[serde(default)]
    pub duration_minutes: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
    /// The unchosen fork options (two-way forks only).
    #[serde(default)]
    pub parallel_options: Vec<ParallelOption>,
}

/// One universe's view of a decided slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UniverseView {
    pub action: String,
    pub description: String,
    pub delta: StateDelta,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubmitOutcome {
    Saved {
        choice_id: String,
        actual: UniverseView,
        parallel: Vec<UniverseView>,
        scores: Scores,
    },
    AlreadyDecided {
        message: String,
        existing: Choice,
    },
}

/// Weekly statistics supplement to the three scores.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatisticsView {
    pub days_passed: i64,
    pub scores: Scores,
    pub average_sleep_hours: f64,
    pub attended_classes: usize,
    pub total_class_decisions: usize,
    /// 0.0 when no class decision was recorded yet.
    pub attendance_rate: f64,
    pub budget_spent: i64,
    pub daily_average_spend: i64,
    pub total_study_minutes: i64,
    pub total_sleep_minutes: i64,
}

/// Both universes' records, actual first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryView {
    pub choices: Vec<Choice>,
    pub branches: Vec<Branch>,
}
