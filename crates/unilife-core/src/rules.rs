//! Choice Resolution Engine - (slot, action) to signed counter deltas.
//!
//! `DeltaPolicy::resolve` is pure and total: any pair it does not recognize
//! produces zero time deltas instead of failing, so new action vocabularies
//! can land without breaking submission.

use serde::{Deserialize, Serialize};

use crate::types::{Category, SlotType, StateDelta};

/// How a penalized action converts its duration into lost minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Penalty {
    /// No minutes lost.
    None,
    /// The whole action duration is lost.
    FullDuration,
    /// A fixed number of minutes is lost regardless of duration.
    Fixed { minutes: i64 },
}

impl Penalty {
    fn minutes(&self, duration: i64) -> i64 {
        match self {
            Penalty::None => 0,
            Penalty::FullDuration => duration,
            Penalty::Fixed { minutes } => *minutes,
        }
    }
}

/// The swappable penalty table plus the delta rules around it.
///
/// Revisions of this engine have disagreed on whether `skip_play` and
/// `stay_up_play` penalize the counters at all; the defaults here are the
/// reference policy (full-duration penalties on both).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeltaPolicy {
    /// Study minutes lost for skipping class to play.
    pub skip_play_study: Penalty,
    /// Study minutes lost for staying up all night playing.
    pub stay_up_play_study: Penalty,
    /// Sleep minutes lost for staying up all night playing.
    pub stay_up_play_sleep: Penalty,
}

impl Default for DeltaPolicy {
    fn default() -> Self {
        Self {
            skip_play_study: Penalty::FullDuration,
            stay_up_play_study: Penalty::FullDuration,
            stay_up_play_sleep: Penalty::FullDuration,
        }
    }
}

impl DeltaPolicy {
    /// Map a submitted action to its signed effect on the counters.
    ///
    /// `cost` is a magnitude; the sign of the finance effect is decided
    /// here. An explicit `category` is authoritative for the time effect,
    /// and for whether the action can count as income; label keywords are
    /// only consulted when no category was supplied.
    pub fn resolve(
        &self,
        slot_type: SlotType,
        action: &str,
        cost: i64,
        duration_minutes: i64,
        category: Option<Category>,
    ) -> StateDelta {
        let finance_change = if is_earning(action, category) {
            cost.abs()
        } else {
            -cost.abs()
        };

        let mut sleep = 0;
        let mut study = 0;
        match slot_type {
            SlotType::Class => match action {
                "attend" | "attend_coffee" => study += duration_minutes,
                "skip_sleep" => sleep += duration_minutes,
                "skip_play" => study -= self.skip_play_study.minutes(duration_minutes),
                _ => {}
            },
            SlotType::Sleep => match action {
                "sleep" => sleep += duration_minutes,
                "stay_up" => {
                    study += duration_minutes;
                    sleep -= duration_minutes;
                }
                "stay_up_play" => {
                    study -= self.stay_up_play_study.minutes(duration_minutes);
                    sleep -= self.stay_up_play_sleep.minutes(duration_minutes);
                }
                _ => {}
            },
            SlotType::FreeTime | SlotType::AiBranch => match category {
                Some(Category::Study) => study += duration_minutes,
                Some(Category::Sleep) => sleep += duration_minutes,
                // Finance activities only move the budget, already handled.
                Some(Category::Finance) => {}
                None => match time_effect_from_label(action) {
                    Some(TimeEffect::Study) => study += duration_minutes,
                    Some(TimeEffect::Sleep) => sleep += duration_minutes,
                    Some(TimeEffect::HalfSleep) => sleep += duration_minutes / 2,
                    None => {}
                },
            },
            // Meals, hobbies, exercise and dead time are finance-only.
            SlotType::Meal
            | SlotType::Study
            | SlotType::Exercise
            | SlotType::Hobby
            | SlotType::Rest => {}
        }

        StateDelta {
            finance_change,
            sleep_change_minutes: sleep,
            study_change_minutes: study,
        }
    }
}

/// Whether the submitted action earns money rather than spending it.
///
/// An explicit category is authoritative: study/sleep-tagged actions never
/// earn, finance-tagged actions earn only when their label says so. The
/// lexical check is the last resort for untagged submissions.
fn is_earning(action: &str, category: Option<Category>) -> bool {
    match category {
        Some(Category::Finance) | None => label_in_earning_lexicon(action),
        Some(_) => false,
    }
}

/// Last-resort lexical income detection, deliberately the only place any
/// free-text sniffing happens.
fn label_in_earning_lexicon(label: &str) -> bool {
    const EARNING_KEYWORDS: [&str; 6] = ["part_time", "part-time", "work", "job", "earn", "shift"];
    let lower = label.to_lowercase();
    EARNING_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

enum TimeEffect {
    Study,
    Sleep,
    HalfSleep,
}

/// Keyword fallback for untagged free-time actions. `choice_A`/`choice_B`
/// are the historical generated-option identifiers, mapped the way the
/// legacy data did: A studies, B sleeps.
fn time_effect_from_label(action: &str) -> Option<TimeEffect> {
    match action {
        "study" | "choice_A" => Some(TimeEffect::Study),
        "sleep" | "choice_B" => Some(TimeEffect::Sleep),
        "rest" => Some(TimeEffect::HalfSleep),
        _ => None,
    }
}

/// Human-readable summary of an action for the permanent record.
pub fn describe_action(
    slot_type: SlotType,
    action: &str,
    subject: Option<&str>,
    cost: i64,
) -> String {
    let subject = subject.unwrap_or("class");
    let cost_text = if cost != 0 {
        format!(" ({})", format_signed(cost))
    } else {
        String::new()
    };
    let body = match (slot_type, action) {
        (SlotType::Class, "attend") => format!("Attend the {subject} lecture"),
        (SlotType::Class, "attend_coffee") => {
            format!("Grab a coffee and attend the {subject} lecture")
        }
        (SlotType::Class, "skip_sleep") => format!("Skip the {subject} lecture and sleep in"),
        (SlotType::Class, "skip_play") => format!("Skip the {subject} lecture and go out"),
        (SlotType::Meal, "restaurant") => "Eat out at a restaurant".to_string(),
        (SlotType::Meal, "cafeteria") => "Eat at the campus cafeteria".to_string(),
        (SlotType::Meal, "convenience") => "Grab something at the convenience store".to_string(),
        (SlotType::Meal, "skip") => "Skip the meal".to_string(),
        (SlotType::Meal, "custom") => "Have a meal".to_string(),
        (SlotType::Sleep, "sleep") => "Go to sleep".to_string(),
        (SlotType::Sleep, "stay_up") => "Stay up all night studying".to_string(),
        (SlotType::Sleep, "stay_up_play") => "Stay up all night playing".to_string(),
        (SlotType::FreeTime | SlotType::AiBranch, "study") => "Study".to_string(),
        (SlotType::FreeTime | SlotType::AiBranch, "exercise") => "Work out".to_string(),
        (SlotType::FreeTime | SlotType::AiBranch, "hobby") => "Spend time on a hobby".to_string(),
        (SlotType::FreeTime | SlotType::AiBranch, "rest") => "Take a break".to_string(),
        (SlotType::FreeTime | SlotType::AiBranch, "part_time") => "Work a part-time shift".to_string(),
        (SlotType::Rest, _) => "Rest for a while".to_string(),
        (_, other) => other.to_string(),
    };
    format!("{body}{cost_text}")
}

fn format_signed(amount: i64) -> String {
    if amount > 0 {
        format!("+{amount}")
    } else {
        format!("{amount}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_play_reference_scenario() {
        let policy = DeltaPolicy::default();
        let delta = policy.resolve(SlotType::Class, "skip_play", 5000, 75, None);
        assert_eq!(delta.finance_change, -5000);
        assert_eq!(delta.study_change_minutes, -75);
        assert_eq!(delta.sleep_change_minutes, 0);
    }

    #[test]
    fn test_class_and_sleep_rules() {
        let policy = DeltaPolicy::default();

        let attend = policy.resolve(SlotType::Class, "attend", 0, 75, None);
        assert_eq!(attend.study_change_minutes, 75);
        assert_eq!(attend.finance_change, 0);

        let skip_sleep = policy.resolve(SlotType::Class, "skip_sleep", 0, 75, None);
        assert_eq!(skip_sleep.sleep_change_minutes, 75);

        let stay_up = policy.resolve(SlotType::Sleep, "stay_up", 0, 60, None);
        assert_eq!(stay_up.study_change_minutes, 60);
        assert_eq!(stay_up.sleep_change_minutes, -60);

        let double = policy.resolve(SlotType::Sleep, "stay_up_play", 8000, 60, None);
        assert_eq!(double.study_change_minutes, -60);
        assert_eq!(double.sleep_change_minutes, -60);
        assert_eq!(double.finance_change, -8000);
    }

    #[test]
    fn test_penalties_are_swappable() {
        let lenient = DeltaPolicy {
            skip_play_study: Penalty::None,
            stay_up_play_study: Penalty::Fixed { minutes: 20 },
            stay_up_play_sleep: Penalty::FullDuration,
        };
        let skip = lenient.resolve(SlotType::Class, "skip_play", 5000, 75, None);
        assert_eq!(skip.study_change_minutes, 0);

        let play = lenient.resolve(SlotType::Sleep, "stay_up_play", 0, 90, None);
        assert_eq!(play.study_change_minutes, -20);
        assert_eq!(play.sleep_change_minutes, -90);
    }

    #[test]
    fn test_explicit_category_drives_time_effect() {
        let policy = DeltaPolicy::default();

        let study = policy.resolve(
            SlotType::AiBranch,
            "choice_B",
            0,
            120,
            Some(Category::Study),
        );
        assert_eq!(study.study_change_minutes, 120);
        assert_eq!(study.sleep_change_minutes, 0);

        let finance = policy.resolve(
            SlotType::AiBranch,
            "choice_A",
            3000,
            120,
            Some(Category::Finance),
        );
        assert_eq!(finance.study_change_minutes, 0);
        assert_eq!(finance.sleep_change_minutes, 0);
    }

    #[test]
    fn test_category_is_authoritative_over_earning_lexicon() {
        let policy = DeltaPolicy::default();

        // A study-tagged action cannot flip to income even with "job" in it.
        let tagged = policy.resolve(
            SlotType::FreeTime,
            "study for the job interview",
            4000,
            60,
            Some(Category::Study),
        );
        assert_eq!(tagged.finance_change, -4000);

        // Finance-tagged earning labels earn.
        let shift = policy.resolve(
            SlotType::FreeTime,
            "part_time",
            9000,
            120,
            Some(Category::Finance),
        );
        assert_eq!(shift.finance_change, 9000);

        // Untagged part_time also earns, via the lexicon fallback.
        let untagged = policy.resolve(SlotType::FreeTime, "part_time", -9000, 120, None);
        assert_eq!(untagged.finance_change, 9000);
        assert_eq!(untagged.study_change_minutes, 0);
    }

    #[test]
    fn test_unknown_pairs_yield_zero_time_deltas() {
        let policy = DeltaPolicy::default();
        let delta = policy.resolve(SlotType::Class, "teleport", 1000, 60, None);
        assert_eq!(delta.study_change_minutes, 0);
        assert_eq!(delta.sleep_change_minutes, 0);
        assert_eq!(delta.finance_change, -1000);

        let meal = policy.resolve(SlotType::Meal, "restaurant", 12_000, 60, None);
        assert_eq!(meal.finance_change, -12_000);
        assert!(meal.sleep_change_minutes == 0 && meal.study_change_minutes == 0);
    }

    #[test]
    fn test_rest_gets_half_duration_sleep_credit() {
        let policy = DeltaPolicy::default();
        let rest = policy.resolve(SlotType::FreeTime, "rest", 0, 60, None);
        assert_eq!(rest.sleep_change_minutes, 30);
    }

    #[test]
    fn test_describe_action_mentions_subject_and_cost() {
        let text = describe_action(SlotType::Class, "skip_play", Some("Calculus"), -5000);
        assert!(text.contains("Calculus"));
        assert!(text.contains("-5000"));

        let plain = describe_action(SlotType::Sleep, "sleep", None, 0);
        assert_eq!(plain, "Go to sleep");
    }
}
