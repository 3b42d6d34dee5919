//! Deterministic opposite table.
//!
//! Every (slot type, action) pair has a canonical counterfactual. Costs are
//! fixed by the table, not copied from the actual choice: skipping a meal
//! is opposed by a cafeteria meal at a standard price, spending actions are
//! opposed by their free counterpart.

use unilife_core::rules::describe_action;
use unilife_core::types::SlotType;

/// Standard cafeteria price charged to the "you could have eaten" branch.
pub const CAFETERIA_FALLBACK_COST: i64 = 6_000;

/// A synthesized counterfactual action before its deltas are computed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opposite {
    pub action: String,
    pub cost: i64,
    pub description: String,
}

/// The canonical opposite of an action within its slot.
pub fn deterministic_opposite(
    slot_type: SlotType,
    action: &str,
    subject: Option<&str>,
) -> Opposite {
    let (opposite_action, cost) = match slot_type {
        SlotType::Class => match action {
            "attend" | "attend_coffee" | "attend_base" => ("skip_sleep", 0),
            _ => ("attend", 0),
        },
        SlotType::Sleep => match action {
            "sleep" => ("stay_up", 0),
            _ => ("sleep", 0),
        },
        SlotType::Meal => match action {
            "skip" => ("cafeteria", CAFETERIA_FALLBACK_COST),
            _ => ("skip", 0),
        },
        SlotType::FreeTime | SlotType::AiBranch => match action {
            "study" => ("rest", 0),
            "rest" | "hobby" | "exercise" => ("study", 0),
            "part_time" => ("rest", 0),
            _ => ("rest", 0),
        },
        SlotType::Study | SlotType::Exercise | SlotType::Hobby => ("rest", 0),
        SlotType::Rest => ("study", 0),
    };

    Opposite {
        action: opposite_action.to_string(),
        cost,
        description: describe_action(slot_type, opposite_action, subject, -cost),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_and_sleep_opposites_pair_up() {
        let skip = deterministic_opposite(SlotType::Class, "attend", Some("Calculus"));
        assert_eq!(skip.action, "skip_sleep");
        assert!(skip.description.contains("Calculus"));

        let attend = deterministic_opposite(SlotType::Class, "skip_play", Some("Calculus"));
        assert_eq!(attend.action, "attend");

        assert_eq!(
            deterministic_opposite(SlotType::Sleep, "sleep", None).action,
            "stay_up"
        );
        assert_eq!(
            deterministic_opposite(SlotType::Sleep, "stay_up_play", None).action,
            "sleep"
        );
    }

    #[test]
    fn test_skipped_meal_is_opposed_by_priced_cafeteria() {
        let eaten = deterministic_opposite(SlotType::Meal, "skip", None);
        assert_eq!(eaten.action, "cafeteria");
        assert_eq!(eaten.cost, CAFETERIA_FALLBACK_COST);

        let skipped = deterministic_opposite(SlotType::Meal, "restaurant", None);
        assert_eq!(skipped.action, "skip");
        assert_eq!(skipped.cost, 0);
    }

    #[test]
    fn test_unknown_actions_still_get_an_opposite() {
        let fallback = deterministic_opposite(SlotType::FreeTime, "whatever", None);
        assert_eq!(fallback.action, "rest");
    }
}
