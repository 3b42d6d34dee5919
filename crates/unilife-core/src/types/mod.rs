//! Domain type definitions
//!
//! UserState is the mutable ledger, Choice/Branch are the per-slot records
//! of the actual and counterfactual universes.

mod record;
mod schedule;
mod state;

pub use record::{Branch, Choice};
pub use schedule::{ClassSession, Timetable, WeekSchedule, PERIODS_PER_DAY, WEEKDAYS};
pub use state::{StateDelta, UserState};

use serde::{Deserialize, Serialize};

/// The three tracked life categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Study,
    Sleep,
    Finance,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Study => "study",
            Category::Sleep => "sleep",
            Category::Finance => "finance",
        }
    }

    /// Parse a category label; anything unrecognized is `None`.
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim() {
            "study" | "grade" => Some(Category::Study),
            "sleep" => Some(Category::Sleep),
            "finance" => Some(Category::Finance),
            _ => None,
        }
    }
}

/// Kind of decision slot a Choice belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotType {
    Class,
    Meal,
    Study,
    FreeTime,
    Sleep,
    Exercise,
    Hobby,
    AiBranch,
    Rest,
}

impl SlotType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SlotType::Class => "class",
            SlotType::Meal => "meal",
            SlotType::Study => "study",
            SlotType::FreeTime => "free_time",
            SlotType::Sleep => "sleep",
            SlotType::Exercise => "exercise",
            SlotType::Hobby => "hobby",
            SlotType::AiBranch => "ai_branch",
            SlotType::Rest => "rest",
        }
    }
}

/// One generated free-time activity option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeTimeOption {
    pub label: String,
    pub category: Category,
}

/// Exactly two mutually-exclusive free-time options plus a framing message.
///
/// This is the validated shape of the generative collaborator's response;
/// anything that does not decode to it is discarded upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeTimePair {
    pub message: String,
    pub options: [FreeTimeOption; 2],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parse_accepts_legacy_grade_label() {
        assert_eq!(Category::parse("grade"), Some(Category::Study));
        assert_eq!(Category::parse("finance"), Some(Category::Finance));
        assert_eq!(Category::parse("unknown"), None);
    }

    #[test]
    fn test_slot_type_serde_uses_snake_case() {
        let json = serde_json::to_string(&SlotType::FreeTime).unwrap();
        assert_eq!(json, "\"free_time\"");
        let back: SlotType = serde_json::from_str("\"ai_branch\"").unwrap();
        assert_eq!(back, SlotType::AiBranch);
    }
}
