//! Slot Resolver - which decision is due "now".
//!
//! Evaluated in strict priority order, first match wins:
//! upcoming/current class, meal window, sleep window, free time, rest.
//! The resolver performs no reads or writes of its own; the caller fetches
//! state, schedule and existing-choice lookups and passes them in, which
//! keeps this module pure and the question endpoint idempotent.

use chrono::{DateTime, Datelike, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::timetable::{period_for_clock_time, NextClass, PERIOD_WINDOWS};
use crate::types::{Category, Choice, FreeTimePair, SlotType, UserState, WeekSchedule, WEEKDAYS};

/// One selectable answer to a pending question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOption {
    /// Action identifier submitted back on selection.
    pub value: String,
    pub label: String,
    #[serde(default)]
    pub category: Option<Category>,
    /// Whether submitting this option requires a cost figure.
    pub requires_cost: bool,
    #[serde(default)]
    pub cost_prompt: Option<String>,
    /// Whether the option expects a free-text description.
    #[serde(default)]
    pub needs_description: bool,
}

impl QuestionOption {
    fn simple(value: &str, label: &str) -> Self {
        Self {
            value: value.to_string(),
            label: label.to_string(),
            category: None,
            requires_cost: false,
            cost_prompt: None,
            needs_description: false,
        }
    }

    fn with_cost(value: &str, label: &str, prompt: &str) -> Self {
        Self {
            value: value.to_string(),
            label: label.to_string(),
            category: None,
            requires_cost: true,
            cost_prompt: Some(prompt.to_string()),
            needs_description: false,
        }
    }
}

/// A decision waiting for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingQuestion {
    /// Weekday index 0-4; `None` outside the tracked week (weekends).
    pub day: Option<u8>,
    pub hour: u8,
    pub slot_type: SlotType,
    pub question: String,
    #[serde(default)]
    pub subject: Option<String>,
    pub options: Vec<QuestionOption>,
    /// Set on second-stage class questions whose answer is final.
    #[serde(default)]
    pub final_stage: bool,
}

/// Resolver output: either a pending question or an idempotent notice that
/// the slot was already decided (carrying the existing record, no mutation).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SlotQuestion {
    Pending(PendingQuestion),
    AlreadyDecided { message: String, existing: Choice },
}

/// Everything the resolver needs, pre-fetched by the caller.
#[derive(Debug)]
pub struct ResolverInputs<'a> {
    pub now: DateTime<Utc>,
    pub state: &'a UserState,
    pub schedule: &'a WeekSchedule,
    /// Output of [`crate::timetable::next_class`] for `now`.
    pub next_class: Option<NextClass>,
    /// Existing Choice at the next class's slot, if any.
    pub existing_for_next_class: Option<Choice>,
    /// Existing Choice at (today, current hour), if any.
    pub existing_for_current_hour: Option<Choice>,
    /// Validated generated free-time options; `None` falls back to the
    /// fixed activity set.
    pub free_time_options: Option<FreeTimePair>,
}

/// Resolve the single decision slot due at `inputs.now`.
pub fn resolve_slot(inputs: ResolverInputs<'_>) -> SlotQuestion {
    // 1. Upcoming class beats everything else.
    if let Some(next) = &inputs.next_class {
        if let Some(existing) = inputs.existing_for_next_class {
            return SlotQuestion::AlreadyDecided {
                message: format!(
                    "The upcoming {} class (day {}, {:02}:{:02}) is already decided.",
                    next.subject, next.day, next.hour, next.minute
                ),
                existing,
            };
        }
        return SlotQuestion::Pending(PendingQuestion {
            day: Some(next.day),
            hour: next.hour,
            slot_type: SlotType::Class,
            question: format!(
                "{} starts soon ({:02}:{:02}). What will you do?",
                next.subject, next.hour, next.minute
            ),
            subject: Some(next.subject.clone()),
            options: vec![
                QuestionOption::simple("attend_base", "Go to class"),
                QuestionOption::simple("skip_base", "Skip class"),
            ],
            final_stage: false,
        });
    }

    let weekday = inputs.now.weekday().num_days_from_monday() as usize;
    let hour = inputs.now.hour() as u8;

    // Weekends have no slot key, so there is nothing to decide.
    if weekday >= WEEKDAYS {
        return rest_question(None, hour);
    }
    let day = weekday as u8;

    if let Some(existing) = inputs.existing_for_current_hour {
        return SlotQuestion::AlreadyDecided {
            message: "This hour is already decided.".to_string(),
            existing,
        };
    }

    // 2. A class in progress right now.
    let now_minutes = (inputs.now.hour() * 60 + inputs.now.minute()) as u16;
    if let Some(period) = period_for_clock_time(now_minutes) {
        if inputs.state.timetable.has_class(weekday, period) {
            let start = PERIOD_WINDOWS[period - 1].0;
            let subject = inputs
                .schedule
                .session_at(weekday, start)
                .map(|s| s.subject.clone())
                .unwrap_or_else(|| "class".to_string());
            return SlotQuestion::Pending(PendingQuestion {
                day: Some(day),
                hour,
                slot_type: SlotType::Class,
                question: format!("Period {period} {subject} is in session."),
                subject: Some(subject),
                options: vec![
                    QuestionOption::simple("attend", "Attend the lecture"),
                    QuestionOption::with_cost(
                        "attend_coffee",
                        "Grab a coffee and attend",
                        "How much was the coffee?",
                    ),
                    QuestionOption::simple("skip_sleep", "Skip and sleep"),
                    QuestionOption::with_cost(
                        "skip_play",
                        "Skip and go out",
                        "How much did you spend?",
                    ),
                ],
                final_stage: false,
            });
        }
    }

    // 3. Meal window.
    if hour == 12 || hour == 18 {
        let meal = if hour == 12 { "Lunch" } else { "Dinner" };
        let mut custom = QuestionOption::with_cost(
            "custom",
            "Something else",
            "What did you eat and how much was it?",
        );
        custom.needs_description = true;
        return SlotQuestion::Pending(PendingQuestion {
            day: Some(day),
            hour,
            slot_type: SlotType::Meal,
            question: format!("{meal} time. How will you eat?"),
            subject: None,
            options: vec![
                QuestionOption::with_cost("restaurant", "Eat out", "How much was the meal?"),
                QuestionOption::with_cost(
                    "cafeteria",
                    "Campus cafeteria",
                    "How much was the cafeteria meal?",
                ),
                QuestionOption::with_cost(
                    "convenience",
                    "Convenience store",
                    "How much did you spend?",
                ),
                QuestionOption::simple("skip", "Skip the meal"),
                custom,
            ],
            final_stage: false,
        });
    }

    // 4. Sleep window.
    if hour >= 23 || hour < 8 {
        return SlotQuestion::Pending(PendingQuestion {
            day: Some(day),
            hour,
            slot_type: SlotType::Sleep,
            question: "It's bedtime.".to_string(),
            subject: None,
            options: vec![
                QuestionOption::simple("sleep", "Go to sleep"),
                QuestionOption::simple("stay_up", "Stay up studying"),
                QuestionOption::with_cost(
                    "stay_up_play",
                    "Stay up playing",
                    "How much did you spend?",
                ),
            ],
            final_stage: false,
        });
    }

    // 5. Free time: generated pair when available, fixed set otherwise.
    if let Some(pair) = inputs.free_time_options {
        let options = pair
            .options
            .iter()
            .enumerate()
            .map(|(idx, opt)| {
                let mut question_opt = QuestionOption::simple(
                    if idx == 0 { "choice_A" } else { "choice_B" },
                    &opt.label,
                );
                question_opt.category = Some(opt.category);
                if opt.category == Category::Finance {
                    question_opt.requires_cost = true;
                    question_opt.cost_prompt =
                        Some("How much did you earn or spend?".to_string());
                }
                question_opt
            })
            .collect();
        return SlotQuestion::Pending(PendingQuestion {
            day: Some(day),
            hour,
            slot_type: SlotType::AiBranch,
            question: pair.message,
            subject: None,
            options,
            final_stage: false,
        });
    }

    SlotQuestion::Pending(PendingQuestion {
        day: Some(day),
        hour,
        slot_type: SlotType::FreeTime,
        question: "Free time. What will you do?".to_string(),
        subject: None,
        options: vec![
            QuestionOption::simple("study", "Study"),
            QuestionOption::simple("exercise", "Work out"),
            QuestionOption::with_cost("hobby", "Hobby", "How much did you spend?"),
            QuestionOption::simple("rest", "Rest"),
            QuestionOption::with_cost("part_time", "Part-time shift", "How much did you earn?"),
        ],
        final_stage: false,
    })
}

fn rest_question(day: Option<u8>, hour: u8) -> SlotQuestion {
    SlotQuestion::Pending(PendingQuestion {
        day,
        hour,
        slot_type: SlotType::Rest,
        question: "Nothing is scheduled right now. Take a break.".to_string(),
        subject: None,
        options: vec![QuestionOption::simple("rest_passive", "Rest for a while")],
        final_stage: false,
    })
}

/// Second stage of the upcoming-class question: the broad attend/skip answer
/// narrows down to a concrete action. Unknown base choices yield `None`.
pub fn two_stage_class_question(
    day: u8,
    hour: u8,
    subject: &str,
    base_choice: &str,
) -> Option<PendingQuestion> {
    match base_choice {
        "attend_base" => Some(PendingQuestion {
            day: Some(day),
            hour,
            slot_type: SlotType::Class,
            question: "You're going to class. Coffee on the way?".to_string(),
            subject: Some(subject.to_string()),
            options: vec![
                QuestionOption::simple("attend", "Attend without coffee"),
                QuestionOption::with_cost(
                    "attend_coffee",
                    "Buy a coffee and attend",
                    "How much was the coffee?",
                ),
            ],
            final_stage: true,
        }),
        "skip_base" => Some(PendingQuestion {
            day: Some(day),
            hour,
            slot_type: SlotType::Class,
            question: "You're skipping class. What instead?".to_string(),
            subject: Some(subject.to_string()),
            options: vec![
                QuestionOption::simple("skip_sleep", "Sleep"),
                QuestionOption::with_cost(
                    "skip_play",
                    "Go out (free time)",
                    "How much did you spend?",
                ),
            ],
            final_stage: true,
        }),
        _ => None,
    }
}
