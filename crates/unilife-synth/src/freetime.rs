//! Free-time option generation: prompt building and strict validation.
//!
//! The collaborator contract is exact: the response must decode to
//! `{message, choices: [{label, category}, {label, category}]}` with two
//! choices and recognizable categories. Anything else is rejected and the
//! caller falls back to the fixed activity set.

use serde::Deserialize;
use thiserror::Error;

use unilife_core::scores::Scores;
use unilife_core::types::{Category, FreeTimeOption, FreeTimePair};

use crate::llm::extract_json;

/// Why a collaborator completion was rejected.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("no JSON object in output")]
    NoJson,
    #[error("payload did not decode: {0}")]
    Decode(String),
    #[error("expected exactly 2 choices, got {0}")]
    ChoiceCount(usize),
    #[error("choice {0} is missing a label")]
    MissingLabel(usize),
    #[error("choice {0} has an unrecognized category {1:?}")]
    BadCategory(usize, Option<String>),
}

#[derive(Debug, Deserialize)]
struct RawPair {
    #[serde(default)]
    message: String,
    #[serde(default)]
    choices: Vec<RawChoice>,
}

#[derive(Debug, Deserialize)]
struct RawChoice {
    #[serde(default)]
    label: String,
    #[serde(default)]
    category: Option<String>,
}

/// Build the (system, user) prompt pair for free-time option generation,
/// biased toward recovering the weakest category.
pub fn build_free_time_prompt(scores: &Scores, weakest: Category) -> (String, String) {
    let system = "You design decision forks for a university student's day. \
Return ONLY one valid JSON object, no markdown and no commentary."
        .to_string();

    let mut user = String::new();
    user.push_str("Current state:\n");
    user.push_str(&format!("- study score: {}\n", scores.study));
    user.push_str(&format!("- sleep score: {}\n", scores.sleep));
    user.push_str(&format!("- finance score: {}\n\n", scores.finance));
    user.push_str("Situation: free time, no class scheduled.\n");
    user.push_str(&format!(
        "The weakest category is \"{}\".\n\n",
        weakest.as_str()
    ));
    user.push_str("Rules:\n");
    user.push_str("1) Produce exactly 2 options.\n");
    user.push_str(
        "2) Each option is a concrete doable action, not an attitude \
(good: \"study two hours at the library\"; bad: \"try harder\").\n",
    );
    user.push_str("3) Option A directly recovers the weakest category.\n");
    user.push_str(
        "4) Option B defers or dodges that recovery but still benefits some other category.\n",
    );
    user.push_str("5) Tag every option with a category: study, sleep or finance.\n\n");
    user.push_str("Return a JSON object with shape:\n");
    user.push_str(
        r#"{"message":"one or two sentences framing the situation","choices":[{"label":"...","category":"study|sleep|finance"},{"label":"...","category":"study|sleep|finance"}]}"#,
    );
    user.push('\n');

    (system, user)
}

/// Strictly validate a collaborator completion into a [`FreeTimePair`].
pub fn parse_free_time_pair(raw: &str) -> Result<FreeTimePair, ValidationError> {
    let json = extract_json(raw).ok_or(ValidationError::NoJson)?;
    let parsed: RawPair =
        serde_json::from_str(&json).map_err(|e| ValidationError::Decode(e.to_string()))?;

    if parsed.choices.len() != 2 {
        return Err(ValidationError::ChoiceCount(parsed.choices.len()));
    }

    let mut options = Vec::with_capacity(2);
    for (idx, choice) in parsed.choices.iter().enumerate() {
        if choice.label.trim().is_empty() {
            return Err(ValidationError::MissingLabel(idx));
        }
        let category = choice
            .category
            .as_deref()
            .and_then(Category::parse)
            .ok_or_else(|| ValidationError::BadCategory(idx, choice.category.clone()))?;
        options.push(FreeTimeOption {
            label: choice.label.trim().to_string(),
            category,
        });
    }

    let second = options.pop().ok_or(ValidationError::ChoiceCount(0))?;
    let first = options.pop().ok_or(ValidationError::ChoiceCount(1))?;
    Ok(FreeTimePair {
        message: parsed.message,
        options: [first, second],
    })
}
