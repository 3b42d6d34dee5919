//! The synthesizer itself: one entry point, two strategies, one guarantee.
//!
//! `synthesize` always returns an opposite. The generative path is a
//! best-effort refinement; if the collaborator is unreachable, slow, or
//! returns anything that fails validation, the deterministic table answers
//! instead and the failure is only visible in the logs.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, warn};

use unilife_core::rules::DeltaPolicy;
use unilife_core::scores::{weakest_category, Scores};
use unilife_core::types::{Category, FreeTimePair, SlotType, StateDelta};

use crate::freetime::{build_free_time_prompt, parse_free_time_pair};
use crate::llm::{extract_json, LlmClient, LlmRequest};
use crate::opposite::deterministic_opposite;

/// How opposites are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynthStrategy {
    /// Table lookup only. No network, fully reproducible.
    Deterministic,
    /// Ask the collaborator first, fall back to the table.
    Generative,
}

/// Model parameters for the generative path.
#[derive(Debug, Clone)]
pub struct SynthesizerConfig {
    pub model: String,
    pub temperature: f32,
}

impl Default for SynthesizerConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.7,
        }
    }
}

/// A complete counterfactual: the action that was not taken, with its
/// cost, human-readable description and resolved state effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizedOpposite {
    pub action: String,
    pub cost: i64,
    pub description: String,
    pub delta: StateDelta,
}

pub struct BranchSynthesizer {
    strategy: SynthStrategy,
    client: Option<Arc<dyn LlmClient>>,
    config: SynthesizerConfig,
}

#[derive(Debug, Deserialize)]
struct RawOpposite {
    #[serde(default)]
    action: String,
    cost: Option<i64>,
    #[serde(default)]
    description: String,
}

impl BranchSynthesizer {
    pub fn deterministic() -> Self {
        Self {
            strategy: SynthStrategy::Deterministic,
            client: None,
            config: SynthesizerConfig::default(),
        }
    }

    pub fn generative(client: Arc<dyn LlmClient>, config: SynthesizerConfig) -> Self {
        Self {
            strategy: SynthStrategy::Generative,
            client: Some(client),
            config,
        }
    }

    pub fn strategy(&self) -> SynthStrategy {
        self.strategy
    }

    /// Produce the counterfactual for a committed choice. Never fails.
    pub async fn synthesize(
        &self,
        slot_type: SlotType,
        action: &str,
        cost: i64,
        duration_minutes: i64,
        subject: Option<&str>,
        policy: &DeltaPolicy,
    ) -> SynthesizedOpposite {
        if self.strategy == SynthStrategy::Generative {
            if let Some(client) = &self.client {
                match self
                    .generate_opposite(client, slot_type, action, cost, subject)
                    .await
                {
                    Ok(raw) => {
                        let delta = policy.resolve(
                            slot_type,
                            &raw.action,
                            raw.cost.unwrap_or(0),
                            duration_minutes,
                            None,
                        );
                        return SynthesizedOpposite {
                            action: raw.action,
                            cost: raw.cost.unwrap_or(0),
                            description: raw.description,
                            delta,
                        };
                    }
                    Err(reason) => {
                        warn!(
                            slot = slot_type.as_str(),
                            action,
                            reason = %reason,
                            "opposite generation failed, using table"
                        );
                    }
                }
            }
        }

        let table = deterministic_opposite(slot_type, action, subject);
        let delta = policy.resolve(slot_type, &table.action, table.cost, duration_minutes, None);
        SynthesizedOpposite {
            action: table.action,
            cost: table.cost,
            description: table.description,
            delta,
        }
    }

    /// Generate the two free-time options for a fork question. `None` means
    /// the caller should offer the fixed activity set instead; the
    /// deterministic strategy always answers `None`.
    pub async fn free_time_options(
        &self,
        scores: &Scores,
        weakest: Option<Category>,
    ) -> Option<FreeTimePair> {
        if self.strategy != SynthStrategy::Generative {
            return None;
        }
        let client = self.client.as_ref()?;

        let weakest = weakest.unwrap_or_else(|| weakest_category(scores));
        let (system, user) = build_free_time_prompt(scores, weakest);
        let request = LlmRequest {
            system,
            user,
            model: self.config.model.clone(),
            temperature: self.config.temperature,
        };

        let raw = match client.complete(request).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "free time generation failed, using fixed set");
                return None;
            }
        };

        match parse_free_time_pair(&raw) {
            Ok(pair) => {
                debug!(message = %pair.message, "free time options accepted");
                Some(pair)
            }
            Err(e) => {
                warn!(error = %e, "free time payload rejected, using fixed set");
                None
            }
        }
    }

    async fn generate_opposite(
        &self,
        client: &Arc<dyn LlmClient>,
        slot_type: SlotType,
        action: &str,
        cost: i64,
        subject: Option<&str>,
    ) -> Result<RawOpposite, String> {
        let system = "You narrate the road not taken for a student's day. \
Return ONLY one valid JSON object, no markdown and no commentary."
            .to_string();

        let mut user = String::new();
        user.push_str(&format!(
            "The student just chose \"{}\" in a {} slot",
            action,
            slot_type.as_str()
        ));
        if let Some(subject) = subject {
            user.push_str(&format!(" for the subject \"{}\"", subject));
        }
        user.push_str(&format!(" at a cost of {}.\n\n", cost));
        user.push_str(
            "Describe the single most plausible action they did NOT take in \
that same slot. Return a JSON object with shape:\n",
        );
        user.push_str(
            r#"{"action":"snake_case_action_id","cost":0,"description":"one sentence in plain English"}"#,
        );
        user.push('\n');

        let request = LlmRequest {
            system,
            user,
            model: self.config.model.clone(),
            temperature: self.config.temperature,
        };

        let raw = client
            .complete(request)
            .await
            .map_err(|e| format!("collaborator error: {}", e))?;
        let json = extract_json(&raw).ok_or_else(|| "no JSON object in output".to_string())?;
        let parsed: RawOpposite =
            serde_json::from_str(&json).map_err(|e| format!("payload did not decode: {}", e))?;

        if parsed.action.trim().is_empty() {
            return Err("missing action".to_string());
        }
        if parsed.cost.is_none() {
            return Err("missing cost".to_string());
        }
        if parsed.description.trim().is_empty() {
            return Err("missing description".to_string());
        }
        Ok(parsed)
    }
}
