//! # Unilife Config
//!
//! Unified single-file configuration for Unilife. A single `unilife.yaml`
//! can configure scoring targets, the penalty policy, the branch
//! synthesizer, the collaborator endpoint, stores, and observability
//! settings. Every section has full defaults; an empty file is a valid
//! configuration.

mod loader;

pub use loader::{load_config, ConfigError};

use serde::Deserialize;

use unilife_core::rules::{DeltaPolicy, Penalty};
use unilife_core::scores::ScoreTargets;

/// Top-level configuration schema for Unilife.
#[derive(Debug, Clone, Deserialize)]
pub struct UnilifeConfig {
    /// Config schema version.
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub app: AppConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub policy: PolicyConfig,
    #[serde(default)]
    pub synth: SynthConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub stores: StoresConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

fn default_version() -> u32 {
    1
}

impl Default for UnilifeConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            app: AppConfig::default(),
            scoring: ScoringConfig::default(),
            policy: PolicyConfig::default(),
            synth: SynthConfig::default(),
            llm: LlmConfig::default(),
            stores: StoresConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_env")]
    pub environment: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            environment: default_env(),
        }
    }
}

fn default_app_name() -> String {
    "unilife".to_string()
}

fn default_env() -> String {
    "development".to_string()
}

/// Weekly score targets. Mirrors [`ScoreTargets`] so the whole section can
/// be omitted or overridden field by field.
#[derive(Debug, Clone, Deserialize)]
pub struct ScoringConfig {
    #[serde(default = "default_target_sleep_minutes")]
    pub target_sleep_minutes: f64,
    #[serde(default = "default_sleep_floor_minutes")]
    pub sleep_floor_minutes: f64,
    #[serde(default = "default_target_study_hours")]
    pub target_study_hours: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            target_sleep_minutes: default_target_sleep_minutes(),
            sleep_floor_minutes: default_sleep_floor_minutes(),
            target_study_hours: default_target_study_hours(),
        }
    }
}

impl ScoringConfig {
    pub fn targets(&self) -> ScoreTargets {
        ScoreTargets {
            target_sleep_minutes: self.target_sleep_minutes,
            sleep_floor_minutes: self.sleep_floor_minutes,
            target_study_hours: self.target_study_hours,
        }
    }
}

fn default_target_sleep_minutes() -> f64 {
    420.0
}

fn default_sleep_floor_minutes() -> f64 {
    300.0
}

fn default_target_study_hours() -> f64 {
    5.0
}

/// Penalty table for the delta rules. Each entry accepts
/// `{kind: none}`, `{kind: full_duration}` or `{kind: fixed, minutes: N}`.
#[derive(Debug, Clone, Deserialize)]
pub struct PolicyConfig {
    #[serde(default = "default_penalty")]
    pub skip_play_study: Penalty,
    #[serde(default = "default_penalty")]
    pub stay_up_play_study: Penalty,
    #[serde(default = "default_penalty")]
    pub stay_up_play_sleep: Penalty,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            skip_play_study: default_penalty(),
            stay_up_play_study: default_penalty(),
            stay_up_play_sleep: default_penalty(),
        }
    }
}

impl PolicyConfig {
    pub fn policy(&self) -> DeltaPolicy {
        DeltaPolicy {
            skip_play_study: self.skip_play_study,
            stay_up_play_study: self.stay_up_play_study,
            stay_up_play_sleep: self.stay_up_play_sleep,
        }
    }
}

fn default_penalty() -> Penalty {
    Penalty::FullDuration
}

#[derive(Debug, Clone, Deserialize)]
pub struct SynthConfig {
    /// "deterministic" or "generative".
    #[serde(default = "default_synth_strategy")]
    pub strategy: String,
    #[serde(default = "default_synth_model")]
    pub model: String,
    #[serde(default = "default_synth_temperature")]
    pub temperature: f32,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            strategy: default_synth_strategy(),
            model: default_synth_model(),
            temperature: default_synth_temperature(),
        }
    }
}

fn default_synth_strategy() -> String {
    "deterministic".to_string()
}

fn default_synth_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_synth_temperature() -> f32 {
    0.7
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_llm_endpoint")]
    pub endpoint: String,
    /// Environment variable holding the API key. The key itself never
    /// appears in the file.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: default_llm_endpoint(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_llm_timeout_secs(),
        }
    }
}

impl LlmConfig {
    /// Resolve the API key from the configured environment variable.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env).ok().filter(|v| !v.is_empty())
    }
}

fn default_llm_endpoint() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_llm_timeout_secs() -> u64 {
    8
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct StoresConfig {
    #[serde(default)]
    pub state: StoreSpec,
    #[serde(default)]
    pub schedule: StoreSpec,
    #[serde(default)]
    pub choice: StoreSpec,
    #[serde(default)]
    pub branch: StoreSpec,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreSpec {
    #[serde(default = "default_backend")]
    pub backend: String,
    #[serde(default)]
    pub connection_url: Option<String>,
}

impl Default for StoreSpec {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            connection_url: None,
        }
    }
}

fn default_backend() -> String {
    "in_memory".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_file: Option<String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_file: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
