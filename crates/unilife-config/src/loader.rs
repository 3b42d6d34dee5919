//! Configuration loading and validation.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::UnilifeConfig;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Load full Unilife configuration from a YAML file.
pub fn load_config(path: &Path) -> Result<UnilifeConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: UnilifeConfig = serde_yaml::from_str(&content)?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &UnilifeConfig) -> Result<(), ConfigError> {
    if config.version == 0 {
        return Err(ConfigError::Invalid(
            "version must be greater than 0".to_string(),
        ));
    }

    if config.app.name.trim().is_empty() {
        return Err(ConfigError::Invalid(
            "app.name must not be empty".to_string(),
        ));
    }

    match config.synth.strategy.as_str() {
        "deterministic" | "generative" => {}
        other => {
            return Err(ConfigError::Invalid(format!(
                "synth.strategy '{}' not recognized (expected deterministic or generative)",
                other
            )));
        }
    }

    if config.scoring.target_sleep_minutes <= 0.0
        || config.scoring.sleep_floor_minutes <= 0.0
        || config.scoring.target_study_hours <= 0.0
    {
        return Err(ConfigError::Invalid(
            "scoring targets must be positive".to_string(),
        ));
    }

    if config.scoring.sleep_floor_minutes >= config.scoring.target_sleep_minutes {
        return Err(ConfigError::Invalid(
            "scoring.sleep_floor_minutes must be below scoring.target_sleep_minutes".to_string(),
        ));
    }

    if config.llm.timeout_secs == 0 {
        return Err(ConfigError::Invalid(
            "llm.timeout_secs must be > 0".to_string(),
        ));
    }

    for (name, spec) in [
        ("state", &config.stores.state),
        ("schedule", &config.stores.schedule),
        ("choice", &config.stores.choice),
        ("branch", &config.stores.branch),
    ] {
        if spec.backend != "in_memory" {
            return Err(ConfigError::Invalid(format!(
                "stores.{}.backend '{}' not recognized (only in_memory is built in)",
                name, spec.backend
            )));
        }
    }

    Ok(())
}
