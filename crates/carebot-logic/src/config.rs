//! Bot configuration: simulated delays, drift odds and report wording.
//!
//! Every field has a default so a partial TOML file (or none at all) is
//! enough to run. The values are plain data; the CLI crate does the file
//! loading and calls [`validate_config`] before building a bot.
//!
//! ```
//! use carebot_logic::config::{validate_config, BotConfig};
//!
//! let mut config = BotConfig::default();
//! config.drift.skip = 0.3;
//! config.drift.medication = 0.3;
//! assert!(validate_config(&config).is_empty());
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Full bot configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    pub timing: TimingConfig,
    pub drift: DriftConfig,
    pub messages: MessageConfig,
}

/// Simulated delays, in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Time it takes to observe the patient before a status report.
    pub status_delay_ms: u64,
    /// Time it takes to feed or medicate.
    pub action_delay_ms: u64,
    /// How long the command loop waits on a command before reading more input.
    pub poll_timeout_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            status_delay_ms: 1000,
            action_delay_ms: 1000,
            poll_timeout_ms: 20,
        }
    }
}

impl TimingConfig {
    pub fn status_delay(&self) -> Duration {
        Duration::from_millis(self.status_delay_ms)
    }

    pub fn action_delay(&self) -> Duration {
        Duration::from_millis(self.action_delay_ms)
    }

    pub fn poll_timeout(&self) -> Duration {
        Duration::from_millis(self.poll_timeout_ms)
    }
}

/// Odds for one drift round. Hunger takes whatever `skip` and
/// `medication` leave over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriftConfig {
    /// Probability that nothing changes this round.
    pub skip: f64,
    /// Probability that the medication need activates.
    pub medication: f64,
    /// Seed for a deterministic drift sequence. `None` draws from the OS.
    pub seed: Option<u64>,
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self {
            skip: 0.5,
            medication: 0.25,
            seed: None,
        }
    }
}

impl DriftConfig {
    /// Probability that the hunger need activates.
    pub fn hunger(&self) -> f64 {
        (1.0 - self.skip - self.medication).max(0.0)
    }
}

/// Lines used in status reports, one per active need.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageConfig {
    pub hungry: String,
    pub needs_medication: String,
}

impl Default for MessageConfig {
    fn default() -> Self {
        Self {
            hungry: "Hungry".to_string(),
            needs_medication: "Medication needed".to_string(),
        }
    }
}

/// Configuration validation error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("drift.{name} must be within [0, 1], got {value}")]
    ProbabilityOutOfRange { name: &'static str, value: f64 },

    #[error("drift.skip + drift.medication must not exceed 1, got {0}")]
    ProbabilitySumTooLarge(f64),

    #[error("timing.poll_timeout_ms must be greater than zero")]
    ZeroPollTimeout,

    #[error("messages.{0} must not be empty")]
    EmptyMessage(&'static str),
}

/// Validate a bot configuration, returning all errors found.
pub fn validate_config(config: &BotConfig) -> Vec<ConfigError> {
    let mut errors = Vec::new();

    let drift = &config.drift;
    for (name, value) in [("skip", drift.skip), ("medication", drift.medication)] {
        if !(0.0..=1.0).contains(&value) {
            errors.push(ConfigError::ProbabilityOutOfRange { name, value });
        }
    }
    let sum = drift.skip + drift.medication;
    // Small tolerance so 0.7 + 0.3 style splits pass
    if sum > 1.0 + 1e-9 {
        errors.push(ConfigError::ProbabilitySumTooLarge(sum));
    }

    if config.timing.poll_timeout_ms == 0 {
        errors.push(ConfigError::ZeroPollTimeout);
    }

    if config.messages.hungry.trim().is_empty() {
        errors.push(ConfigError::EmptyMessage("hungry"));
    }
    if config.messages.needs_medication.trim().is_empty() {
        errors.push(ConfigError::EmptyMessage("needs_medication"));
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = BotConfig::default();
        assert!(validate_config(&config).is_empty());
        assert_eq!(config.timing.status_delay(), Duration::from_secs(1));
        assert_eq!(config.timing.action_delay(), Duration::from_secs(1));
        assert_eq!(config.timing.poll_timeout(), Duration::from_millis(20));
    }

    #[test]
    fn test_hunger_takes_remainder() {
        let drift = DriftConfig::default();
        assert!((drift.hunger() - 0.25).abs() < 1e-12);

        let drift = DriftConfig {
            skip: 0.3,
            medication: 0.3,
            seed: None,
        };
        assert!((drift.hunger() - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_out_of_range_probabilities() {
        let mut config = BotConfig::default();
        config.drift.skip = -0.1;
        config.drift.medication = 1.5;
        let errors = validate_config(&config);
        assert!(errors.contains(&ConfigError::ProbabilityOutOfRange {
            name: "skip",
            value: -0.1
        }));
        assert!(errors.contains(&ConfigError::ProbabilityOutOfRange {
            name: "medication",
            value: 1.5
        }));
    }

    #[test]
    fn test_probability_sum_too_large() {
        let mut config = BotConfig::default();
        config.drift.skip = 0.8;
        config.drift.medication = 0.4;
        let errors = validate_config(&config);
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], ConfigError::ProbabilitySumTooLarge(_)));
    }

    #[test]
    fn test_exact_split_is_valid() {
        let mut config = BotConfig::default();
        config.drift.skip = 0.7;
        config.drift.medication = 0.3;
        assert!(validate_config(&config).is_empty());
        assert!(config.drift.hunger() < 1e-9);
    }

    #[test]
    fn test_zero_poll_timeout_and_empty_messages() {
        let mut config = BotConfig::default();
        config.timing.poll_timeout_ms = 0;
        config.messages.hungry = "   ".to_string();
        let errors = validate_config(&config);
        assert_eq!(
            errors,
            vec![
                ConfigError::ZeroPollTimeout,
                ConfigError::EmptyMessage("hungry")
            ]
        );
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: BotConfig =
            serde_json::from_str(r#"{ "drift": { "skip": 0.3 } }"#).unwrap();
        assert!((config.drift.skip - 0.3).abs() < f64::EPSILON);
        assert!((config.drift.medication - 0.25).abs() < f64::EPSILON);
        assert_eq!(config.timing, TimingConfig::default());
        assert_eq!(config.messages, MessageConfig::default());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ConfigError::EmptyMessage("hungry").to_string(),
            "messages.hungry must not be empty"
        );
        assert_eq!(
            ConfigError::ZeroPollTimeout.to_string(),
            "timing.poll_timeout_ms must be greater than zero"
        );
    }
}
