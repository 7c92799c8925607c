//! Configuration file loading.
//!
//! The file is TOML with the layout of [`BotConfig`]. Missing keys take
//! their defaults; a missing default file means an all-default config.
//! Validation happens when the [`carebot_engine::AppContext`] is built.

use std::path::{Path, PathBuf};

use carebot_logic::config::BotConfig;
use thiserror::Error;

/// Looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "carebot.toml";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Parse a configuration from TOML text.
pub fn parse_settings(content: &str) -> Result<BotConfig, SettingsError> {
    Ok(toml::from_str(content)?)
}

/// Load the configuration from `path`, or from [`DEFAULT_CONFIG_FILE`] if it
/// exists, or fall back to defaults.
pub fn load_settings(path: Option<&Path>) -> Result<BotConfig, SettingsError> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => {
            let local = PathBuf::from(DEFAULT_CONFIG_FILE);
            if !local.exists() {
                log::debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
                return Ok(BotConfig::default());
            }
            local
        }
    };

    log::info!("Loading configuration from {}", path.display());
    let content = std::fs::read_to_string(&path).map_err(|source| SettingsError::ReadError {
        path: path.clone(),
        source,
    })?;
    parse_settings(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_is_default() {
        assert_eq!(parse_settings("").unwrap(), BotConfig::default());
    }

    #[test]
    fn test_partial_file() {
        let config = parse_settings(
            r#"
            [timing]
            action_delay_ms = 250

            [drift]
            skip = 0.3
            medication = 0.3
            seed = 7
            "#,
        )
        .unwrap();
        assert_eq!(config.timing.action_delay_ms, 250);
        assert_eq!(config.timing.status_delay_ms, 1000);
        assert_eq!(config.drift.seed, Some(7));
        assert!((config.drift.hunger() - 0.4).abs() < 1e-9);
        assert_eq!(config.messages.hungry, "Hungry");
    }

    #[test]
    fn test_bundled_example_parses() {
        let config = parse_settings(include_str!("../carebot.toml")).unwrap();
        assert_eq!(config, BotConfig::default());
    }

    #[test]
    fn test_bad_toml() {
        let err = parse_settings("[drift\nskip = 0.5").unwrap_err();
        assert!(matches!(err, SettingsError::ParseError(_)));
    }

    #[test]
    fn test_wrong_type() {
        let err = parse_settings("[timing]\nstatus_delay_ms = \"slow\"").unwrap_err();
        assert!(err.to_string().starts_with("Failed to parse config"));
    }

    #[test]
    fn test_missing_explicit_file() {
        let err = load_settings(Some(Path::new("/nonexistent/carebot.toml"))).unwrap_err();
        assert!(matches!(err, SettingsError::ReadError { .. }));
    }
}
