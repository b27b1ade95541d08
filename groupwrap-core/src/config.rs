//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/groupwrap/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/groupwrap/` (~/.config/groupwrap/)
//! - State/Logs: `$XDG_STATE_HOME/groupwrap/` (~/.local/state/groupwrap/)
//!
//! Nothing is persisted between runs; every export is analysed in memory.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// How canonical lines are split into messages and conversations
    #[serde(default)]
    pub ingest: IngestConfig,

    /// Statistics snapshot options
    #[serde(default)]
    pub stats: StatsConfig,

    /// Card allocation tuning
    #[serde(default)]
    pub cards: CardsConfig,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Maximum number of log files to keep
    #[serde(default = "default_max_log_files")]
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_files: default_max_log_files(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_log_files() -> usize {
    5
}

/// Ingestion configuration
#[derive(Debug, Deserialize, Clone)]
pub struct IngestConfig {
    /// Minutes of silence after which the next message opens a new conversation
    #[serde(default = "default_conversation_gap_minutes")]
    pub conversation_gap_minutes: i64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            conversation_gap_minutes: default_conversation_gap_minutes(),
        }
    }
}

fn default_conversation_gap_minutes() -> i64 {
    60
}

/// Statistics configuration
#[derive(Debug, Deserialize, Clone)]
pub struct StatsConfig {
    /// How many emojis to report in `top3emojis`
    #[serde(default = "default_top_emoji_count")]
    pub top_emoji_count: usize,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            top_emoji_count: default_top_emoji_count(),
        }
    }
}

fn default_top_emoji_count() -> usize {
    3
}

/// Card engine configuration
#[derive(Debug, Deserialize, Clone)]
pub struct CardsConfig {
    /// Upper bound on cards per export
    #[serde(default = "default_max_cards")]
    pub max_cards: usize,

    /// Size of the range the rare card is drawn from; 0 disables it
    #[serde(default = "default_rare_card_odds")]
    pub rare_card_odds: u32,

    /// The draw within `0..rare_card_odds` that awards the rare card
    #[serde(default = "default_rare_card_draw")]
    pub rare_card_draw: u32,

    /// Minimum average trailing y's per "hey" for BASICBITCH (exclusive)
    #[serde(default = "default_basic_threshold")]
    pub basic_threshold: f64,
}

impl Default for CardsConfig {
    fn default() -> Self {
        Self {
            max_cards: default_max_cards(),
            rare_card_odds: default_rare_card_odds(),
            rare_card_draw: default_rare_card_draw(),
            basic_threshold: default_basic_threshold(),
        }
    }
}

impl CardsConfig {
    /// Validate configuration, returning error message if invalid
    pub fn validate(&self) -> Result<()> {
        if self.max_cards == 0 {
            return Err(Error::Config(
                "cards.max_cards must be at least 1".to_string(),
            ));
        }
        if self.rare_card_odds > 0 && self.rare_card_draw >= self.rare_card_odds {
            return Err(Error::Config(format!(
                "cards.rare_card_draw ({}) must be below cards.rare_card_odds ({})",
                self.rare_card_draw, self.rare_card_odds
            )));
        }
        Ok(())
    }
}

fn default_max_cards() -> usize {
    5
}

fn default_rare_card_odds() -> u32 {
    10_000
}

fn default_rare_card_draw() -> u32 {
    1337
}

fn default_basic_threshold() -> f64 {
    2.0
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate every section
    pub fn validate(&self) -> Result<()> {
        if self.ingest.conversation_gap_minutes <= 0 {
            return Err(Error::Config(
                "ingest.conversation_gap_minutes must be positive".to_string(),
            ));
        }
        self.cards.validate()
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/groupwrap/config.toml` (~/.config/groupwrap/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("groupwrap").join("config.toml")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/groupwrap/` (~/.local/state/groupwrap/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("groupwrap")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.ingest.conversation_gap_minutes, 60);
        assert_eq!(config.stats.top_emoji_count, 3);
        assert_eq!(config.cards.max_cards, 5);
        assert_eq!(config.cards.rare_card_odds, 10_000);
        assert_eq!(config.cards.rare_card_draw, 1337);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[logging]
level = "debug"

[ingest]
conversation_gap_minutes = 90

[cards]
max_cards = 3
rare_card_odds = 0
"#;
        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.max_files, 5);
        assert_eq!(config.ingest.conversation_gap_minutes, 90);
        assert_eq!(config.cards.max_cards, 3);
        assert_eq!(config.cards.rare_card_odds, 0);
        assert_eq!(config.cards.basic_threshold, 2.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cards_config_validation() {
        let config = CardsConfig {
            max_cards: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = CardsConfig {
            rare_card_odds: 10,
            rare_card_draw: 10,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        // Draw is irrelevant once the rare card is disabled
        let config = CardsConfig {
            rare_card_odds: 0,
            rare_card_draw: 10,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_rejects_invalid_gap() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[ingest]\nconversation_gap_minutes = 0\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_load_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load_from(&dir.path().join("nope.toml")).unwrap_err();
        assert!(err.to_string().contains("failed to read config file"));
    }
}
