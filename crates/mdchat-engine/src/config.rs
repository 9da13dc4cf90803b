//! Configuration for mdchat.
//!
//! Every field has a default, so an empty JSON object is a valid config
//! file. Command-line flags override values loaded from disk.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Main configuration for mdchat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Delay between revealed characters, in milliseconds.
    #[serde(default = "default_reveal_interval_ms")]
    pub reveal_interval_ms: u64,

    /// Color theme.
    #[serde(default)]
    pub theme: ThemeName,

    /// Number of submitted inputs kept for Up/Down recall.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

fn default_reveal_interval_ms() -> u64 {
    50
}

fn default_history_limit() -> usize {
    100
}

/// Named color themes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ThemeName {
    /// Dark theme.
    #[default]
    Mocha,
    /// Light theme.
    Latte,
    /// Maximum contrast, also used when `NO_COLOR` is set.
    HighContrast,
}

impl std::str::FromStr for ThemeName {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "mocha" | "dark" => Ok(Self::Mocha),
            "latte" | "light" => Ok(Self::Latte),
            "high_contrast" => Ok(Self::HighContrast),
            other => Err(ConfigError::Invalid(format!("unknown theme: {other}"))),
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            reveal_interval_ms: default_reveal_interval_ms(),
            theme: ThemeName::default(),
            history_limit: default_history_limit(),
        }
    }
}

impl ChatConfig {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from `path` if it exists, else defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.reveal_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "reveal_interval_ms must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// Reveal interval as a [`Duration`].
    pub fn reveal_interval(&self) -> Duration {
        Duration::from_millis(self.reveal_interval_ms)
    }
}

/// Errors that can occur when working with configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error reading or writing config.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing config JSON.
    #[error("Parse error: {0}")]
    Parse(#[source] serde_json::Error),

    /// Error serializing config to JSON.
    #[error("Serialize error: {0}")]
    Serialize(#[source] serde_json::Error),

    /// A value is out of range.
    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = ChatConfig::default();
        assert_eq!(config.reveal_interval_ms, 50);
        assert_eq!(config.reveal_interval(), Duration::from_millis(50));
        assert_eq!(config.theme, ThemeName::Mocha);
        assert_eq!(config.history_limit, 100);
    }

    #[test]
    fn test_empty_object_uses_defaults() {
        let config: ChatConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ChatConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = ChatConfig {
            reveal_interval_ms: 10,
            theme: ThemeName::Latte,
            history_limit: 5,
        };

        config.save(&path).unwrap();
        let loaded = ChatConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_rejects_zero_interval() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"reveal_interval_ms": 0}"#).unwrap();

        let err = ChatConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_load_reports_bad_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(matches!(ChatConfig::load(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = TempDir::new().unwrap();
        let config = ChatConfig::load_or_default(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, ChatConfig::default());
    }

    #[test]
    fn test_theme_name_parsing() {
        assert_eq!("mocha".parse::<ThemeName>().unwrap(), ThemeName::Mocha);
        assert_eq!("light".parse::<ThemeName>().unwrap(), ThemeName::Latte);
        assert_eq!(
            "high-contrast".parse::<ThemeName>().unwrap(),
            ThemeName::HighContrast
        );
        assert!("neon".parse::<ThemeName>().is_err());
    }

    #[test]
    fn test_theme_serializes_snake_case() {
        let json = serde_json::to_string(&ThemeName::HighContrast).unwrap();
        assert_eq!(json, "\"high_contrast\"");
    }
}
