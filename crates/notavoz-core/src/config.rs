//! Configuration management for notavoz.
//!
//! This module provides core configuration that doesn't depend on
//! platform-specific UI libraries.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::APP_NAME;

/// Core configuration structure for the application.
///
/// This contains settings that are platform-agnostic. Platform-specific
/// settings like the hotkey string are parsed by the main application.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// API key for the cloud transcription endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Spoken language for recognition (BCP 47 tag, e.g. "pt-BR")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    /// Model to use for transcription requests
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Hotkey configuration (stored as string, parsed by app)
    /// Format: "modifier+modifier+key" e.g. "ctrl+shift+KeyN"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hotkey: Option<String>,

    /// Where saved notes are appended
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes_path: Option<PathBuf>,

    /// Recognition window in seconds: how often captured audio is drained
    /// and sent for transcription while dictating
    #[serde(
        default = "default_window_seconds",
        skip_serializing_if = "is_default_window_seconds"
    )]
    pub window_seconds: f32,
}

fn default_window_seconds() -> f32 {
    3.0
}

fn is_default_window_seconds(v: &f32) -> bool {
    (*v - default_window_seconds()).abs() < f32::EPSILON
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            language: None,
            model: None,
            hotkey: None,
            notes_path: None,
            window_seconds: default_window_seconds(),
        }
    }
}

impl Config {
    /// Get the transcription API key
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    /// Get the configured recognition language
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// Get the model name
    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    /// Get the raw hotkey string
    pub fn hotkey_str(&self) -> Option<&str> {
        self.hotkey.as_deref()
    }

    /// Get the configured notes file path
    pub fn notes_path(&self) -> Option<&Path> {
        self.notes_path.as_deref()
    }

    /// Get the recognition window as a Duration
    pub fn window(&self) -> Duration {
        Duration::from_secs_f32(self.window_seconds)
    }
}

/// Manages loading and saving configuration files.
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Creates a new ConfigManager with the default configuration directory.
    pub fn new() -> Result<Self> {
        let config_path = Self::default_config_path()?;
        Ok(Self { config_path })
    }

    /// Creates a new ConfigManager with a specified configuration directory.
    pub fn with_config_dir<P: AsRef<Path>>(dir: P) -> Self {
        let config_path = dir.as_ref().join(format!("{}.toml", APP_NAME));
        Self { config_path }
    }

    /// Returns the default path to the configuration file.
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = config_dir().context("Failed to retrieve configuration directory")?;
        Ok(config_dir.join(APP_NAME).join(format!("{}.toml", APP_NAME)))
    }

    /// Loads the configuration from the config file or returns default.
    pub fn load(&self) -> Result<Config> {
        if !self.config_path.exists() {
            return Ok(Config::default());
        }

        let config_content = fs::read_to_string(&self.config_path)
            .with_context(|| format!("Failed to read config file at {:?}", self.config_path))?;

        let config: Config = toml::from_str(&config_content)
            .with_context(|| format!("Failed to parse config file at {:?}", self.config_path))?;

        if config.api_key().is_none() {
            warn!(
                "Transcription API key is not set. Dictation will be unavailable without it. \
                 Copy the config path via the tray icon to set the key."
            );
        }

        Ok(config)
    }

    /// Saves the configuration to the config file, only writing non-default fields.
    pub fn save(&self, config: &Config) -> Result<()> {
        let config_dir = self
            .config_path
            .parent()
            .with_context(|| format!("Failed to get parent directory of {:?}", self.config_path))?;

        fs::create_dir_all(config_dir)
            .with_context(|| format!("Failed to create config directory at {:?}", config_dir))?;

        let serialized =
            toml::to_string_pretty(&config).context("Failed to serialize configuration")?;

        fs::write(&self.config_path, serialized)
            .with_context(|| format!("Failed to write config file at {:?}", self.config_path))?;

        Ok(())
    }

    /// Returns the path to the configuration file.
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.api_key.is_none());
        assert!(config.language.is_none());
        assert!(config.notes_path.is_none());
        assert_eq!(config.window(), Duration::from_secs(3));
    }

    #[test]
    fn test_load_missing_file_is_default() {
        let temp = tempdir().unwrap();
        let manager = ConfigManager::with_config_dir(temp.path());
        let config = manager.load().unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_load_config() {
        let temp = tempdir().unwrap();
        let manager = ConfigManager::with_config_dir(temp.path());

        let config = Config {
            api_key: Some("test-key".to_string()),
            language: Some("pt-BR".to_string()),
            window_seconds: 1.5,
            ..Default::default()
        };

        manager.save(&config).unwrap();
        let loaded = manager.load().unwrap();

        assert_eq!(loaded, config);
        assert!(manager.config_path().exists());
    }

    #[test]
    fn test_default_fields_are_elided_on_save() {
        let serialized = toml::to_string_pretty(&Config::default()).unwrap();
        assert!(serialized.trim().is_empty(), "got: {serialized}");
    }
}
