//! Engine configuration file handling

use anyhow::{Context, Result};
use pact_interface::WindowConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

pub const DEFAULT_CONFIG_FILE: &str = "pact.toml";

/// Top-level configuration (pact.toml)
#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSection,
    #[serde(default)]
    pub clocks: ClocksConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub window: WindowSection,
}

/// Application metadata
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AppSection {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_version")]
    pub version: String,
}

fn default_name() -> String {
    "Vengeance Pact".to_string()
}

fn default_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            name: default_name(),
            version: default_version(),
        }
    }
}

/// Loop rates in Hz
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ClocksConfig {
    #[serde(default = "default_logic_hz")]
    pub logic: u32,
    #[serde(default = "default_rendering_hz")]
    pub rendering: u32,
}

fn default_logic_hz() -> u32 {
    100
}

fn default_rendering_hz() -> u32 {
    60
}

impl Default for ClocksConfig {
    fn default() -> Self {
        Self {
            logic: default_logic_hz(),
            rendering: default_rendering_hz(),
        }
    }
}

/// Log output settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
    /// Event bus diagnostics
    #[serde(default)]
    pub events: bool,
    /// The per-tick held-keys broadcast
    #[serde(default)]
    pub keys: bool,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            events: false,
            keys: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct WindowSection {
    #[serde(default = "default_name")]
    pub title: String,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
}

fn default_width() -> u32 {
    1000
}

fn default_height() -> u32 {
    1000
}

impl Default for WindowSection {
    fn default() -> Self {
        Self {
            title: default_name(),
            width: default_width(),
            height: default_height(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let config: AppConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        Ok(config)
    }

    /// Window session settings from the `window` and `clocks` sections
    pub fn window_config(&self) -> WindowConfig {
        WindowConfig::new(self.window.title.clone())
            .with_size(self.window.width, self.window.height)
            .with_rates(self.clocks.logic, self.clocks.rendering)
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(&dir.path().join("pact.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.clocks.logic, 100);
        assert_eq!(config.clocks.rendering, 60);
        assert_eq!(config.window.title, "Vengeance Pact");
        assert!(!config.logging.events);
    }

    #[test]
    fn test_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[clocks]
logic = 50

[logging]
level = "debug"
keys = true

[window]
width = 320
"#
        )
        .unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.clocks.logic, 50);
        assert_eq!(config.clocks.rendering, 60);
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.keys);
        assert!(!config.logging.events);
        assert_eq!(config.window.width, 320);
        assert_eq!(config.window.height, 1000);

        let window = config.window_config();
        assert_eq!(window.logic_hz, 50);
        assert_eq!((window.width, window.height), (320, 1000));
    }

    #[test]
    fn test_invalid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[clocks]\nlogic = \"fast\"").unwrap();

        let err = AppConfig::load(file.path()).unwrap_err();
        assert!(err.to_string().starts_with("Failed to parse"));
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = AppConfig::default();
        config.window.title = "Demo".to_string();

        let text = config.to_toml().unwrap();
        let parsed: AppConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }
}
