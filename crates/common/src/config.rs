//! Application configuration.
//!
//! The frame model and processing crates never read configuration. Whatever
//! composes nodes into a host (the node catalog, the CLI) receives an
//! [`AppConfig`] explicitly.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{VbatchError, VbatchResult};

/// Global application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Log a summary of every node output.
    #[serde(default)]
    pub debug: bool,

    /// Node naming and category decoration.
    #[serde(default)]
    pub ui: UiConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Defaults used when a caller leaves a parameter unset.
    #[serde(default)]
    pub defaults: ProcessingDefaults,
}

/// How node names and categories are presented to the host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Root category every node category is nested under.
    pub top_category: String,

    pub prepend_icon_to_category: bool,
    pub append_icon_to_category: bool,
    pub prepend_icon_to_node: bool,
    pub append_icon_to_node: bool,

    /// Suffix appended to every node's display name.
    pub node_name_suffix: String,

    /// Icon per category key (e.g. "camera", "batch").
    pub category_icons: BTreeMap<String, String>,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "vbatch_processing=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,
}

/// Processing defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingDefaults {
    pub framerate_base: u32,
    pub framerate_divisor: u32,
    pub output_width: u32,
    pub output_height: u32,

    /// Run per-frame transforms on the rayon pool.
    pub parallel: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            debug: false,
            ui: UiConfig::default(),
            logging: LoggingConfig::default(),
            defaults: ProcessingDefaults::default(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        let category_icons = [
            ("animation", "🎥"),
            ("transforms", "🔀"),
            ("camera", "🎥"),
            ("base", "🎭"),
            ("utils", "🛠"),
            ("batch", "🎞"),
            ("transitions", "⭆"),
            ("vbatch", "🎭"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self {
            top_category: "VBatch".to_string(),
            prepend_icon_to_category: true,
            append_icon_to_category: false,
            prepend_icon_to_node: true,
            append_icon_to_node: false,
            node_name_suffix: " [VB]".to_string(),
            category_icons,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl Default for ProcessingDefaults {
    fn default() -> Self {
        Self {
            framerate_base: 24,
            framerate_divisor: 1,
            output_width: 512,
            output_height: 512,
            parallel: true,
        }
    }
}

impl UiConfig {
    /// Icon configured for a category key, if any.
    pub fn category_icon(&self, key: &str) -> Option<&str> {
        self.category_icons.get(key).map(String::as_str)
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match Self::load_from(&config_path) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!("Failed to load config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Load config from an explicit path.
    pub fn load_from(path: &Path) -> VbatchResult<Self> {
        if !path.exists() {
            return Err(VbatchError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values no node could work with.
    pub fn validate(&self) -> VbatchResult<()> {
        if self.defaults.framerate_base == 0 {
            return Err(VbatchError::config("defaults.framerate_base must be >= 1"));
        }
        if self.defaults.output_width == 0 || self.defaults.output_height == 0 {
            return Err(VbatchError::config(
                "defaults.output_width and defaults.output_height must be >= 1",
            ));
        }
        Ok(())
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        self.save_to(&config_file_path())
    }

    /// Save config to an explicit path.
    pub fn save_to(&self, config_path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("vbatch").join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("vbatch-config-test-{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.ui.top_category, "VBatch");
        assert_eq!(config.ui.category_icon("camera"), Some("🎥"));
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: AppConfig = serde_json::from_str(r#"{"debug": true}"#).unwrap();
        assert!(config.debug);
        assert_eq!(config.defaults.framerate_base, 24);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let path = temp_path("roundtrip.json");
        let mut config = AppConfig::default();
        config.ui.node_name_suffix = " [X]".to_string();
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.ui.node_name_suffix, " [X]");
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_load_from_missing_file() {
        let err = AppConfig::load_from(&temp_path("missing.json")).unwrap_err();
        assert!(matches!(err, VbatchError::FileNotFound { .. }));
    }

    #[test]
    fn test_zero_output_size_rejected() {
        let mut config = AppConfig::default();
        config.defaults.output_width = 0;
        assert!(matches!(
            config.validate(),
            Err(VbatchError::Config { .. })
        ));
    }
}
