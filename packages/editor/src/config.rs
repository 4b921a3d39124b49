use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::errors::EditorError;

pub const DEFAULT_CONFIG_NAME: &str = "sitecraft.config.json";

/// Editor configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorConfig {
    /// Undo levels kept before eviction kicks in (0 = unlimited)
    #[serde(default = "default_max_history")]
    pub max_history: usize,

    /// Share of the oldest history dropped per eviction
    #[serde(default = "default_eviction_fraction")]
    pub eviction_fraction: f64,

    /// Id namespace for new documents
    #[serde(default = "default_namespace")]
    pub default_namespace: String,

    /// Whether replacing the last command saves by default
    #[serde(default)]
    pub save_on_replace: bool,
}

fn default_max_history() -> usize {
    100
}

fn default_eviction_fraction() -> f64 {
    0.5
}

fn default_namespace() -> String {
    "site".to_string()
}

impl EditorConfig {
    /// Load config from a directory, falling back to defaults when the file
    /// does not exist.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, EditorError> {
        let config_path = Self::path_in(dir);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: EditorConfig = serde_json::from_str(&content)?;
            Ok(config.normalized())
        } else {
            tracing::debug!(path = %config_path.display(), "No config file, using defaults");
            Ok(EditorConfig::default())
        }
    }

    pub fn path_in(dir: impl AsRef<Path>) -> PathBuf {
        dir.as_ref().join(DEFAULT_CONFIG_NAME)
    }

    /// Clamp `eviction_fraction` into `0..=1`.
    pub fn normalized(mut self) -> Self {
        self.eviction_fraction = if self.eviction_fraction.is_nan() {
            default_eviction_fraction()
        } else {
            self.eviction_fraction.clamp(0.0, 1.0)
        };
        self
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            max_history: default_max_history(),
            eviction_fraction: default_eviction_fraction(),
            default_namespace: default_namespace(),
            save_on_replace: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "maxHistory": 20,
            "evictionFraction": 0.25,
            "defaultNamespace": "shop",
            "saveOnReplace": true
        }"#;

        let config: EditorConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.max_history, 20);
        assert_eq!(config.eviction_fraction, 0.25);
        assert_eq!(config.default_namespace, "shop");
        assert!(config.save_on_replace);
    }

    #[test]
    fn test_default_config() {
        let config = EditorConfig::default();
        assert_eq!(config.max_history, 100);
        assert_eq!(config.eviction_fraction, 0.5);
        assert_eq!(config.default_namespace, "site");
        assert!(!config.save_on_replace);
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = EditorConfig::load(dir.path()).unwrap();
        assert_eq!(config, EditorConfig::default());
    }

    #[test]
    fn test_load_clamps_fraction() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            EditorConfig::path_in(dir.path()),
            r#"{ "maxHistory": 5, "evictionFraction": 3.0 }"#,
        )
        .unwrap();

        let config = EditorConfig::load(dir.path()).unwrap();
        assert_eq!(config.max_history, 5);
        assert_eq!(config.eviction_fraction, 1.0);
        assert_eq!(config.default_namespace, "site");
    }

    #[test]
    fn test_load_rejects_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(EditorConfig::path_in(dir.path()), "{ not json").unwrap();
        assert!(matches!(
            EditorConfig::load(dir.path()),
            Err(EditorError::Json(_))
        ));
    }
}
