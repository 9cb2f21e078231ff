use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

use crate::detection::DetectionThreshold;
use crate::matcher::MatchMode;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct LensConfig {
    /// Recipe catalog to load instead of the embedded one
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,
    /// Matching policy used for suggestions
    #[serde(default)]
    pub match_mode: MatchMode,
    /// Detection session settings
    #[serde(default)]
    pub detection: DetectionConfig,
}

/// Configuration for the detection session
#[derive(Debug, Deserialize, Clone)]
pub struct DetectionConfig {
    /// Minimum detection score (0.0-1.0) for a label to be accepted
    #[serde(default = "default_threshold")]
    pub threshold: f32,
    /// Number of detection events that may queue before producers wait
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

// Default value functions
fn default_threshold() -> f32 {
    DetectionThreshold::DEFAULT
}

fn default_channel_capacity() -> usize {
    64
}

impl LensConfig {
    /// Load configuration from file and environment variables
    ///
    /// See [`load_config`] for the lookup order.
    pub fn load() -> Result<Self, ConfigError> {
        load_config()
    }
}

/// Load configuration from file and environment variables
///
/// Configuration is loaded with the following priority (highest to lowest):
/// 1. Environment variables with RECIPE_LENS__ prefix
/// 2. recipe_lens.toml file in current directory
/// 3. Default values
///
/// Environment variable format: RECIPE_LENS__DETECTION__THRESHOLD
pub fn load_config() -> Result<LensConfig, ConfigError> {
    let settings = Config::builder()
        // Optional config file (can be missing)
        .add_source(File::with_name("recipe_lens").required(false))
        // Use double underscore for nested: RECIPE_LENS__DETECTION__THRESHOLD
        .add_source(
            Environment::with_prefix("RECIPE_LENS")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;
    use std::env;

    fn from_toml(toml: &str) -> Result<LensConfig, ConfigError> {
        Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    #[test]
    fn test_default_values() {
        assert_eq!(default_threshold(), 0.5);
        assert_eq!(default_channel_capacity(), 64);
    }

    #[test]
    fn test_detection_config_default() {
        let config = LensConfig::default();
        assert!(config.catalog_path.is_none());
        assert_eq!(config.match_mode, MatchMode::Any);
        assert_eq!(config.detection.threshold, 0.5);
        assert_eq!(config.detection.channel_capacity, 64);
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = from_toml("").unwrap();
        assert_eq!(config.match_mode, MatchMode::Any);
        assert_eq!(config.detection.threshold, 0.5);
    }

    #[test]
    fn test_toml_overrides() {
        let config = from_toml(
            r#"
            catalog_path = "pantry.json"
            match_mode = "complete"

            [detection]
            threshold = 0.7
            "#,
        )
        .unwrap();

        assert_eq!(config.catalog_path, Some(PathBuf::from("pantry.json")));
        assert_eq!(config.match_mode, MatchMode::Complete);
        assert_eq!(config.detection.threshold, 0.7);
        assert_eq!(config.detection.channel_capacity, 64);
    }

    #[test]
    fn test_unknown_match_mode_fails() {
        assert!(from_toml(r#"match_mode = "most""#).is_err());
    }

    #[test]
    fn test_load_config_without_file() {
        // Clear any environment variables that might interfere
        let keys_to_clear: Vec<String> = env::vars()
            .filter(|(k, _)| k.starts_with("RECIPE_LENS__"))
            .map(|(k, _)| k)
            .collect();

        for key in keys_to_clear {
            env::remove_var(&key);
        }

        // No recipe_lens.toml in the crate root, so every field takes its default
        let config = load_config().unwrap();
        assert!(config.catalog_path.is_none());
        assert_eq!(config.match_mode, MatchMode::Any);
        assert_eq!(config.detection.threshold, 0.5);
        assert_eq!(config.detection.channel_capacity, 64);
    }
}
