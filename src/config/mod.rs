//! Configuration module for pricecast.
//!
//! Settings are read from environment variables (a `.env` file is loaded by
//! the binary first), organized by concern: artifacts here, feature layout in
//! [`feature_config`].

mod feature_config;

pub use feature_config::FeatureEnvConfig;

pub use crate::application::ml::ModelFormat;
use anyhow::Result;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_MODEL_PATH: &str = "xgboost_model.json";
pub const DEFAULT_DATASET_PATH: &str = "test_predictions.csv";

/// Main application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub model_path: PathBuf,
    pub dataset_path: PathBuf,
    /// `None` detects the format from the artifact itself.
    pub model_format: Option<ModelFormat>,
    pub features: FeatureEnvConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let model_path = lookup("MODEL_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_PATH));
        let dataset_path = lookup("DATASET_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATASET_PATH));

        let model_format = match lookup("MODEL_FORMAT") {
            Some(raw) if raw.trim().is_empty() || raw.eq_ignore_ascii_case("auto") => None,
            Some(raw) => Some(ModelFormat::from_str(raw.trim())?),
            None => None,
        };

        let features = FeatureEnvConfig::from_lookup(&lookup)?;

        Ok(Self {
            model_path,
            dataset_path,
            model_format,
            features,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ml::FeatureMode;
    use std::collections::HashMap;

    fn from_pairs(pairs: &[(&str, &str)]) -> Result<Config> {
        let map: HashMap<&str, &str> = pairs.iter().copied().collect();
        Config::from_lookup(|key| map.get(key).map(|v| v.to_string()))
    }

    #[test]
    fn test_config_defaults() {
        let config = from_pairs(&[]).unwrap();
        assert_eq!(config.model_path, PathBuf::from("xgboost_model.json"));
        assert_eq!(config.dataset_path, PathBuf::from("test_predictions.csv"));
        assert_eq!(config.model_format, None);
        assert_eq!(config.features.mode, FeatureMode::Observed);
    }

    #[test]
    fn test_config_overrides() {
        let config = from_pairs(&[
            ("MODEL_PATH", "models/forest.json"),
            ("DATASET_PATH", "data/test.csv"),
            ("MODEL_FORMAT", "smartcore"),
            ("FEATURE_MODE", "calendar"),
        ])
        .unwrap();
        assert_eq!(config.model_path, PathBuf::from("models/forest.json"));
        assert_eq!(config.dataset_path, PathBuf::from("data/test.csv"));
        assert_eq!(config.model_format, Some(ModelFormat::SmartCore));
        assert_eq!(config.features.mode, FeatureMode::Calendar);
    }

    #[test]
    fn test_auto_model_format() {
        let config = from_pairs(&[("MODEL_FORMAT", "auto")]).unwrap();
        assert_eq!(config.model_format, None);
    }

    #[test]
    fn test_invalid_model_format() {
        assert!(from_pairs(&[("MODEL_FORMAT", "pickle")]).is_err());
    }
}
