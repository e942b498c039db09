//! Feature layout configuration parsing from environment variables.
//!
//! Every placeholder slot of the model input can be overridden here; unset
//! variables keep the values the model has always been served with.

use crate::domain::ml::{FeatureMode, PlaceholderFeatures};
use anyhow::{Context, Result};
use std::str::FromStr;

/// Feature environment configuration
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureEnvConfig {
    pub mode: FeatureMode,
    pub placeholders: PlaceholderFeatures,
}

impl FeatureEnvConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mode = match lookup("FEATURE_MODE") {
            Some(raw) => FeatureMode::from_str(&raw)?,
            None => FeatureMode::default(),
        };

        let value = |key: &str, default: f64| -> Result<f64> {
            lookup(key)
                .map(|raw| {
                    raw.trim()
                        .parse::<f64>()
                        .with_context(|| format!("Failed to parse {}", key))
                })
                .unwrap_or(Ok(default))
        };

        let placeholders = PlaceholderFeatures {
            humidity: value("FEATURE_HUMIDITY", PlaceholderFeatures::HUMIDITY)?,
            precipitation: value("FEATURE_PRECIPITATION", PlaceholderFeatures::PRECIPITATION)?,
            day_of_week: value("FEATURE_DAY_OF_WEEK", PlaceholderFeatures::DAY_OF_WEEK)?,
            month: value("FEATURE_MONTH", PlaceholderFeatures::MONTH)?,
            cloud_cover: value("FEATURE_CLOUD_COVER", PlaceholderFeatures::CLOUD_COVER)?,
            sunshine: value("FEATURE_SUNSHINE", PlaceholderFeatures::SUNSHINE)?,
            price_spread: value("FEATURE_PRICE_SPREAD", PlaceholderFeatures::PRICE_SPREAD)?,
        };

        Ok(Self { mode, placeholders })
    }
}
