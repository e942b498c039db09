use serde::Serialize;
use std::fmt;
use std::ops::Index;
use std::str::FromStr;

/// Ordered list of feature names.
/// This order MUST match the column order the price model was trained on.
/// Any change here is a breaking change for every model artifact.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "temperature",
    "humidity",
    "wind_speed",
    "precipitation",
    "hour",
    "day_of_week",
    "month",
    "price_lag_1",
    "price_lag_24",
    "cloud_cover",
    "sunshine",
    "price_spread",
];

pub const FEATURE_COUNT: usize = 12;

pub const IDX_TEMPERATURE: usize = 0;
pub const IDX_HUMIDITY: usize = 1;
pub const IDX_WIND_SPEED: usize = 2;
pub const IDX_PRECIPITATION: usize = 3;
pub const IDX_HOUR: usize = 4;
pub const IDX_DAY_OF_WEEK: usize = 5;
pub const IDX_MONTH: usize = 6;
pub const IDX_PRICE_LAG_1: usize = 7;
pub const IDX_PRICE_LAG_24: usize = 8;
pub const IDX_CLOUD_COVER: usize = 9;
pub const IDX_SUNSHINE: usize = 10;
pub const IDX_PRICE_SPREAD: usize = 11;

/// Lag offsets, counted back from the forecast point.
pub const SHORT_LAG: usize = 1;
pub const DAILY_LAG: usize = 24;

/// Fixed-width model input, ordered as [`FEATURE_NAMES`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn new(values: [f64; FEATURE_COUNT]) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.0.to_vec()
    }

    /// Single-precision copy for runtimes that take f32 tensors.
    pub fn to_f32_vec(&self) -> Vec<f32> {
        self.0.iter().map(|v| *v as f32).collect()
    }

    pub fn len(&self) -> usize {
        FEATURE_COUNT
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        FEATURE_NAMES
            .iter()
            .position(|n| *n == name)
            .map(|idx| self.0[idx])
    }

    /// (name, value) pairs in model order.
    pub fn named(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        FEATURE_NAMES.iter().copied().zip(self.0.iter().copied())
    }
}

impl Index<usize> for FeatureVector {
    type Output = f64;

    fn index(&self, idx: usize) -> &f64 {
        &self.0[idx]
    }
}

impl From<FeatureVector> for Vec<f64> {
    fn from(fv: FeatureVector) -> Self {
        fv.to_vec()
    }
}

/// Fixed values for the slots that are not yet real covariates.
///
/// Defaults reproduce the values the deployed model has always been served
/// with. Swap individual fields for computed features without touching the
/// vector layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaceholderFeatures {
    pub humidity: f64,
    pub precipitation: f64,
    pub day_of_week: f64,
    pub month: f64,
    pub cloud_cover: f64,
    pub sunshine: f64,
    pub price_spread: f64,
}

impl PlaceholderFeatures {
    pub const HUMIDITY: f64 = 50.0;
    pub const PRECIPITATION: f64 = 0.0;
    pub const DAY_OF_WEEK: f64 = 2.0;
    pub const MONTH: f64 = 6.0;
    pub const CLOUD_COVER: f64 = 50.0;
    pub const SUNSHINE: f64 = 5.0;
    pub const PRICE_SPREAD: f64 = 10.0;
}

impl Default for PlaceholderFeatures {
    fn default() -> Self {
        Self {
            humidity: Self::HUMIDITY,
            precipitation: Self::PRECIPITATION,
            day_of_week: Self::DAY_OF_WEEK,
            month: Self::MONTH,
            cloud_cover: Self::CLOUD_COVER,
            sunshine: Self::SUNSHINE,
            price_spread: Self::PRICE_SPREAD,
        }
    }
}

/// How the calendar slots of the vector are filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeatureMode {
    /// Calendar slots use the placeholder constants.
    #[default]
    Observed,
    /// Day of week and month come from the forecast point.
    Calendar,
}

impl FromStr for FeatureMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "observed" => Ok(FeatureMode::Observed),
            "calendar" => Ok(FeatureMode::Calendar),
            _ => anyhow::bail!(
                "Invalid FEATURE_MODE: {}. Must be 'observed' or 'calendar'",
                s
            ),
        }
    }
}

impl fmt::Display for FeatureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureMode::Observed => write!(f, "observed"),
            FeatureMode::Calendar => write!(f, "calendar"),
        }
    }
}
