use crate::application::ml::PriceModel;
use crate::domain::errors::{ForecastError, Result};
use crate::domain::ml::{FEATURE_COUNT, FeatureVector};

/// Deterministic linear stand-in for a trained model.
///
/// Used by tests and for wiring the presentation layer without an artifact.
pub struct MockPriceModel {
    weights: [f64; FEATURE_COUNT],
    intercept: f64,
    rejection: Option<String>,
}

impl MockPriceModel {
    pub fn new(weights: [f64; FEATURE_COUNT], intercept: f64) -> Self {
        Self {
            weights,
            intercept,
            rejection: None,
        }
    }

    pub fn constant(price: f64) -> Self {
        Self::new([0.0; FEATURE_COUNT], price)
    }

    /// A model that fails every call with `reason`.
    pub fn rejecting(reason: impl Into<String>) -> Self {
        Self {
            weights: [0.0; FEATURE_COUNT],
            intercept: 0.0,
            rejection: Some(reason.into()),
        }
    }
}

impl PriceModel for MockPriceModel {
    fn predict(&self, features: &FeatureVector) -> Result<f64> {
        if let Some(reason) = &self.rejection {
            return Err(ForecastError::inference(self.name(), reason.clone()));
        }

        Ok(self.intercept
            + features
                .as_slice()
                .iter()
                .zip(self.weights.iter())
                .map(|(x, w)| x * w)
                .sum::<f64>())
    }

    fn num_features(&self) -> Option<usize> {
        Some(FEATURE_COUNT)
    }

    fn name(&self) -> &str {
        "Mock Linear Model"
    }

    fn version(&self) -> &str {
        "mock"
    }
}
