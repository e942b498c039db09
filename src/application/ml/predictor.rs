use crate::domain::errors::Result;
use crate::domain::ml::FeatureVector;

/// Interface for pre-trained price models
///
/// Implementations are loaded once and treated as pure functions of their
/// input: the same vector always yields the same price.
pub trait PriceModel: Send + Sync {
    /// Predict the price (EUR/MWh) for a single feature row.
    ///
    /// Returns `ForecastError::InferenceError` when the model rejects the
    /// input, e.g. because it was trained on a different number of features.
    fn predict(&self, features: &FeatureVector) -> Result<f64>;

    /// Number of input columns the model expects, when the artifact records it.
    fn num_features(&self) -> Option<usize> {
        None
    }

    /// Get model name/type
    fn name(&self) -> &str;

    /// Get model version/id
    fn version(&self) -> &str;
}
