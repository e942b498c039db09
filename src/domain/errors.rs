use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading artifacts or serving predictions
#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("Model artifact not found: {}", path.display())]
    ArtifactNotFound { path: PathBuf },

    #[error("Model artifact {} is corrupt: {reason}", path.display())]
    ArtifactCorrupt { path: PathBuf, reason: String },

    #[error("Dataset not found: {}", path.display())]
    DatasetNotFound { path: PathBuf },

    #[error("Dataset {} is malformed: {reason}", path.display())]
    DatasetMalformed { path: PathBuf, reason: String },

    #[error("Inference failed in {model}: {source}")]
    InferenceError {
        model: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Insufficient history: the price series is empty")]
    InsufficientHistory,
}

impl ForecastError {
    pub fn corrupt(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        ForecastError::ArtifactCorrupt {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn malformed(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        ForecastError::DatasetMalformed {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Wraps an underlying model failure, keeping it as the error source.
    pub fn inference(
        model: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        ForecastError::InferenceError {
            model: model.into(),
            source: source.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ForecastError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_artifact_error_formatting() {
        let error = ForecastError::ArtifactNotFound {
            path: PathBuf::from("models/xgboost_model.json"),
        };

        let msg = error.to_string();
        assert!(msg.contains("models/xgboost_model.json"));
    }

    #[test]
    fn test_dataset_malformed_formatting() {
        let error = ForecastError::malformed("test_predictions.csv", "missing column 'timestamp'");

        let msg = error.to_string();
        assert!(msg.contains("test_predictions.csv"));
        assert!(msg.contains("missing column 'timestamp'"));
    }

    #[test]
    fn test_inference_error_keeps_source() {
        let error = ForecastError::inference("xgboost", "expected 10 features, got 12");

        assert!(error.to_string().contains("xgboost"));
        let source = error.source().expect("source should be kept");
        assert_eq!(source.to_string(), "expected 10 features, got 12");
    }
}
