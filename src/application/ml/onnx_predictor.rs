use super::predictor::PriceModel;
use crate::domain::errors::{ForecastError, Result};
use crate::domain::ml::{FEATURE_COUNT, FeatureVector};
use ort::session::Session;
use std::path::Path;
use std::sync::Mutex;
use tracing::info;

/// Price regressor exported to ONNX, fed a `(1, 12)` float tensor.
pub struct OnnxPredictor {
    // run() needs &mut Session
    session: Mutex<Session>,
}

impl OnnxPredictor {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ForecastError::ArtifactNotFound {
                path: path.to_path_buf(),
            });
        }

        let session = Session::builder()
            .and_then(|builder| builder.commit_from_file(path))
            .map_err(|e| ForecastError::corrupt(path, format!("Failed to load ONNX model: {}", e)))?;

        info!("Successfully loaded ONNX model from {:?}", path);
        Ok(Self {
            session: Mutex::new(session),
        })
    }

    fn fail(&self, reason: impl ToString) -> ForecastError {
        ForecastError::inference(self.name(), reason.to_string())
    }
}

impl PriceModel for OnnxPredictor {
    fn predict(&self, features: &FeatureVector) -> Result<f64> {
        let mut session = self
            .session
            .lock()
            .map_err(|e| self.fail(format!("Mutex lock failed: {}", e)))?;

        let shape = vec![1, FEATURE_COUNT];
        let input_value = ort::value::Value::from_array((shape.as_slice(), features.to_f32_vec()))
            .map_err(|e| self.fail(format!("Input value creation failed: {}", e)))?;

        let outputs = session
            .run(ort::inputs![input_value])
            .map_err(|e| self.fail(e))?;

        let output_value = outputs
            .iter()
            .next()
            .map(|(_, v)| v)
            .ok_or_else(|| self.fail("No output found"))?;
        let data = output_value
            .try_extract_tensor::<f32>()
            .map_err(|e| self.fail(e))?;
        let price = *data.1.iter().next().ok_or_else(|| self.fail("Empty output"))? as f64;

        Ok(price)
    }

    fn num_features(&self) -> Option<usize> {
        Some(FEATURE_COUNT)
    }

    fn name(&self) -> &str {
        "ONNX Runtime"
    }

    fn version(&self) -> &str {
        "v1.0"
    }
}
