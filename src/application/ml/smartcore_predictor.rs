use super::model_loader::read_artifact;
use super::predictor::PriceModel;
use crate::domain::errors::{ForecastError, Result};
use crate::domain::ml::FeatureVector;
use serde::Deserialize;
use smartcore::ensemble::random_forest_regressor::RandomForestRegressor;
use smartcore::linalg::basic::matrix::DenseMatrix;
use std::path::Path;
use tracing::info;

pub type ForestRegressor = RandomForestRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>;

/// Layout of a serialized forest, checked before smartcore sees the bytes.
/// smartcore accepts an unfitted forest (or any object) and only fails once
/// `predict` walks it.
#[derive(Debug, Deserialize)]
struct ForestDocument {
    forest_regressor: Option<ForestBody>,
}

#[derive(Debug, Deserialize)]
struct ForestBody {
    trees: Option<Vec<TreeBody>>,
}

#[derive(Debug, Deserialize)]
struct TreeBody {
    nodes: Vec<NodeBody>,
}

#[derive(Debug, Deserialize)]
struct NodeBody {
    split_feature: usize,
    true_child: Option<usize>,
    false_child: Option<usize>,
}

impl ForestDocument {
    /// Validates the tree structure and returns the smallest input width the
    /// forest can be evaluated on.
    fn required_features(&self) -> std::result::Result<usize, String> {
        let trees = self
            .forest_regressor
            .as_ref()
            .ok_or("artifact holds an unfitted forest")?
            .trees
            .as_deref()
            .unwrap_or_default();
        if trees.is_empty() {
            return Err("forest has no trees".to_string());
        }

        let mut required = 0;
        for (t, tree) in trees.iter().enumerate() {
            if tree.nodes.is_empty() {
                return Err(format!("tree {} has no nodes", t));
            }
            let n = tree.nodes.len();
            for (i, node) in tree.nodes.iter().enumerate() {
                match (node.true_child, node.false_child) {
                    (None, None) => {}
                    (Some(yes), Some(no)) => {
                        if yes <= i || no <= i || yes >= n || no >= n {
                            return Err(format!(
                                "tree {} node {}: invalid children {}/{}",
                                t, i, yes, no
                            ));
                        }
                        required = required.max(node.split_feature + 1);
                    }
                    _ => {
                        return Err(format!("tree {} node {}: split with a single child", t, i));
                    }
                }
            }
        }
        Ok(required)
    }
}

pub struct SmartCorePredictor {
    model: ForestRegressor,
    required_features: usize,
}

impl SmartCorePredictor {
    /// Wraps a forest fitted in-process on `required_features` columns.
    pub fn new(model: ForestRegressor, required_features: usize) -> Self {
        Self {
            model,
            required_features,
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let buffer = read_artifact(path)?;

        let document: ForestDocument = serde_json::from_slice(&buffer).map_err(|e| {
            ForecastError::corrupt(path, format!("failed to deserialize forest: {}", e))
        })?;
        let required_features = document
            .required_features()
            .map_err(|reason| ForecastError::corrupt(path, reason))?;

        // Smartcore deserialization (serde_json)
        let model: ForestRegressor = serde_json::from_slice(&buffer).map_err(|e| {
            ForecastError::corrupt(path, format!("failed to deserialize forest: {}", e))
        })?;

        info!(
            "Successfully loaded SmartCore forest from {:?} (splits on {} columns)",
            path, required_features
        );
        Ok(Self::new(model, required_features))
    }

    /// Highest split column + 1; narrower vectors are rejected.
    pub fn required_features(&self) -> usize {
        self.required_features
    }
}

impl PriceModel for SmartCorePredictor {
    fn predict(&self, features: &FeatureVector) -> Result<f64> {
        if features.len() < self.required_features {
            return Err(ForecastError::inference(
                self.name(),
                format!(
                    "forest splits on {} columns, got {}",
                    self.required_features,
                    features.len()
                ),
            ));
        }

        let input_matrix = DenseMatrix::from_2d_vec(&vec![features.to_vec()])
            .map_err(|e| ForecastError::inference(self.name(), format!("Matrix creation failed: {}", e)))?;

        let predictions = self
            .model
            .predict(&input_matrix)
            .map_err(|e| ForecastError::inference(self.name(), format!("Prediction failed: {}", e)))?;

        predictions
            .first()
            .copied()
            .ok_or_else(|| ForecastError::inference(self.name(), "No prediction returned"))
    }

    fn name(&self) -> &str {
        "SmartCore Random Forest"
    }

    fn version(&self) -> &str {
        "v1.0"
    }
}
