//! Native evaluator for XGBoost gradient-boosted tree models.
//!
//! Reads the JSON document written by `Booster.save_model("model.json")` and
//! walks the trees directly, so the trained regressor can be served without
//! the XGBoost runtime. Only single-target `gbtree` regressors with numerical
//! splits are supported; anything else is rejected at load time.

use super::model_loader::read_artifact;
use super::predictor::PriceModel;
use crate::domain::errors::{ForecastError, Result};
use crate::domain::ml::FeatureVector;
use serde::Deserialize;
use std::path::Path;
use tracing::info;

const LEAF: i64 = -1;

#[derive(Debug, Deserialize)]
struct ModelDocument {
    learner: LearnerDocument,
    #[serde(default)]
    version: Vec<u32>,
}

#[derive(Debug, Deserialize)]
struct LearnerDocument {
    gradient_booster: BoosterDocument,
    learner_model_param: LearnerModelParam,
    objective: ObjectiveDocument,
}

#[derive(Debug, Deserialize)]
struct BoosterDocument {
    name: String,
    #[serde(default)]
    model: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct TreeModelDocument {
    trees: Vec<TreeDocument>,
}

// XGBoost stores every parameter as a string
#[derive(Debug, Deserialize)]
struct LearnerModelParam {
    base_score: String,
    num_feature: String,
    #[serde(default)]
    num_class: Option<String>,
    #[serde(default)]
    num_target: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ObjectiveDocument {
    name: String,
}

#[derive(Debug, Deserialize)]
struct TreeDocument {
    left_children: Vec<i64>,
    right_children: Vec<i64>,
    split_indices: Vec<i64>,
    split_conditions: Vec<f64>,
    #[serde(default)]
    default_left: Vec<Flag>,
    #[serde(default)]
    split_type: Vec<i64>,
}

/// Older releases write flags as 0/1, newer ones as booleans.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Int(i64),
}

impl Flag {
    fn is_set(self) -> bool {
        match self {
            Flag::Bool(b) => b,
            Flag::Int(i) => i != 0,
        }
    }
}

/// Inverse link applied to the summed margin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Link {
    Identity,
    Log,
}

impl Link {
    fn for_objective(name: &str) -> Option<Self> {
        match name {
            "reg:squarederror" | "reg:linear" | "reg:squaredlogerror"
            | "reg:pseudohubererror" | "reg:absoluteerror" | "reg:quantileerror" => {
                Some(Link::Identity)
            }
            "reg:gamma" | "reg:tweedie" | "count:poisson" => Some(Link::Log),
            _ => None,
        }
    }

    fn margin(self, base_score: f32) -> f32 {
        match self {
            Link::Identity => base_score,
            Link::Log => base_score.ln(),
        }
    }

    fn apply(self, margin: f32) -> f32 {
        match self {
            Link::Identity => margin,
            Link::Log => margin.exp(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum TreeNode {
    Split {
        feature: usize,
        threshold: f32,
        left: usize,
        right: usize,
        default_left: bool,
    },
    Leaf {
        value: f32,
    },
}

#[derive(Debug, Clone)]
struct RegressionTree {
    nodes: Vec<TreeNode>,
}

impl RegressionTree {
    fn from_document(doc: TreeDocument, num_feature: usize) -> std::result::Result<Self, String> {
        let n = doc.left_children.len();
        if n == 0 {
            return Err("tree has no nodes".to_string());
        }
        if doc.right_children.len() != n
            || doc.split_indices.len() != n
            || doc.split_conditions.len() != n
        {
            return Err(format!(
                "tree arrays disagree on node count (left={}, right={}, indices={}, conditions={})",
                n,
                doc.right_children.len(),
                doc.split_indices.len(),
                doc.split_conditions.len()
            ));
        }
        if !doc.default_left.is_empty() && doc.default_left.len() != n {
            return Err(format!(
                "default_left has {} entries for {} nodes",
                doc.default_left.len(),
                n
            ));
        }
        if doc.split_type.iter().any(|t| *t != 0) {
            return Err("categorical splits are not supported".to_string());
        }

        let mut nodes = Vec::with_capacity(n);
        for i in 0..n {
            let left = doc.left_children[i];
            let right = doc.right_children[i];

            if left == LEAF {
                nodes.push(TreeNode::Leaf {
                    value: doc.split_conditions[i] as f32,
                });
                continue;
            }

            // Children always follow their parent, which also rules out cycles
            let child = |c: i64| -> std::result::Result<usize, String> {
                if c <= i as i64 || c >= n as i64 {
                    Err(format!("node {} has invalid child index {}", i, c))
                } else {
                    Ok(c as usize)
                }
            };
            let left = child(left)?;
            let right = child(right)?;

            let feature = doc.split_indices[i];
            if feature < 0 || feature as usize >= num_feature {
                return Err(format!(
                    "node {} splits on feature {} but the model has {} features",
                    i, feature, num_feature
                ));
            }

            nodes.push(TreeNode::Split {
                feature: feature as usize,
                threshold: doc.split_conditions[i] as f32,
                left,
                right,
                default_left: doc.default_left.get(i).is_some_and(|f| f.is_set()),
            });
        }

        Ok(Self { nodes })
    }

    fn leaf_value(&self, x: &[f64]) -> f32 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                TreeNode::Leaf { value } => return *value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    default_left,
                } => {
                    let fvalue = x[*feature];
                    // XGBoost compares in single precision
                    idx = if fvalue.is_nan() {
                        if *default_left { *left } else { *right }
                    } else if (fvalue as f32) < *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }
}

pub struct XgboostPredictor {
    trees: Vec<RegressionTree>,
    base_margin: f32,
    link: Link,
    num_feature: usize,
    objective: String,
    version: String,
}

impl XgboostPredictor {
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = read_artifact(path)?;
        let predictor =
            Self::from_slice(&bytes).map_err(|reason| ForecastError::corrupt(path, reason))?;

        info!(
            "Loaded XGBoost model from {:?} ({} trees, {} features, objective {})",
            path,
            predictor.trees.len(),
            predictor.num_feature,
            predictor.objective
        );
        Ok(predictor)
    }

    /// Parses an in-memory model document.
    pub fn from_slice(bytes: &[u8]) -> std::result::Result<Self, String> {
        let doc: ModelDocument =
            serde_json::from_slice(bytes).map_err(|e| format!("invalid model JSON: {}", e))?;
        let learner = doc.learner;

        if learner.gradient_booster.name != "gbtree" {
            return Err(format!(
                "unsupported booster '{}', expected 'gbtree'",
                learner.gradient_booster.name
            ));
        }

        let objective = learner.objective.name;
        let link = Link::for_objective(&objective)
            .ok_or_else(|| format!("unsupported objective '{}'", objective))?;

        let params = learner.learner_model_param;
        let num_feature = params
            .num_feature
            .trim()
            .parse::<usize>()
            .map_err(|e| format!("invalid num_feature '{}': {}", params.num_feature, e))?;
        for (label, value) in [("num_class", &params.num_class), ("num_target", &params.num_target)] {
            if let Some(v) = value {
                let count = v.trim().parse::<u32>().unwrap_or(0);
                if count > 1 {
                    return Err(format!("multi-output models are not supported ({}={})", label, v));
                }
            }
        }
        let base_score = parse_base_score(&params.base_score)?;
        if link == Link::Log && base_score <= 0.0 {
            return Err(format!(
                "base_score {} is invalid for objective '{}'",
                base_score, objective
            ));
        }

        let tree_model: TreeModelDocument = serde_json::from_value(learner.gradient_booster.model)
            .map_err(|e| format!("invalid tree model: {}", e))?;
        let trees = tree_model
            .trees
            .into_iter()
            .enumerate()
            .map(|(i, t)| {
                RegressionTree::from_document(t, num_feature).map_err(|e| format!("tree {}: {}", i, e))
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let version = if doc.version.is_empty() {
            "unknown".to_string()
        } else {
            doc.version
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(".")
        };

        Ok(Self {
            trees,
            base_margin: link.margin(base_score as f32),
            link,
            num_feature,
            objective,
            version,
        })
    }

    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn objective(&self) -> &str {
        &self.objective
    }
}

/// `base_score` is `"5E-1"` in 1.x and `"[5E-1]"` from 2.1 on.
fn parse_base_score(raw: &str) -> std::result::Result<f64, String> {
    let trimmed = raw.trim().trim_start_matches('[').trim_end_matches(']');
    let first = trimmed.split(',').next().unwrap_or_default().trim();
    first
        .parse::<f64>()
        .map_err(|e| format!("invalid base_score '{}': {}", raw, e))
}

impl PriceModel for XgboostPredictor {
    fn predict(&self, features: &FeatureVector) -> Result<f64> {
        let x = features.as_slice();
        if x.len() != self.num_feature {
            return Err(ForecastError::inference(
                self.name(),
                format!(
                    "model expects {} features, got {}",
                    self.num_feature,
                    x.len()
                ),
            ));
        }

        // Single-precision accumulation in tree order, as XGBoost does
        let margin = self
            .trees
            .iter()
            .fold(self.base_margin, |acc, t| acc + t.leaf_value(x));
        let price = f64::from(self.link.apply(margin));
        if !price.is_finite() {
            return Err(ForecastError::inference(
                self.name(),
                format!("non-finite prediction {}", price),
            ));
        }
        Ok(price)
    }

    fn num_features(&self) -> Option<usize> {
        Some(self.num_feature)
    }

    fn name(&self) -> &str {
        "XGBoost Gradient Boosted Trees"
    }

    fn version(&self) -> &str {
        &self.version
    }
}
