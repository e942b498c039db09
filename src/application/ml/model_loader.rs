use super::predictor::PriceModel;
use super::smartcore_predictor::SmartCorePredictor;
use super::xgboost_predictor::XgboostPredictor;
use crate::domain::errors::{ForecastError, Result};
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// Serialized model formats the loader understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFormat {
    /// XGBoost JSON (`Booster.save_model("*.json")`)
    Xgboost,
    /// smartcore random forest serialized with serde_json
    SmartCore,
    /// ONNX graph, requires the `onnx` feature
    Onnx,
}

impl FromStr for ModelFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "xgboost" | "xgb" => Ok(ModelFormat::Xgboost),
            "smartcore" | "random_forest" => Ok(ModelFormat::SmartCore),
            "onnx" => Ok(ModelFormat::Onnx),
            _ => anyhow::bail!(
                "Invalid MODEL_FORMAT: {}. Must be 'xgboost', 'smartcore' or 'onnx'",
                s
            ),
        }
    }
}

impl fmt::Display for ModelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelFormat::Xgboost => write!(f, "xgboost"),
            ModelFormat::SmartCore => write!(f, "smartcore"),
            ModelFormat::Onnx => write!(f, "onnx"),
        }
    }
}

/// Reads a whole artifact, mapping a missing file to `ArtifactNotFound`.
pub(crate) fn read_artifact(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => ForecastError::ArtifactNotFound {
            path: path.to_path_buf(),
        },
        _ => ForecastError::corrupt(path, format!("failed to read artifact: {}", e)),
    })
}

/// Guesses the artifact format from its extension and, for JSON, its layout.
pub fn detect_format(path: &Path) -> Result<ModelFormat> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());
    if extension.as_deref() == Some("onnx") {
        return Ok(ModelFormat::Onnx);
    }

    let bytes = read_artifact(path)?;
    let value: serde_json::Value = serde_json::from_slice(&bytes).map_err(|e| {
        ForecastError::corrupt(path, format!("unrecognised model format: {}", e))
    })?;

    let format = if value.get("learner").is_some() {
        ModelFormat::Xgboost
    } else if value.get("forest_regressor").is_some() {
        ModelFormat::SmartCore
    } else {
        return Err(ForecastError::corrupt(
            path,
            "unrecognised model format: expected an XGBoost `learner` or a smartcore `forest_regressor` document",
        ));
    };
    debug!("Detected {} model format for {:?}", format, path);
    Ok(format)
}

/// Loads a model, detecting its format from the file.
pub fn load_model(path: &Path) -> Result<Box<dyn PriceModel>> {
    if !path.exists() {
        return Err(ForecastError::ArtifactNotFound {
            path: path.to_path_buf(),
        });
    }
    let format = detect_format(path)?;
    load_model_as(path, format)
}

/// Loads a model in a known format.
pub fn load_model_as(path: &Path, format: ModelFormat) -> Result<Box<dyn PriceModel>> {
    match format {
        ModelFormat::Xgboost => Ok(Box::new(XgboostPredictor::load(path)?)),
        ModelFormat::SmartCore => Ok(Box::new(SmartCorePredictor::load(path)?)),
        ModelFormat::Onnx => load_onnx(path),
    }
}

#[cfg(feature = "onnx")]
fn load_onnx(path: &Path) -> Result<Box<dyn PriceModel>> {
    Ok(Box::new(super::onnx_predictor::OnnxPredictor::load(path)?))
}

#[cfg(not(feature = "onnx"))]
fn load_onnx(path: &Path) -> Result<Box<dyn PriceModel>> {
    if !path.exists() {
        return Err(ForecastError::ArtifactNotFound {
            path: path.to_path_buf(),
        });
    }
    tracing::warn!("ONNX model requested but pricecast was built without the 'onnx' feature");
    Err(ForecastError::corrupt(
        path,
        "ONNX support is not compiled in (enable the 'onnx' feature)",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_model_format_parse() {
        assert_eq!("xgboost".parse::<ModelFormat>().unwrap(), ModelFormat::Xgboost);
        assert_eq!("SmartCore".parse::<ModelFormat>().unwrap(), ModelFormat::SmartCore);
        assert_eq!("onnx".parse::<ModelFormat>().unwrap(), ModelFormat::Onnx);
        assert!("pickle".parse::<ModelFormat>().is_err());
    }

    #[test]
    fn test_missing_artifact_is_not_found() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("xgboost_model.json");

        let err = load_model(&path).err().unwrap();
        assert!(matches!(err, ForecastError::ArtifactNotFound { .. }));

        let err = load_model_as(&path, ModelFormat::SmartCore).err().unwrap();
        assert!(matches!(err, ForecastError::ArtifactNotFound { .. }));
    }

    #[test]
    fn test_detect_format() {
        let dir = tempdir().unwrap();

        let xgb = dir.path().join("model.json");
        fs::write(&xgb, r#"{"learner": {}, "version": [2, 0, 3]}"#).unwrap();
        assert_eq!(detect_format(&xgb).unwrap(), ModelFormat::Xgboost);

        let forest = dir.path().join("forest.json");
        fs::write(&forest, r#"{"forest_regressor": {"trees": [], "samples": null}}"#).unwrap();
        assert_eq!(detect_format(&forest).unwrap(), ModelFormat::SmartCore);

        let onnx = dir.path().join("model.onnx");
        assert_eq!(detect_format(&onnx).unwrap(), ModelFormat::Onnx);
    }

    #[test]
    fn test_garbage_artifact_is_corrupt() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("xgboost_model.pkl");
        fs::write(&path, [0x80u8, 0x04, 0x95, 0x00]).unwrap();

        let err = load_model(&path).err().unwrap();
        assert!(matches!(err, ForecastError::ArtifactCorrupt { .. }));
    }

    #[test]
    fn test_unknown_json_layout_is_corrupt() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("model.json");

        for body in ["{}", r#"{"weights": [1, 2, 3]}"#, "[1, 2]"] {
            fs::write(&path, body).unwrap();
            let err = load_model(&path).err().unwrap();
            assert!(matches!(err, ForecastError::ArtifactCorrupt { .. }), "{}", body);
        }
    }

    #[cfg(not(feature = "onnx"))]
    #[test]
    fn test_onnx_without_feature_is_corrupt() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("model.onnx");
        fs::write(&path, b"onnx").unwrap();

        let err = load_model(&path).err().unwrap();
        assert!(matches!(err, ForecastError::ArtifactCorrupt { .. }));
    }
}
