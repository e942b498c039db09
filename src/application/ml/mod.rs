pub mod model_loader;
#[cfg(feature = "onnx")]
pub mod onnx_predictor;
pub mod predictor;
pub mod smartcore_predictor;
pub mod xgboost_predictor;

pub use model_loader::{ModelFormat, detect_format, load_model, load_model_as};
pub use predictor::PriceModel;
pub use smartcore_predictor::SmartCorePredictor;
pub use xgboost_predictor::XgboostPredictor;
