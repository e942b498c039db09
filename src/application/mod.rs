// Model capability and concrete model formats
pub mod ml;

// Model input assembly from conditions + history
pub mod feature_assembler;

// Serving context (model + history)
pub mod forecast_service;

pub use feature_assembler::{FeatureAssembler, LagFeatures};
pub use forecast_service::ForecastContext;
