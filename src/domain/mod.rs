// Historical price data
pub mod market;

// Feature layout shared with model artifacts
pub mod ml;

// User-facing forecast inputs and outputs
pub mod forecast;

// Accuracy of stored predictions
pub mod performance;

// Domain-specific error types
pub mod errors;
