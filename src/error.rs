//! Error types for the demand_forecast crate

use std::path::PathBuf;

use polars::prelude::PolarsError;
use thiserror::Error;

/// Custom error types for the demand_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Malformed records, out-of-order dates, or missing columns
    #[error("Data format error: {0}")]
    DataFormat(String),

    /// Too little history for the requested features or split
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Prediction requested before a model was trained or loaded
    #[error("No model has been trained or loaded")]
    ModelNotTrained,

    /// No model artifact at the given path
    #[error("Model artifact not found at '{}'", .0.display())]
    ModelNotFound(PathBuf),

    /// Actual and predicted series disagree in length, or both are empty
    #[error("Dimension mismatch: {actual} actual vs {predicted} predicted values")]
    DimensionMismatch { actual: usize, predicted: usize },

    /// Error from IO operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error reading or writing CSV records
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    Polars(String),

    /// Error encoding or decoding a model artifact
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<PolarsError> for ForecastError {
    fn from(err: PolarsError) -> Self {
        ForecastError::Polars(err.to_string())
    }
}
