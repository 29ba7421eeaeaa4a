use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong while turning a file into an
/// [`AirQualityDataset`](super::model::AirQualityDataset).
#[derive(Error, Debug)]
pub enum DataLoadError {
    #[error("Dataset file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parquet read error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Unsupported file extension: .{0}")]
    UnsupportedExtension(String),

    #[error("Expected at least {expected} columns, found {found}")]
    InsufficientColumns { expected: usize, found: usize },

    #[error("Missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("Row {row}: cannot parse timestamp '{value}'")]
    Timestamp { row: usize, value: String },

    #[error("Row {row}: expected {expected} fields, found {found}")]
    RowLength {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// A single dashboard view could not be computed. Other views are unaffected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ViewError {
    #[error("Unknown pollutant column '{0}'")]
    UnknownPollutant(String),
}
