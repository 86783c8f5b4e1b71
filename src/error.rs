//! Error types for labgauge

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LabGaugeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid reference range: low {low} is above high {high}")]
    InvalidRange { low: f64, high: f64 },

    #[error("Reference range bounds must be finite")]
    NonFiniteRange,

    #[error("Unknown time window: {0} (expected 1d, 7d, 14d, 30d or 90d)")]
    UnknownWindow(String),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Usage error: {0}")]
    Usage(String),
}
