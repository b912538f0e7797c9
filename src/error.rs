//! Error types for rusty-fxchart

use thiserror::Error;

/// Main error type for rusty-fxchart
#[derive(Error, Debug)]
pub enum ChartError {
    /// Transport failure, non-success HTTP status or request timeout
    #[error("Fetch error: {0}")]
    FetchError(String),

    /// Provider payload did not have the expected shape
    #[error("Data format error: {0}")]
    DataFormatError(String),

    #[error("Insufficient data: {points} rate point(s), at least 2 required")]
    InsufficientDataError { points: usize },

    #[error("Invalid baseline rate {baseline}: percentage change is undefined")]
    InvalidBaselineError { baseline: f64 },

    #[error("Unknown timeframe: {0}")]
    UnknownTimeframe(String),

    #[error("Unknown indicator selection: {0}")]
    UnknownIndicator(String),

    #[error("Invalid currency pair: {0}")]
    InvalidPair(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Store error: {0}")]
    StoreError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

impl ChartError {
    /// Message shown to the user in place of the chart.
    ///
    /// Every failure at the fetch/compute boundary collapses into one of these
    /// strings; the detailed error only goes to the log.
    pub fn user_message(&self) -> String {
        match self {
            ChartError::FetchError(_) => {
                "Failed to load chart data. Please try again later.".to_string()
            }
            ChartError::DataFormatError(_) | ChartError::InsufficientDataError { .. } => {
                "This currency pair is not supported or there was an error fetching the data."
                    .to_string()
            }
            ChartError::InvalidBaselineError { .. } => {
                "The rate history for this pair starts at zero, so no trend can be shown."
                    .to_string()
            }
            other => other.to_string(),
        }
    }

    /// True for the four failures of the fetch/compute pipeline
    pub fn is_pipeline_error(&self) -> bool {
        matches!(
            self,
            ChartError::FetchError(_)
                | ChartError::DataFormatError(_)
                | ChartError::InsufficientDataError { .. }
                | ChartError::InvalidBaselineError { .. }
        )
    }
}

/// Result type alias for rusty-fxchart operations
pub type Result<T> = std::result::Result<T, ChartError>;
