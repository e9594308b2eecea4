//! Error types for the simulation harness.

use bubble_core::ConfigError;
use thiserror::Error;

/// Errors that can abort a run or its exports.
#[derive(Debug, Error)]
pub enum SimError {
    /// Configuration rejected before stepping began
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// File could not be opened or written
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Metrics CSV could not be written
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON config, ledger or export could not be (de)serialized
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// No scenario preset with this name
    #[error("Unknown scenario: {0}")]
    UnknownScenario(String),
}
