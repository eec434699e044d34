//! SDK error types

use tabula_core::CoreError;
use tabula_runtime::EvaluationError;
use thiserror::Error;

/// SDK error type
#[derive(Error, Debug)]
pub enum SdkError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Evaluation error
    #[error("Evaluation error: {0}")]
    EvaluationError(#[from] EvaluationError),

    /// Table model error
    #[error("Table error: {0}")]
    CoreError(#[from] CoreError),

    /// YAML error
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Invalid table file
    #[error("Invalid table file: {0}")]
    InvalidTableFile(String),

    /// Variables that cannot be bound
    #[error("Invalid variables: {0}")]
    InvalidVariables(String),
}

impl SdkError {
    /// Whether the evaluation succeeded and only a listener failed
    pub fn is_listener_failure(&self) -> bool {
        matches!(self, SdkError::EvaluationError(error) if error.is_listener_failure())
    }
}

/// Result type for SDK operations
pub type Result<T> = std::result::Result<T, SdkError>;
