//! Error types for Tabula Core

use thiserror::Error;

/// Core error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Type error: {0}")]
    TypeError(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Invalid table '{table}': {message}")]
    InvalidTable { table: String, message: String },
}

pub type Result<T> = std::result::Result<T, CoreError>;
