//! Expression error types

use thiserror::Error;

/// Failure to produce a value from an expression
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExpressionError {
    /// Malformed expression text
    #[error("Parse error at offset {offset} in '{expression}': {message}")]
    Parse {
        expression: String,
        offset: usize,
        message: String,
    },

    /// Variable not present in the bindings
    #[error("Unknown variable: {0}")]
    UnknownVariable(String),

    /// Operator applied to unsupported operand types
    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    /// Division by zero
    #[error("Division by zero")]
    DivisionByZero,

    /// Integer overflow
    #[error("Integer overflow: {0}")]
    Overflow(String),

    /// The evaluator does not implement the requested language
    #[error("Unsupported expression language: {0}")]
    UnsupportedLanguage(String),
}
