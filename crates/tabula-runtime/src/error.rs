//! Evaluation error types

use crate::expression::ExpressionError;
use tabula_core::{CoreError, HitPolicy};
use thiserror::Error;

/// Evaluation error
///
/// Every variant aborts the evaluation as a whole; no partial result is returned.
#[derive(Error, Debug)]
pub enum EvaluationError {
    /// A cell or input expression could not be evaluated
    #[error("Expression error in {location}: {source}")]
    Expression {
        location: String,
        #[source]
        source: ExpressionError,
    },

    /// An input entry produced something other than a boolean
    #[error("Input entry of rule '{rule}' for input '{input}' returned {actual}, expected a boolean")]
    NonBooleanEntry {
        rule: String,
        input: String,
        actual: String,
    },

    /// UNIQUE matched several rules, or ANY matched rules that disagree
    #[error("Ambiguous result under hit policy {hit_policy}: {reason} (rules: {})", .rules.join(", "))]
    AmbiguousResult {
        hit_policy: HitPolicy,
        rules: Vec<String>,
        reason: String,
    },

    /// SUM/MIN/MAX over values that cannot be reduced
    #[error("Aggregation type error: {0}")]
    AggregationType(String),

    /// The table violates a shape invariant
    #[error("Invalid table: {0}")]
    InvalidTable(#[from] CoreError),

    /// A listener failed after the result was assembled
    #[error("Listener #{index} failed: {source}")]
    Listener {
        index: usize,
        #[source]
        source: anyhow::Error,
    },
}

impl EvaluationError {
    /// Whether the evaluation itself succeeded and only observation failed
    pub fn is_listener_failure(&self) -> bool {
        matches!(self, EvaluationError::Listener { .. })
    }

    /// Short snake_case name of the error kind, used as a metric label
    pub fn kind(&self) -> &'static str {
        match self {
            EvaluationError::Expression { .. } => "expression",
            EvaluationError::NonBooleanEntry { .. } => "non_boolean_entry",
            EvaluationError::AmbiguousResult { .. } => "ambiguous_result",
            EvaluationError::AggregationType(_) => "aggregation_type",
            EvaluationError::InvalidTable(_) => "invalid_table",
            EvaluationError::Listener { .. } => "listener",
        }
    }
}

/// Result type for evaluation
pub type Result<T> = std::result::Result<T, EvaluationError>;
