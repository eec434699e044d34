//! Tabula Runtime - Evaluation engine for decision tables
//!
//! This crate matches rules against input bindings, resolves the table's hit
//! policy, aggregates COLLECT results and hands the assembled result to the
//! registered listeners.

pub mod error;
pub mod expression;
pub mod listener;
pub mod observability;
pub mod result;
pub mod table;

// Re-export main types
pub use error::{EvaluationError, Result};
pub use expression::{
    ExpressionError, ExpressionEvaluator, MapContext, ScopedContext, SimpleExpressionEvaluator,
    VariableContext,
};
pub use listener::{DecisionTableListener, ListenerChain};
pub use observability::{Counter, Histogram, Metrics, MetricsCollector, MetricsListener};
pub use result::{DecisionTableResult, DecisionTableRule, DecisionTableValue};
pub use table::DecisionTableEvaluator;
