//! Tabula Decision Engine SDK
//!
//! High-level API for loading and evaluating decision tables.

pub mod builder;
pub mod config;
pub mod decision_engine;
pub mod error;
pub mod loader;

// Re-export main types
pub use builder::DecisionEngineBuilder;
pub use config::EngineConfig;
pub use decision_engine::{variables_from_json, DecisionEngine};
pub use error::{Result, SdkError};
pub use loader::{load_tables, table_from_yaml, tables_from_yaml};

// Re-export commonly used types from dependencies
pub use tabula_core::{
    Aggregation, BuiltinAggregator, DecisionTable, Expression, HitPolicy, Input, Output, Rule,
    Value,
};
pub use tabula_runtime::{
    DecisionTableListener, DecisionTableResult, DecisionTableRule, DecisionTableValue,
    ExpressionError, ExpressionEvaluator, MapContext, Metrics, MetricsCollector, VariableContext,
};
