//! Tabula Core - Core types and definitions for the Tabula decision table engine
//!
//! This crate provides the fundamental types used across the Tabula crates:
//! - Value types for runtime data
//! - Decision table model (inputs, outputs, rules, hit policies, aggregators)
//! - Error types

pub mod ast;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use ast::{
    Aggregation, BuiltinAggregator, DecisionTable, Expression, HitPolicy, Input, Output, Rule,
};
pub use error::CoreError;
pub use types::Value;
