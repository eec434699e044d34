//! Decision table model for Tabula
//!
//! This module contains the in-memory definition of a decision table:
//! - Cell expressions
//! - Input and output columns
//! - Rules
//! - Hit policies and aggregators

pub mod expression;
pub mod hit_policy;
pub mod table;

pub use expression::Expression;
pub use hit_policy::{Aggregation, BuiltinAggregator, HitPolicy};
pub use table::{DecisionTable, Input, Output, Rule};
