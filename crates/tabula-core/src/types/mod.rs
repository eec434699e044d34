//! Type system for Tabula
//!
//! Runtime values produced by cell evaluation and consumed by aggregation.

pub mod value;

pub use value::Value;
