//! Hit policies and built-in aggregators

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How matching rules contribute to the result of a decision table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HitPolicy {
    /// At most one rule may match
    #[default]
    Unique,
    /// The first matching rule in declaration order wins
    First,
    /// The matching rule with the highest output priority wins
    Priority,
    /// Several rules may match if they agree on every output
    Any,
    /// All matching rules in declaration order
    RuleOrder,
    /// All matching rules sorted by output priority
    OutputOrder,
    /// All matching rules, optionally reduced by an aggregator
    Collect,
}

impl HitPolicy {
    /// Whether evaluation may stop before every rule has been visited
    pub fn stops_early(&self) -> bool {
        matches!(self, HitPolicy::First)
    }

    /// Whether the policy orders or picks rules by output priority
    pub fn uses_output_priority(&self) -> bool {
        matches!(self, HitPolicy::Priority | HitPolicy::OutputOrder)
    }
}

impl fmt::Display for HitPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HitPolicy::Unique => "UNIQUE",
            HitPolicy::First => "FIRST",
            HitPolicy::Priority => "PRIORITY",
            HitPolicy::Any => "ANY",
            HitPolicy::RuleOrder => "RULE ORDER",
            HitPolicy::OutputOrder => "OUTPUT ORDER",
            HitPolicy::Collect => "COLLECT",
        };
        f.write_str(name)
    }
}

impl FromStr for HitPolicy {
    type Err = CoreError;

    /// Accepts the DMN spelling (`RULE ORDER`) as well as `rule_order`
    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_uppercase().replace(['_', '-'], " ");
        match normalized.as_str() {
            "UNIQUE" => Ok(HitPolicy::Unique),
            "FIRST" => Ok(HitPolicy::First),
            "PRIORITY" => Ok(HitPolicy::Priority),
            "ANY" => Ok(HitPolicy::Any),
            "RULE ORDER" => Ok(HitPolicy::RuleOrder),
            "OUTPUT ORDER" => Ok(HitPolicy::OutputOrder),
            "COLLECT" => Ok(HitPolicy::Collect),
            _ => Err(CoreError::InvalidValue(format!("unknown hit policy '{}'", s))),
        }
    }
}

/// Reduction applied to the collected values of a COLLECT table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BuiltinAggregator {
    Count,
    Sum,
    Min,
    Max,
}

impl fmt::Display for BuiltinAggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BuiltinAggregator::Count => "COUNT",
            BuiltinAggregator::Sum => "SUM",
            BuiltinAggregator::Min => "MIN",
            BuiltinAggregator::Max => "MAX",
        };
        f.write_str(name)
    }
}

impl FromStr for BuiltinAggregator {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "COUNT" => Ok(BuiltinAggregator::Count),
            "SUM" => Ok(BuiltinAggregator::Sum),
            "MIN" => Ok(BuiltinAggregator::Min),
            "MAX" => Ok(BuiltinAggregator::Max),
            _ => Err(CoreError::InvalidValue(format!("unknown aggregator '{}'", s))),
        }
    }
}

/// Aggregator bound to the output column it reduces
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aggregation {
    /// Reduction to apply
    pub aggregator: BuiltinAggregator,

    /// Key of the aggregated output column
    pub output: String,
}

impl Aggregation {
    /// Create a new aggregation over the given output column
    pub fn new(aggregator: BuiltinAggregator, output: impl Into<String>) -> Self {
        Self {
            aggregator,
            output: output.into(),
        }
    }
}
