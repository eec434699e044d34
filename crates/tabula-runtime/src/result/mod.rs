//! Decision table result types
//!
//! These types are created fresh per evaluation and are read-only once the
//! result has been assembled.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tabula_core::Value;

/// Evaluated form of one input or output cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTableValue {
    /// Column key
    pub key: String,

    /// Column label, if declared
    pub name: Option<String>,

    /// Variable the value binds to
    pub output_name: Option<String>,

    /// Evaluated value
    pub value: Value,
}

impl DecisionTableValue {
    /// Create a new value
    pub fn new(
        key: impl Into<String>,
        name: Option<String>,
        output_name: Option<String>,
        value: Value,
    ) -> Self {
        Self {
            key: key.into(),
            name,
            output_name,
            value,
        }
    }

    /// Name the value is exposed under to callers: output name, else key
    pub fn variable_name(&self) -> &str {
        self.output_name.as_deref().unwrap_or(&self.key)
    }
}

/// A rule that survived hit-policy resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTableRule {
    /// Rule key
    pub key: String,

    /// Output values keyed by output column key
    pub outputs: HashMap<String, DecisionTableValue>,
}

impl DecisionTableRule {
    /// Create a rule result without outputs
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            outputs: HashMap::new(),
        }
    }

    /// Output value for a column key
    pub fn output(&self, key: &str) -> Option<&DecisionTableValue> {
        self.outputs.get(key)
    }
}

/// Full outcome of one decision table evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTableResult {
    /// Input values keyed by input column key
    pub inputs: HashMap<String, DecisionTableValue>,

    /// Matching rules in hit-policy order
    pub matching_rules: Vec<DecisionTableRule>,

    /// Name of the aggregated value, COLLECT with aggregation only
    pub collect_result_name: Option<String>,

    /// Aggregated value, COLLECT with aggregation only
    pub collect_result_value: Option<Value>,

    /// Number of decision elements (cells) processed
    pub executed_decision_elements: u64,
}

impl DecisionTableResult {
    /// Input values keyed by input column key
    pub fn inputs(&self) -> &HashMap<String, DecisionTableValue> {
        &self.inputs
    }

    /// Matching rules in hit-policy order
    pub fn matching_rules(&self) -> &[DecisionTableRule] {
        &self.matching_rules
    }

    /// Name of the aggregated value
    pub fn collect_result_name(&self) -> Option<&str> {
        self.collect_result_name.as_deref()
    }

    /// Aggregated value
    pub fn collect_result_value(&self) -> Option<&Value> {
        self.collect_result_value.as_ref()
    }

    /// Number of decision elements processed
    pub fn executed_decision_elements(&self) -> u64 {
        self.executed_decision_elements
    }

    /// Keys of the matching rules, in order
    pub fn matching_rule_keys(&self) -> Vec<&str> {
        self.matching_rules.iter().map(|rule| rule.key.as_str()).collect()
    }

    /// Flatten into caller-facing decision outputs
    ///
    /// With an aggregate this is a single entry `{collect_result_name: value}`.
    /// Otherwise each matching rule contributes one map of variable name to
    /// value, in rule order.
    pub fn to_decision_outputs(&self) -> Vec<HashMap<String, Value>> {
        if let (Some(name), Some(value)) = (&self.collect_result_name, &self.collect_result_value)
        {
            let mut entry = HashMap::new();
            entry.insert(name.clone(), value.clone());
            return vec![entry];
        }

        self.matching_rules
            .iter()
            .map(|rule| {
                rule.outputs
                    .values()
                    .map(|output| (output.variable_name().to_string(), output.value.clone()))
                    .collect()
            })
            .collect()
    }

    /// The single output value when exactly one rule with one output matched
    pub fn singleton_output(&self) -> Option<&Value> {
        match self.matching_rules.as_slice() {
            [rule] if rule.outputs.len() == 1 => rule.outputs.values().next().map(|o| &o.value),
            _ => None,
        }
    }
}
