//! Decision table definitions
//!
//! A decision table is an ordered list of rules over declared input and output
//! columns. It is immutable once loaded and shared by reference across
//! concurrent evaluations.

use super::expression::Expression;
use super::hit_policy::{Aggregation, HitPolicy};
use crate::error::{CoreError, Result};
use crate::types::Value;
use serde::{Deserialize, Serialize};

/// Decision table definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTable {
    /// Unique table key
    pub key: String,

    /// Optional human-readable name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Hit policy
    #[serde(default)]
    pub hit_policy: HitPolicy,

    /// Aggregation, only honored by the COLLECT hit policy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregation: Option<Aggregation>,

    /// Input columns in declaration order
    #[serde(default)]
    pub inputs: Vec<Input>,

    /// Output columns in declaration order
    #[serde(default)]
    pub outputs: Vec<Output>,

    /// Rules in declaration order
    #[serde(default)]
    pub rules: Vec<Rule>,
}

/// Input column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Input {
    /// Stable column key
    pub key: String,

    /// Optional label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Input expression, evaluated once per evaluation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<Expression>,

    /// Name the input value is bound to while this column's entries are evaluated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_variable: Option<String>,
}

/// Output column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Output {
    /// Stable column key
    pub key: String,

    /// Optional label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Output variable the value binds to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_name: Option<String>,

    /// Allowed values in descending priority
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub output_values: Vec<Value>,
}

/// A single rule (row) of a decision table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// Stable rule key
    pub key: String,

    /// One entry per input column, `None` is a wildcard
    #[serde(default)]
    pub input_entries: Vec<Option<Expression>>,

    /// One entry per output column, `None` leaves the output unset
    #[serde(default)]
    pub output_entries: Vec<Option<Expression>>,
}

impl DecisionTable {
    /// Create an empty table with the given key
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            name: None,
            hit_policy: HitPolicy::default(),
            aggregation: None,
            inputs: Vec::new(),
            outputs: Vec::new(),
            rules: Vec::new(),
        }
    }

    /// Set the name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the hit policy
    pub fn with_hit_policy(mut self, hit_policy: HitPolicy) -> Self {
        self.hit_policy = hit_policy;
        self
    }

    /// Set the aggregation
    pub fn with_aggregation(mut self, aggregation: Aggregation) -> Self {
        self.aggregation = Some(aggregation);
        self
    }

    /// Add an input column
    pub fn add_input(mut self, input: Input) -> Self {
        self.inputs.push(input);
        self
    }

    /// Add an output column
    pub fn add_output(mut self, output: Output) -> Self {
        self.outputs.push(output);
        self
    }

    /// Add a rule
    pub fn add_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Replace the hit policy in place
    pub fn set_hit_policy(&mut self, hit_policy: HitPolicy) {
        self.hit_policy = hit_policy;
    }

    /// Replace the aggregation in place
    pub fn set_aggregation(&mut self, aggregation: Option<Aggregation>) {
        self.aggregation = aggregation;
    }

    /// Aggregation in effect, `None` unless the hit policy is COLLECT
    pub fn effective_aggregation(&self) -> Option<&Aggregation> {
        match (self.hit_policy, &self.aggregation) {
            (HitPolicy::Collect, Some(aggregation)) => Some(aggregation),
            (_, Some(aggregation)) => {
                log::debug!(
                    "Aggregation {} on table '{}' ignored under hit policy {}",
                    aggregation.aggregator,
                    self.key,
                    self.hit_policy
                );
                None
            }
            (_, None) => None,
        }
    }

    /// Look up an output column by key
    pub fn output(&self, key: &str) -> Option<&Output> {
        self.outputs.iter().find(|output| output.key == key)
    }

    /// Number of cells in one rule row
    pub fn cells_per_rule(&self) -> usize {
        self.inputs.len() + self.outputs.len()
    }

    /// Check the shape invariants the evaluator relies on
    pub fn validate(&self) -> Result<()> {
        for rule in &self.rules {
            if rule.input_entries.len() != self.inputs.len() {
                return Err(self.invalid(format!(
                    "rule '{}' has {} input entries, expected {}",
                    rule.key,
                    rule.input_entries.len(),
                    self.inputs.len()
                )));
            }
            if rule.output_entries.len() != self.outputs.len() {
                return Err(self.invalid(format!(
                    "rule '{}' has {} output entries, expected {}",
                    rule.key,
                    rule.output_entries.len(),
                    self.outputs.len()
                )));
            }
        }

        if let Some(aggregation) = &self.aggregation {
            if self.output(&aggregation.output).is_none() {
                return Err(self.invalid(format!(
                    "aggregation refers to unknown output '{}'",
                    aggregation.output
                )));
            }
        }

        Ok(())
    }

    fn invalid(&self, message: String) -> CoreError {
        CoreError::InvalidTable {
            table: self.key.clone(),
            message,
        }
    }
}

impl Input {
    /// Create an input column without an input expression
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            name: None,
            expression: None,
            input_variable: None,
        }
    }

    /// Set the label
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the input expression
    pub fn with_expression(mut self, expression: impl Into<Expression>) -> Self {
        self.expression = Some(expression.into());
        self
    }

    /// Set the input variable name
    pub fn with_input_variable(mut self, input_variable: impl Into<String>) -> Self {
        self.input_variable = Some(input_variable.into());
        self
    }
}

impl Output {
    /// Create an output column
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            name: None,
            output_name: None,
            output_values: Vec::new(),
        }
    }

    /// Set the label
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the output variable name
    pub fn with_output_name(mut self, output_name: impl Into<String>) -> Self {
        self.output_name = Some(output_name.into());
        self
    }

    /// Set the allowed values, highest priority first
    pub fn with_output_values(mut self, output_values: Vec<Value>) -> Self {
        self.output_values = output_values;
        self
    }

    /// Priority rank of a value, lower is higher priority
    ///
    /// Values missing from the list rank after every listed value.
    pub fn priority_rank(&self, value: &Value) -> usize {
        self.output_values
            .iter()
            .position(|candidate| candidate == value)
            .unwrap_or(self.output_values.len())
    }
}

impl Rule {
    /// Create a rule without entries
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            input_entries: Vec::new(),
            output_entries: Vec::new(),
        }
    }

    /// Append an input entry, `None` for a wildcard
    pub fn with_input_entry(mut self, entry: Option<&str>) -> Self {
        self.input_entries.push(entry.map(Expression::from));
        self
    }

    /// Append an output entry, `None` to leave the output unset
    pub fn with_output_entry(mut self, entry: Option<&str>) -> Self {
        self.output_entries.push(entry.map(Expression::from));
        self
    }

    /// Replace all input entries
    pub fn with_input_entries(mut self, entries: Vec<Option<Expression>>) -> Self {
        self.input_entries = entries;
        self
    }

    /// Replace all output entries
    pub fn with_output_entries(mut self, entries: Vec<Option<Expression>>) -> Self {
        self.output_entries = entries;
        self
    }
}
