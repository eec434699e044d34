//! Output composition
//!
//! Builds the per-rule output mapping for matching rules and assembles the
//! final [`DecisionTableResult`].

use crate::error::{EvaluationError, Result};
use crate::expression::{ExpressionEvaluator, VariableContext};
use crate::result::{DecisionTableResult, DecisionTableRule, DecisionTableValue};
use tabula_core::{DecisionTable, Rule, Value};

/// A matching rule together with its raw output values
///
/// `output_values` holds one slot per output column: `None` when the rule has
/// no entry for the column, otherwise the evaluated value (possibly null).
/// Hit policy resolution and aggregation work on these slots, while `rule`
/// carries the caller-facing mapping.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MatchedRule {
    pub index: usize,
    pub rule: DecisionTableRule,
    pub output_values: Vec<Option<Value>>,
}

impl MatchedRule {
    pub fn key(&self) -> &str {
        &self.rule.key
    }

    /// Value of an output column, by column position
    pub fn output_value(&self, column: usize) -> Option<&Value> {
        self.output_values.get(column).and_then(Option::as_ref)
    }
}

/// Evaluate the output entries of a matching rule
///
/// Entries without an expression are skipped. An entry that evaluates to null
/// stays in the mapping only when its column declares an output name.
pub(crate) fn compose_rule(
    table: &DecisionTable,
    index: usize,
    rule: &Rule,
    evaluator: &dyn ExpressionEvaluator,
    context: &dyn VariableContext,
) -> Result<MatchedRule> {
    let mut result = DecisionTableRule::new(rule.key.clone());
    let mut output_values = Vec::with_capacity(table.outputs.len());

    for (output, entry) in table.outputs.iter().zip(&rule.output_entries) {
        let Some(entry) = entry else {
            output_values.push(None);
            continue;
        };

        let value = evaluator
            .evaluate(entry, context)
            .map_err(|source| EvaluationError::Expression {
                location: format!("rule '{}', output '{}'", rule.key, output.key),
                source,
            })?;

        if !value.is_null() || output.output_name.is_some() {
            result.outputs.insert(
                output.key.clone(),
                DecisionTableValue::new(
                    output.key.clone(),
                    output.name.clone(),
                    output.output_name.clone(),
                    value.clone(),
                ),
            );
        }
        output_values.push(Some(value));
    }

    Ok(MatchedRule {
        index,
        rule: result,
        output_values,
    })
}

/// Collected aggregate: result name and reduced value
pub(crate) struct CollectResult {
    pub name: String,
    pub value: Option<Value>,
}

/// Assemble the final result from the evaluated pieces
pub(crate) fn assemble(
    inputs: Vec<DecisionTableValue>,
    selected: Vec<MatchedRule>,
    collect: Option<CollectResult>,
    executed_decision_elements: u64,
) -> DecisionTableResult {
    let (collect_result_name, collect_result_value) = match collect {
        Some(collect) => (Some(collect.name), collect.value),
        None => (None, None),
    };

    DecisionTableResult {
        inputs: inputs
            .into_iter()
            .map(|input| (input.key.clone(), input))
            .collect(),
        matching_rules: selected.into_iter().map(|matched| matched.rule).collect(),
        collect_result_name,
        collect_result_value,
        executed_decision_elements,
    }
}
