//! Rule matching
//!
//! Input expressions are evaluated once per evaluation. Each rule's input
//! entries are then tested against those values, with the column's value bound
//! under its input variable name.

use crate::error::{EvaluationError, Result};
use crate::expression::{ExpressionEvaluator, ScopedContext, VariableContext};
use crate::result::DecisionTableValue;
use tabula_core::{DecisionTable, Expression, Input, Rule, Value};

/// Evaluate every input column of the table, in declaration order
pub(crate) fn evaluate_inputs(
    table: &DecisionTable,
    evaluator: &dyn ExpressionEvaluator,
    context: &dyn VariableContext,
    default_input_variable: &str,
) -> Result<Vec<DecisionTableValue>> {
    table
        .inputs
        .iter()
        .map(|input| -> Result<DecisionTableValue> {
            let value = match &input.expression {
                Some(expression) => evaluator.evaluate(expression, context).map_err(|source| {
                    EvaluationError::Expression {
                        location: format!("input '{}' of table '{}'", input.key, table.key),
                        source,
                    }
                })?,
                None => Value::Null,
            };

            Ok(DecisionTableValue::new(
                input.key.clone(),
                input.name.clone(),
                Some(input_variable(input, default_input_variable).to_string()),
                value,
            ))
        })
        .collect()
}

/// Test one rule against the evaluated inputs
///
/// Every entry of the row is evaluated even after a column fails to match, so
/// the work done per rule depends only on the table shape.
pub(crate) fn match_rule(
    table: &DecisionTable,
    rule: &Rule,
    inputs: &[DecisionTableValue],
    evaluator: &dyn ExpressionEvaluator,
    context: &dyn VariableContext,
) -> Result<bool> {
    let mut matched = true;

    for ((input, entry), input_value) in table
        .inputs
        .iter()
        .zip(&rule.input_entries)
        .zip(inputs)
    {
        let Some(entry) = entry else {
            // Wildcard
            continue;
        };

        if !match_entry(rule, input, entry, input_value, evaluator, context)? {
            matched = false;
        }
    }

    Ok(matched)
}

fn match_entry(
    rule: &Rule,
    input: &Input,
    entry: &Expression,
    input_value: &DecisionTableValue,
    evaluator: &dyn ExpressionEvaluator,
    context: &dyn VariableContext,
) -> Result<bool> {
    let variable = input_value.output_name.as_deref().unwrap_or(&input.key);
    let scoped = ScopedContext::new(context, variable, &input_value.value);

    let outcome = evaluator
        .evaluate(entry, &scoped)
        .map_err(|source| EvaluationError::Expression {
            location: format!("rule '{}', input '{}'", rule.key, input.key),
            source,
        })?;

    match outcome {
        Value::Bool(matched) => Ok(matched),
        Value::Null => Ok(false),
        other => Err(EvaluationError::NonBooleanEntry {
            rule: rule.key.clone(),
            input: input.key.clone(),
            actual: format!("{} ({})", other, other.type_name()),
        }),
    }
}

fn input_variable<'a>(input: &'a Input, default: &'a str) -> &'a str {
    input.input_variable.as_deref().unwrap_or(default)
}
