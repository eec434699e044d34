//! Decision table evaluator

use super::aggregator::aggregate;
use super::composer::{assemble, compose_rule, CollectResult};
use super::hit_policy::resolve;
use super::matcher::{evaluate_inputs, match_rule};
use crate::error::Result;
use crate::expression::{
    DefaultLanguage, ExpressionEvaluator, SimpleExpressionEvaluator, VariableContext,
};
use crate::listener::ListenerChain;
use crate::result::DecisionTableResult;
use std::fmt;
use std::sync::Arc;
use tabula_core::{DecisionTable, Value};

/// Evaluates decision tables against caller bindings
///
/// The evaluator holds no per-evaluation state; one instance can serve
/// concurrent evaluations of shared tables.
#[derive(Clone)]
pub struct DecisionTableEvaluator {
    evaluator: Arc<dyn ExpressionEvaluator>,
    listeners: ListenerChain,
    input_variable: String,
    default_language: Option<String>,
}

impl DecisionTableEvaluator {
    /// Name an input column's value is bound to unless the column overrides it
    pub const DEFAULT_INPUT_VARIABLE: &'static str = "cellInput";

    /// Create an evaluator backed by the given expression evaluator
    pub fn new(evaluator: Arc<dyn ExpressionEvaluator>) -> Self {
        Self {
            evaluator,
            listeners: ListenerChain::new(),
            input_variable: Self::DEFAULT_INPUT_VARIABLE.to_string(),
            default_language: None,
        }
    }

    /// Set the listeners notified after each evaluation
    pub fn with_listeners(mut self, listeners: ListenerChain) -> Self {
        self.listeners = listeners;
        self
    }

    /// Set the default input variable name
    pub fn with_input_variable(mut self, input_variable: impl Into<String>) -> Self {
        self.input_variable = input_variable.into();
        self
    }

    /// Set the language untagged cell expressions are evaluated under
    pub fn with_default_language(mut self, language: impl Into<String>) -> Self {
        self.default_language = Some(language.into());
        self
    }

    /// Registered listeners
    pub fn listeners(&self) -> &ListenerChain {
        &self.listeners
    }

    /// Default input variable name
    pub fn input_variable(&self) -> &str {
        &self.input_variable
    }

    /// Language applied to untagged expressions, if any
    pub fn default_language(&self) -> Option<&str> {
        self.default_language.as_deref()
    }

    /// Evaluate a table against the given bindings
    ///
    /// Every rule is scanned, except under FIRST where the scan stops at the
    /// first match. The listeners are notified before the result is returned;
    /// any failure, including a listener failure, discards the result.
    pub fn evaluate(
        &self,
        table: &DecisionTable,
        context: &dyn VariableContext,
    ) -> Result<DecisionTableResult> {
        table.validate()?;

        let tagged = DefaultLanguage::new(self.evaluator.as_ref(), self.default_language.as_deref());
        let evaluator: &dyn ExpressionEvaluator = &tagged;
        let inputs = evaluate_inputs(table, evaluator, context, &self.input_variable)?;

        let mut matches = Vec::new();
        let mut scanned_rules = 0usize;

        for (index, rule) in table.rules.iter().enumerate() {
            scanned_rules += 1;

            if !match_rule(table, rule, &inputs, evaluator, context)? {
                continue;
            }

            let matched = compose_rule(table, index, rule, evaluator, context)?;
            tracing::trace!(table = %table.key, rule = %matched.key(), position = matched.index, "Rule matched");
            matches.push(matched);

            if table.hit_policy.stops_early() {
                break;
            }
        }

        let selected = resolve(table, matches)?;

        let collect = match table.effective_aggregation() {
            Some(aggregation) => {
                let column = table
                    .outputs
                    .iter()
                    .position(|output| output.key == aggregation.output);
                let values: Vec<Option<Value>> = selected
                    .iter()
                    .map(|matched| column.and_then(|column| matched.output_value(column).cloned()))
                    .collect();
                let name = column
                    .map(|column| &table.outputs[column])
                    .and_then(|output| output.output_name.clone())
                    .unwrap_or_else(|| aggregation.output.clone());

                Some(CollectResult {
                    name,
                    value: aggregate(aggregation.aggregator, &values)?,
                })
            }
            None => None,
        };

        let executed_decision_elements = scanned_rules as u64 * table.cells_per_rule() as u64;

        let result = assemble(inputs, selected, collect, executed_decision_elements);

        tracing::debug!(
            table = %table.key,
            hit_policy = %table.hit_policy,
            matched = result.matching_rules.len(),
            elements = executed_decision_elements,
            "Decision table evaluated"
        );

        self.listeners.notify(table, &result)?;

        Ok(result)
    }
}

impl Default for DecisionTableEvaluator {
    fn default() -> Self {
        Self::new(Arc::new(SimpleExpressionEvaluator::new()))
    }
}

impl fmt::Debug for DecisionTableEvaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecisionTableEvaluator")
            .field("listeners", &self.listeners)
            .field("input_variable", &self.input_variable)
            .field("default_language", &self.default_language)
            .finish_non_exhaustive()
    }
}
