//! Common test utilities for SDK integration tests

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use tabula_sdk::{
    table_from_yaml, DecisionTable, DecisionTableListener, DecisionTableResult, Expression,
    ExpressionError, ExpressionEvaluator, MapContext, Value, VariableContext,
};

/// Listener table in its YAML form
pub const LISTENER_TABLE: &str = r#"
key: decision
name: Listener Decision
hit_policy: RULE_ORDER
inputs:
  - key: input1
    name: Input
    expression: input1
  - key: input2
    expression: input2
    input_variable: x
  - key: input3
outputs:
  - key: output1
    name: Output 1
    output_name: out1
  - key: output2
  - key: output3
    output_name: collectMe
    output_values: [10, 30, 50]
rules:
  - key: rule1
    input_entries: ["cellInput == true", 'x == "foo"', null]
    output_entries: ["output1", '"tabula"', null]
  - key: rule2
    input_entries: ["cellInput == false", 'x == "bar"', null]
    output_entries: [null, '"tabula"', null]
  - key: rule3
    input_entries: [null, 'x == "bar"', "input3 == true"]
    output_entries: [null, null, null]
  - key: rule4
    input_entries: [null, 'x == "bar"', "input3 == true"]
    output_entries: [null, null, "50"]
  - key: rule5
    input_entries: [null, 'x == "bar"', "input3 == true"]
    output_entries: [null, null, "10"]
  - key: rule6
    input_entries: [null, 'x == "bar"', "input3 == true"]
    output_entries: [null, null, "30"]
"#;

/// Load the listener table
pub fn listener_table() -> DecisionTable {
    table_from_yaml(LISTENER_TABLE).unwrap()
}

/// Bindings for the listener table
pub fn variables(
    input1: impl Into<Value>,
    input2: impl Into<Value>,
    input3: impl Into<Value>,
    output1: impl Into<Value>,
) -> MapContext {
    MapContext::new()
        .with("input1", input1)
        .with("input2", input2)
        .with("input3", input3)
        .with("output1", output1)
}

/// Listener remembering the results it was notified with
#[derive(Default)]
pub struct TestListener {
    pub results: Mutex<Vec<DecisionTableResult>>,
}

impl TestListener {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn last(&self) -> Option<DecisionTableResult> {
        self.results.lock().unwrap().last().cloned()
    }

    pub fn count(&self) -> usize {
        self.results.lock().unwrap().len()
    }
}

impl DecisionTableListener for TestListener {
    fn notify(&self, _table: &DecisionTable, result: &DecisionTableResult) -> anyhow::Result<()> {
        self.results.lock().unwrap().push(result.clone());
        Ok(())
    }
}

/// Expression evaluator recording the language of every expression it sees
///
/// Every expression evaluates to `true`.
#[derive(Default)]
pub struct LanguageRecorder {
    seen: Mutex<Vec<String>>,
}

impl LanguageRecorder {
    pub fn languages(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

impl ExpressionEvaluator for LanguageRecorder {
    fn evaluate(
        &self,
        expression: &Expression,
        _context: &dyn VariableContext,
    ) -> Result<Value, ExpressionError> {
        let language = expression.language.clone().unwrap_or_default();
        self.seen.lock().unwrap().push(language);
        Ok(Value::Bool(true))
    }
}
