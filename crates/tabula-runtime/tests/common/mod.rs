//! Common fixtures for runtime integration tests

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use tabula_core::{DecisionTable, HitPolicy, Input, Output, Rule, Value};
use tabula_runtime::{
    DecisionTableEvaluator, DecisionTableListener, DecisionTableResult, ListenerChain, MapContext,
};

/// Three inputs, three outputs, six rules.
///
/// - `input1` is bound to `cellInput`, `input2` to `x`
/// - `input3` has no input expression; its rules test the `input3` variable
/// - `output3` feeds aggregations under the name `collectMe`
pub fn listener_table() -> DecisionTable {
    DecisionTable::new("decision")
        .with_name("Listener Decision")
        .with_hit_policy(HitPolicy::RuleOrder)
        .add_input(Input::new("input1").with_name("Input").with_expression("input1"))
        .add_input(Input::new("input2").with_expression("input2").with_input_variable("x"))
        .add_input(Input::new("input3"))
        .add_output(Output::new("output1").with_name("Output 1").with_output_name("out1"))
        .add_output(Output::new("output2"))
        .add_output(
            Output::new("output3")
                .with_output_name("collectMe")
                .with_output_values(vec![Value::Integer(10), Value::Integer(30), Value::Integer(50)]),
        )
        .add_rule(
            Rule::new("rule1")
                .with_input_entry(Some("cellInput == true"))
                .with_input_entry(Some("x == \"foo\""))
                .with_input_entry(None)
                .with_output_entry(Some("output1"))
                .with_output_entry(Some("\"tabula\""))
                .with_output_entry(None),
        )
        .add_rule(
            Rule::new("rule2")
                .with_input_entry(Some("cellInput == false"))
                .with_input_entry(Some("x == \"bar\""))
                .with_input_entry(None)
                .with_output_entry(None)
                .with_output_entry(Some("\"tabula\""))
                .with_output_entry(None),
        )
        .add_rule(collector_rule("rule3", None))
        .add_rule(collector_rule("rule4", Some("50")))
        .add_rule(collector_rule("rule5", Some("10")))
        .add_rule(collector_rule("rule6", Some("30")))
}

fn collector_rule(key: &str, collected: Option<&str>) -> Rule {
    Rule::new(key)
        .with_input_entry(None)
        .with_input_entry(Some("x == \"bar\""))
        .with_input_entry(Some("input3 == true"))
        .with_output_entry(None)
        .with_output_entry(None)
        .with_output_entry(collected)
}

/// Bindings for [`listener_table`]
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

/// Listener keeping every result it was notified with
#[derive(Default)]
pub struct RecordingListener {
    results: Mutex<Vec<DecisionTableResult>>,
}

impl RecordingListener {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn results(&self) -> Vec<DecisionTableResult> {
        self.results.lock().unwrap().clone()
    }

    pub fn last(&self) -> DecisionTableResult {
        self.results
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("listener was not notified")
    }
}

impl DecisionTableListener for RecordingListener {
    fn notify(&self, _table: &DecisionTable, result: &DecisionTableResult) -> anyhow::Result<()> {
        self.results.lock().unwrap().push(result.clone());
        Ok(())
    }
}

/// Evaluator notifying a fresh recording listener
pub fn recording_evaluator() -> (DecisionTableEvaluator, Arc<RecordingListener>) {
    let listener = RecordingListener::new();
    let evaluator = DecisionTableEvaluator::default()
        .with_listeners(ListenerChain::new().with(listener.clone()));
    (evaluator, listener)
}
