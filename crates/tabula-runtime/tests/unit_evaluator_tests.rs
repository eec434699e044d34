//! Integration tests for decision table evaluation
//!
//! Covers inputs, matching rules and outputs as delivered to listeners, every
//! hit policy, COLLECT aggregation and error propagation.

mod common;

use common::{listener_table, recording_evaluator, variables, RecordingListener};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tabula_core::{Aggregation, BuiltinAggregator, DecisionTable, HitPolicy, Input, Output, Rule, Value};
use tabula_runtime::{
    DecisionTableEvaluator, DecisionTableResult, EvaluationError, ExpressionError, ListenerChain,
    MapContext,
};

fn with_policy(hit_policy: HitPolicy) -> DecisionTable {
    let mut table = listener_table();
    table.set_hit_policy(hit_policy);
    table
}

// =============================================================================
// Listener Delivery
// =============================================================================

#[test]
fn test_listener_is_called() {
    let (evaluator, listener) = recording_evaluator();

    evaluator
        .evaluate(&listener_table(), &variables(true, "foo", "hello", "hello"))
        .unwrap();

    assert_eq!(listener.results().len(), 1);
}

#[test]
fn test_listener_receives_returned_result() {
    let (evaluator, listener) = recording_evaluator();

    let result = evaluator
        .evaluate(&listener_table(), &variables(false, "bar", true, "hello"))
        .unwrap();

    assert_eq!(listener.last(), result);
}

#[test]
fn test_listeners_notified_in_registration_order() {
    let order = Arc::new(Mutex::new(Vec::new()));
    let first = RecordingListener::new();
    let second = RecordingListener::new();

    let first_order = order.clone();
    let second_order = order.clone();
    let listeners = ListenerChain::new()
        .with(first.clone())
        .with(Arc::new(move |_: &DecisionTable, _: &DecisionTableResult| -> anyhow::Result<()> {
            first_order.lock().unwrap().push("first");
            Ok(())
        }))
        .with(second.clone())
        .with(Arc::new(move |_: &DecisionTable, _: &DecisionTableResult| -> anyhow::Result<()> {
            second_order.lock().unwrap().push("second");
            Ok(())
        }));
    let evaluator = DecisionTableEvaluator::default().with_listeners(listeners);

    evaluator
        .evaluate(&listener_table(), &variables(true, "foo", "test", "hello"))
        .unwrap();

    assert_eq!(*order.lock().unwrap(), vec!["first", "second"]);
    assert_eq!(first.results().len(), 1);
    assert_eq!(second.results().len(), 1);
    assert_eq!(first.last(), second.last());
}

#[test]
fn test_listener_failure_fails_evaluation() {
    let after = RecordingListener::new();
    let listeners = ListenerChain::new()
        .with(Arc::new(|_: &DecisionTable, _: &DecisionTableResult| -> anyhow::Result<()> {
            anyhow::bail!("audit log unavailable")
        }))
        .with(after.clone());
    let evaluator = DecisionTableEvaluator::default().with_listeners(listeners);

    let err = evaluator
        .evaluate(&listener_table(), &variables(true, "foo", "test", "hello"))
        .unwrap_err();

    assert!(err.is_listener_failure());
    assert!(err.to_string().contains("audit log unavailable"));
    assert!(after.results().is_empty());
}

// =============================================================================
// Executed Decision Elements
// =============================================================================

#[test]
fn test_executed_decision_elements() {
    let (evaluator, listener) = recording_evaluator();
    let table = listener_table();

    // Independent from input values and from the matching rules
    for context in [
        variables(true, "foo", false, "hello"),
        variables(false, "bar", true, "hello"),
        variables(false, "false", true, "hello"),
    ] {
        evaluator.evaluate(&table, &context).unwrap();
        assert_eq!(listener.last().executed_decision_elements(), 36);
    }
}

#[test]
fn test_executed_decision_elements_under_first() {
    let (evaluator, listener) = recording_evaluator();
    let table = with_policy(HitPolicy::First);

    evaluator
        .evaluate(&table, &variables(false, "bar", true, "hello"))
        .unwrap();
    assert_eq!(listener.last().matching_rule_keys(), vec!["rule2"]);
    assert_eq!(listener.last().executed_decision_elements(), 12);

    evaluator
        .evaluate(&table, &variables(true, "bar", "test", "hello"))
        .unwrap();
    assert!(listener.last().matching_rules().is_empty());
    assert_eq!(listener.last().executed_decision_elements(), 36);
}

// =============================================================================
// Inputs, Matching Rules and Outputs
// =============================================================================

#[test]
fn test_input_values() {
    let (evaluator, listener) = recording_evaluator();

    evaluator
        .evaluate(&listener_table(), &variables(true, "foo", "test", "hello"))
        .unwrap();

    let inputs = listener.last().inputs().clone();
    assert_eq!(inputs.len(), 3);

    let input1 = &inputs["input1"];
    assert_eq!(input1.key, "input1");
    assert_eq!(input1.name.as_deref(), Some("Input"));
    assert_eq!(input1.output_name.as_deref(), Some("cellInput"));
    assert_eq!(input1.value, Value::Bool(true));

    let input2 = &inputs["input2"];
    assert_eq!(input2.key, "input2");
    assert_eq!(input2.name, None);
    assert_eq!(input2.output_name.as_deref(), Some("x"));
    assert_eq!(input2.value, Value::from("foo"));

    let input3 = &inputs["input3"];
    assert_eq!(input3.key, "input3");
    assert_eq!(input3.name, None);
    assert_eq!(input3.output_name.as_deref(), Some("cellInput"));
    assert_eq!(input3.value, Value::Null);
}

#[test]
fn test_matching_rules() {
    let (evaluator, listener) = recording_evaluator();
    let table = listener_table();

    evaluator
        .evaluate(&table, &variables(true, "foo", "test", "hello"))
        .unwrap();
    let result = listener.last();
    assert_eq!(result.matching_rule_keys(), vec!["rule1"]);
    assert_eq!(result.matching_rules()[0].outputs.len(), 2);

    evaluator
        .evaluate(&table, &variables(true, "bar", "test", "hello"))
        .unwrap();
    assert!(listener.last().matching_rules().is_empty());

    evaluator
        .evaluate(&table, &variables(false, "bar", "test", "hello"))
        .unwrap();
    let result = listener.last();
    assert_eq!(result.matching_rule_keys(), vec!["rule2"]);
    assert_eq!(result.matching_rules()[0].outputs.len(), 1);

    evaluator
        .evaluate(&table, &variables(false, "bar", true, "hello"))
        .unwrap();
    let result = listener.last();
    assert_eq!(
        result.matching_rule_keys(),
        vec!["rule2", "rule3", "rule4", "rule5", "rule6"]
    );
    let output_counts: Vec<usize> = result
        .matching_rules()
        .iter()
        .map(|rule| rule.outputs.len())
        .collect();
    assert_eq!(output_counts, vec![1, 0, 1, 1, 1]);
}

#[test]
fn test_outputs() {
    let (evaluator, listener) = recording_evaluator();
    let table = listener_table();

    evaluator
        .evaluate(&table, &variables(true, "foo", "test", "hello"))
        .unwrap();
    let result = listener.last();
    let outputs = &result.matching_rules()[0].outputs;
    assert_eq!(outputs.len(), 2);

    let output1 = &outputs["output1"];
    assert_eq!(output1.key, "output1");
    assert_eq!(output1.name.as_deref(), Some("Output 1"));
    assert_eq!(output1.output_name.as_deref(), Some("out1"));
    assert_eq!(output1.value, Value::from("hello"));

    let output2 = &outputs["output2"];
    assert_eq!(output2.key, "output2");
    assert_eq!(output2.name, None);
    assert_eq!(output2.output_name, None);
    assert_eq!(output2.value, Value::from("tabula"));

    evaluator
        .evaluate(&table, &variables(false, "bar", "test", "hello"))
        .unwrap();
    let result = listener.last();
    let outputs = &result.matching_rules()[0].outputs;
    assert_eq!(outputs.len(), 1);
    assert_eq!(outputs["output2"].value, Value::from("tabula"));
}

#[test]
fn test_decision_outputs_use_output_names() {
    let (evaluator, _listener) = recording_evaluator();

    let result = evaluator
        .evaluate(&listener_table(), &variables(true, "foo", "test", "hello"))
        .unwrap();

    let outputs = result.to_decision_outputs();
    assert_eq!(outputs.len(), 1);
    assert_eq!(outputs[0].get("out1"), Some(&Value::from("hello")));
    assert_eq!(outputs[0].get("output2"), Some(&Value::from("tabula")));
}

#[test]
fn test_result_serializes_to_json() {
    let (evaluator, _listener) = recording_evaluator();

    let result = evaluator
        .evaluate(&listener_table(), &variables(true, "foo", "test", "hello"))
        .unwrap();

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["executed_decision_elements"], 36);
    assert_eq!(json["matching_rules"][0]["key"], "rule1");
    assert_eq!(
        json["matching_rules"][0]["outputs"]["output1"]["value"],
        "hello"
    );
    assert!(json["collect_result_value"].is_null());
}

// =============================================================================
// Hit Policies
// =============================================================================

#[test]
fn test_unique_single_match() {
    let (evaluator, _listener) = recording_evaluator();

    let result = evaluator
        .evaluate(&with_policy(HitPolicy::Unique), &variables(true, "foo", "test", "hello"))
        .unwrap();

    assert_eq!(result.matching_rule_keys(), vec!["rule1"]);
}

#[test]
fn test_unique_multiple_matches_is_ambiguous() {
    let (evaluator, listener) = recording_evaluator();

    let err = evaluator
        .evaluate(&with_policy(HitPolicy::Unique), &variables(false, "bar", true, "hello"))
        .unwrap_err();

    match err {
        EvaluationError::AmbiguousResult { hit_policy, rules, .. } => {
            assert_eq!(hit_policy, HitPolicy::Unique);
            assert_eq!(rules, vec!["rule2", "rule3", "rule4", "rule5", "rule6"]);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(listener.results().is_empty());
}

#[test]
fn test_any_requires_agreement() {
    let (evaluator, _listener) = recording_evaluator();

    let err = evaluator
        .evaluate(&with_policy(HitPolicy::Any), &variables(true, "bar", true, "hello"))
        .unwrap_err();
    assert!(matches!(
        err,
        EvaluationError::AmbiguousResult {
            hit_policy: HitPolicy::Any,
            ..
        }
    ));

    let agreeing = DecisionTable::new("any")
        .with_hit_policy(HitPolicy::Any)
        .add_input(Input::new("age").with_expression("age"))
        .add_output(Output::new("eligible").with_output_name("eligible"))
        .add_rule(
            Rule::new("adult")
                .with_input_entry(Some("cellInput >= 18"))
                .with_output_entry(Some("true")),
        )
        .add_rule(
            Rule::new("senior")
                .with_input_entry(Some("cellInput >= 65"))
                .with_output_entry(Some("true")),
        );
    let result = evaluator
        .evaluate(&agreeing, &MapContext::new().with("age", 70))
        .unwrap();
    assert_eq!(result.matching_rule_keys(), vec!["adult"]);
    assert_eq!(result.singleton_output(), Some(&Value::Bool(true)));
}

#[test]
fn test_priority_picks_highest_output_priority() {
    let (evaluator, _listener) = recording_evaluator();

    let result = evaluator
        .evaluate(&with_policy(HitPolicy::Priority), &variables(true, "bar", true, "hello"))
        .unwrap();

    assert_eq!(result.matching_rule_keys(), vec!["rule5"]);
    assert_eq!(result.executed_decision_elements(), 36);
}

#[test]
fn test_output_order_sorts_by_priority() {
    let (evaluator, _listener) = recording_evaluator();

    let result = evaluator
        .evaluate(&with_policy(HitPolicy::OutputOrder), &variables(true, "bar", true, "hello"))
        .unwrap();

    assert_eq!(
        result.matching_rule_keys(),
        vec!["rule5", "rule6", "rule4", "rule3"]
    );
}

#[test]
fn test_rule_order_keeps_declaration_order() {
    let (evaluator, _listener) = recording_evaluator();

    let result = evaluator
        .evaluate(&with_policy(HitPolicy::RuleOrder), &variables(true, "bar", true, "hello"))
        .unwrap();

    assert_eq!(
        result.matching_rule_keys(),
        vec!["rule3", "rule4", "rule5", "rule6"]
    );
    assert_eq!(result.collect_result_name(), None);
}

// =============================================================================
// COLLECT
// =============================================================================

#[test]
fn test_collect_without_aggregation() {
    let (evaluator, listener) = recording_evaluator();

    evaluator
        .evaluate(&with_policy(HitPolicy::Collect), &variables(true, "bar", true, "hello"))
        .unwrap();

    let result = listener.last();
    assert_eq!(result.collect_result_name(), None);
    assert_eq!(result.collect_result_value(), None);
    assert_eq!(
        result.matching_rule_keys(),
        vec!["rule3", "rule4", "rule5", "rule6"]
    );
}

#[test]
fn test_collect_result() {
    let (evaluator, listener) = recording_evaluator();
    let mut table = with_policy(HitPolicy::Collect);

    let expectations = [
        (BuiltinAggregator::Count, Value::Integer(3)),
        (BuiltinAggregator::Sum, Value::Integer(90)),
        (BuiltinAggregator::Max, Value::Integer(50)),
        (BuiltinAggregator::Min, Value::Integer(10)),
    ];

    for (aggregator, expected) in expectations {
        table.set_aggregation(Some(Aggregation::new(aggregator, "output3")));
        evaluator
            .evaluate(&table, &variables(true, "bar", true, "hello"))
            .unwrap();

        let result = listener.last();
        assert_eq!(result.collect_result_name(), Some("collectMe"), "{aggregator}");
        assert_eq!(result.collect_result_value(), Some(&expected), "{aggregator}");
        assert_eq!(
            result.matching_rule_keys(),
            vec!["rule3", "rule4", "rule5", "rule6"]
        );
        let flattened = HashMap::from([("collectMe".to_string(), expected)]);
        assert_eq!(result.to_decision_outputs(), vec![flattened]);
    }
}

#[test]
fn test_collect_count_includes_null_values() {
    let table = DecisionTable::new("scores")
        .with_hit_policy(HitPolicy::Collect)
        .with_aggregation(Aggregation::new(BuiltinAggregator::Count, "score"))
        .add_input(Input::new("points").with_expression("points"))
        .add_output(Output::new("score"))
        .add_rule(
            Rule::new("r1")
                .with_input_entry(Some("cellInput > 0"))
                .with_output_entry(Some("null")),
        )
        .add_rule(
            Rule::new("r2")
                .with_input_entry(None)
                .with_output_entry(Some("points * 2")),
        );

    let result = DecisionTableEvaluator::default()
        .evaluate(&table, &MapContext::new().with("points", 4))
        .unwrap();

    assert_eq!(result.collect_result_name(), Some("score"));
    assert_eq!(result.collect_result_value(), Some(&Value::Integer(2)));
}

#[test]
fn test_collect_aggregation_over_no_matches() {
    let mut table = with_policy(HitPolicy::Collect);
    let evaluator = DecisionTableEvaluator::default();
    let context = variables(true, "none", "test", "hello");

    table.set_aggregation(Some(Aggregation::new(BuiltinAggregator::Count, "output3")));
    let result = evaluator.evaluate(&table, &context).unwrap();
    assert_eq!(result.collect_result_value(), Some(&Value::Integer(0)));

    table.set_aggregation(Some(Aggregation::new(BuiltinAggregator::Sum, "output3")));
    let result = evaluator.evaluate(&table, &context).unwrap();
    assert_eq!(result.collect_result_name(), Some("collectMe"));
    assert_eq!(result.collect_result_value(), None);
}

#[test]
fn test_collect_reductions_over_repeated_values() {
    let table = DecisionTable::new("fees")
        .with_hit_policy(HitPolicy::Collect)
        .add_input(Input::new("tier").with_expression("tier"))
        .add_output(Output::new("fee").with_output_name("fee"))
        .add_rule(Rule::new("a").with_input_entry(None).with_output_entry(Some("50")))
        .add_rule(Rule::new("b").with_input_entry(None).with_output_entry(Some("10")))
        .add_rule(Rule::new("c").with_input_entry(None).with_output_entry(Some("20")))
        .add_rule(Rule::new("d").with_input_entry(None).with_output_entry(Some("10")));
    let evaluator = DecisionTableEvaluator::default();
    let context = MapContext::new().with("tier", "basic");

    for (aggregator, expected) in [
        (BuiltinAggregator::Count, 4),
        (BuiltinAggregator::Sum, 90),
        (BuiltinAggregator::Max, 50),
        (BuiltinAggregator::Min, 10),
    ] {
        let table = table
            .clone()
            .with_aggregation(Aggregation::new(aggregator, "fee"));
        let result = evaluator.evaluate(&table, &context).unwrap();
        assert_eq!(result.collect_result_value(), Some(&Value::Integer(expected)));
    }
}

#[test]
fn test_aggregation_ignored_outside_collect() {
    let mut table = listener_table();
    table.set_aggregation(Some(Aggregation::new(BuiltinAggregator::Sum, "output3")));

    let result = DecisionTableEvaluator::default()
        .evaluate(&table, &variables(true, "bar", true, "hello"))
        .unwrap();

    assert_eq!(result.collect_result_name(), None);
    assert_eq!(result.collect_result_value(), None);
    assert_eq!(result.matching_rules().len(), 4);
}

#[test]
fn test_aggregation_type_error() {
    let table = DecisionTable::new("labels")
        .with_hit_policy(HitPolicy::Collect)
        .with_aggregation(Aggregation::new(BuiltinAggregator::Sum, "label"))
        .add_input(Input::new("any"))
        .add_output(Output::new("label"))
        .add_rule(Rule::new("r1").with_input_entry(None).with_output_entry(Some("\"gold\"")))
        .add_rule(Rule::new("r2").with_input_entry(None).with_output_entry(Some("1")));

    let err = DecisionTableEvaluator::default()
        .evaluate(&table, &MapContext::new())
        .unwrap_err();

    assert!(matches!(err, EvaluationError::AggregationType(_)));
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn test_unbound_variable_aborts_evaluation() {
    let (evaluator, listener) = recording_evaluator();
    let context = MapContext::new().with("input1", true);

    let err = evaluator.evaluate(&listener_table(), &context).unwrap_err();

    match err {
        EvaluationError::Expression { location, source } => {
            assert!(location.contains("input2"));
            assert_eq!(source, ExpressionError::UnknownVariable("input2".to_string()));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(listener.results().is_empty());
}

#[test]
fn test_non_boolean_input_entry() {
    let table = DecisionTable::new("t")
        .add_input(Input::new("amount").with_expression("amount"))
        .add_output(Output::new("o"))
        .add_rule(
            Rule::new("r1")
                .with_input_entry(Some("cellInput * 2"))
                .with_output_entry(Some("1")),
        );

    let err = DecisionTableEvaluator::default()
        .evaluate(&table, &MapContext::new().with("amount", 3))
        .unwrap_err();

    assert!(matches!(err, EvaluationError::NonBooleanEntry { .. }));
    assert_eq!(err.kind(), "non_boolean_entry");
}

#[test]
fn test_null_input_entry_does_not_match() {
    let table = DecisionTable::new("t")
        .add_input(Input::new("amount").with_expression("amount"))
        .add_output(Output::new("o"))
        .add_rule(
            Rule::new("r1")
                .with_input_entry(Some("null"))
                .with_output_entry(Some("1")),
        );

    let result = DecisionTableEvaluator::default()
        .evaluate(&table, &MapContext::new().with("amount", 3))
        .unwrap();

    assert!(result.matching_rules().is_empty());
    assert_eq!(result.executed_decision_elements(), 2);
}

// =============================================================================
// Determinism
// =============================================================================

#[test]
fn test_repeated_evaluation_is_deterministic() {
    let evaluator = DecisionTableEvaluator::default();
    let mut table = with_policy(HitPolicy::Collect);
    table.set_aggregation(Some(Aggregation::new(BuiltinAggregator::Sum, "output3")));
    let context = variables(true, "bar", true, "hello");

    let first = evaluator.evaluate(&table, &context).unwrap();
    let second = evaluator.evaluate(&table, &context).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_shared_table_across_threads() {
    let table = Arc::new(listener_table());
    let evaluator = DecisionTableEvaluator::default();

    let handles: Vec<_> = [true, false]
        .into_iter()
        .map(|input1| {
            let table = table.clone();
            let evaluator = evaluator.clone();
            std::thread::spawn(move || {
                evaluator
                    .evaluate(&table, &variables(input1, "bar", true, "hello"))
                    .unwrap()
            })
        })
        .collect();

    let results: Vec<DecisionTableResult> =
        handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(results[0].matching_rules().len(), 4);
    assert_eq!(results[1].matching_rules().len(), 5);
}
