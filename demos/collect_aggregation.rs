//! COLLECT Aggregation Example
//!
//! Collects the surcharge of every matching shipping rule and reduces it with
//! each built-in aggregator. Metrics gathered by the engine are printed at
//! the end.
//!
//! Run with `cargo run --example collect_aggregation`.

use tabula_demos::{init_tracing, parcel, shipping_table};
use tabula_sdk::{
    Aggregation, BuiltinAggregator, DecisionEngine, EngineConfig, HitPolicy, Metrics,
};

fn main() -> anyhow::Result<()> {
    init_tracing();

    let engine = DecisionEngine::new(EngineConfig::default().enable_metrics(true))?;
    let mut table = shipping_table()?;
    table.set_hit_policy(HitPolicy::Collect);

    let bindings = parcel(25.0, "domestic", true);

    println!("=== COLLECT without aggregation ===");
    for outputs in engine.evaluate_decision(&table, &bindings)? {
        println!("  {}", serde_json::to_string(&outputs)?);
    }

    for aggregator in [
        BuiltinAggregator::Count,
        BuiltinAggregator::Sum,
        BuiltinAggregator::Min,
        BuiltinAggregator::Max,
    ] {
        table.set_aggregation(Some(Aggregation::new(aggregator, "surcharge")));
        let result = engine.evaluate(&table, &bindings)?;
        println!(
            "\n=== COLLECT {} ===\n  {} = {}  (rules: {:?})",
            aggregator,
            result.collect_result_name().unwrap_or("-"),
            result
                .collect_result_value()
                .map(ToString::to_string)
                .unwrap_or_else(|| "none".to_string()),
            result.matching_rule_keys()
        );
    }

    if let Some(metrics) = engine.metrics() {
        println!("\n=== Metrics ===");
        println!("  evaluations: {}", metrics.counter("evaluations_shipping").get());
        println!("  matched rules: {}", metrics.counter("matched_rules_shipping").get());
        println!(
            "  avg decision elements: {:.1}",
            metrics.histogram("decision_elements_shipping").avg()
        );
    }

    Ok(())
}
