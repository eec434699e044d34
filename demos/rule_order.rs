//! Rule Order Example
//!
//! Evaluates the shipping table for a few parcels and prints every matching
//! rule with its outputs. A listener prints the executed decision elements,
//! which stay the same whichever rules match.
//!
//! Run with `cargo run --example rule_order`.

use std::sync::Arc;
use tabula_demos::{init_tracing, parcel, shipping_table};
use tabula_sdk::{DecisionEngineBuilder, DecisionTable, DecisionTableResult, HitPolicy};

fn main() -> anyhow::Result<()> {
    init_tracing();

    let engine = DecisionEngineBuilder::new()
        .add_listener(Arc::new(
            |table: &DecisionTable, result: &DecisionTableResult| -> anyhow::Result<()> {
                println!(
                    "  [listener] table '{}': {} rule(s) matched, {} decision elements",
                    table.key,
                    result.matching_rules().len(),
                    result.executed_decision_elements()
                );
                Ok(())
            },
        ))
        .build()?;

    let mut table = shipping_table()?;

    println!("=== RULE ORDER ===\n");
    for (weight, destination, member) in [
        (1.5, "domestic", false),
        (25.0, "domestic", true),
        (8.0, "eu", false),
        (3.0, "moon", false),
    ] {
        println!("Parcel: {weight} kg to {destination}, member: {member}");
        let result = engine.evaluate(&table, &parcel(weight, destination, member))?;
        for (rule, outputs) in result.matching_rules().iter().zip(result.to_decision_outputs()) {
            println!("  {:<16} {}", rule.key, serde_json::to_string(&outputs)?);
        }
        println!();
    }

    for hit_policy in [HitPolicy::First, HitPolicy::Priority, HitPolicy::OutputOrder] {
        table.set_hit_policy(hit_policy);
        println!("=== {} ===", hit_policy);
        let result = engine.evaluate(&table, &parcel(25.0, "domestic", true))?;
        println!("  matching rules: {:?}\n", result.matching_rule_keys());
    }

    table.set_hit_policy(HitPolicy::Unique);
    println!("=== UNIQUE ===");
    match engine.evaluate(&table, &parcel(25.0, "domestic", true)) {
        Ok(result) => println!("  matching rules: {:?}", result.matching_rule_keys()),
        Err(error) => println!("  rejected: {error}"),
    }

    Ok(())
}
