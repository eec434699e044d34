//! DecisionEngine - Main API for evaluating decision tables

use crate::builder::DecisionEngineBuilder;
use crate::config::EngineConfig;
use crate::error::{Result, SdkError};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tabula_core::{DecisionTable, Value};
use tabula_runtime::{
    DecisionTableEvaluator, DecisionTableResult, MapContext, Metrics, MetricsCollector,
    VariableContext,
};

/// Main decision engine
///
/// Holds the configured evaluator and listener chain. Tables are passed per
/// call and never retained, so one engine serves any number of tables.
#[derive(Debug, Clone)]
pub struct DecisionEngine {
    /// Table evaluator with the configured listeners
    evaluator: DecisionTableEvaluator,

    /// Metrics collector, when enabled
    metrics: Option<Arc<MetricsCollector>>,

    /// Configuration
    config: EngineConfig,
}

impl DecisionEngine {
    /// Create an engine from configuration, without custom listeners
    pub fn new(config: EngineConfig) -> Result<Self> {
        DecisionEngineBuilder::new().with_config(config).build()
    }

    pub(crate) fn from_parts(
        evaluator: DecisionTableEvaluator,
        metrics: Option<Arc<MetricsCollector>>,
        config: EngineConfig,
    ) -> Self {
        Self {
            evaluator,
            metrics,
            config,
        }
    }

    /// Evaluate a table against the given variables
    pub fn evaluate(
        &self,
        table: &DecisionTable,
        variables: &dyn VariableContext,
    ) -> Result<DecisionTableResult> {
        let start = Instant::now();
        let outcome = self.evaluator.evaluate(table, variables);

        if let Some(metrics) = &self.metrics {
            metrics.record_execution_time("evaluate", start.elapsed());
            if let Err(error) = &outcome {
                metrics.record_error(error.kind());
            }
        }

        if let Err(error) = &outcome {
            tracing::debug!(table = %table.key, error = %error, "Decision table evaluation failed");
        }

        outcome.map_err(SdkError::from)
    }

    /// Evaluate a table and flatten the result into decision outputs
    ///
    /// Returns one map of output name to value per matching rule, or a single
    /// map holding the aggregate for COLLECT tables with an aggregation.
    pub fn evaluate_decision(
        &self,
        table: &DecisionTable,
        variables: &dyn VariableContext,
    ) -> Result<Vec<HashMap<String, Value>>> {
        Ok(self.evaluate(table, variables)?.to_decision_outputs())
    }

    /// Evaluate a table against a JSON object of variables
    ///
    /// Nested objects are flattened into dotted names, so `{"claim": {"amount": 5}}`
    /// binds `claim.amount`.
    pub fn evaluate_json(
        &self,
        table: &DecisionTable,
        variables: &serde_json::Value,
    ) -> Result<DecisionTableResult> {
        let context = variables_from_json(variables)?;
        self.evaluate(table, &context)
    }

    /// Metrics collector, when metrics are enabled
    pub fn metrics(&self) -> Option<Arc<MetricsCollector>> {
        self.metrics.clone()
    }

    /// Engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Number of registered listeners, the metrics listener included
    pub fn listener_count(&self) -> usize {
        self.evaluator.listeners().len()
    }
}

/// Convert a JSON object into variable bindings
pub fn variables_from_json(variables: &serde_json::Value) -> Result<MapContext> {
    let serde_json::Value::Object(object) = variables else {
        return Err(SdkError::InvalidVariables(format!(
            "expected a JSON object, got {}",
            variables
        )));
    };

    let mut context = MapContext::new();
    for (name, value) in object {
        bind_json(&mut context, name.clone(), value)?;
    }
    Ok(context)
}

fn bind_json(context: &mut MapContext, name: String, value: &serde_json::Value) -> Result<()> {
    match value {
        serde_json::Value::Object(object) => {
            for (field, nested) in object {
                bind_json(context, format!("{}.{}", name, field), nested)?;
            }
            Ok(())
        }
        serde_json::Value::Array(_) => Err(SdkError::InvalidVariables(format!(
            "variable '{}' is an array, only scalar values can be bound",
            name
        ))),
        scalar => {
            let value: Value = serde_json::from_value(scalar.clone()).map_err(|e| {
                SdkError::InvalidVariables(format!("variable '{}': {}", name, e))
            })?;
            context.insert(name, value);
            Ok(())
        }
    }
}
