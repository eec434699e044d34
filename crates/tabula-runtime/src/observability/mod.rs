//! Observability module
//!
//! In-process metrics plus a listener that feeds them from evaluation
//! results. Log output goes through `tracing`.

pub mod metrics;

pub use metrics::{Counter, Histogram, Metrics, MetricsCollector};

use crate::listener::DecisionTableListener;
use crate::result::DecisionTableResult;
use std::fmt;
use std::sync::Arc;
use tabula_core::DecisionTable;

/// Listener recording per-table evaluation metrics
///
/// For a table with key `k` it maintains:
/// - `evaluations_total` and `evaluations_<k>` counters
/// - `matched_rules_<k>` counter
/// - `decision_elements_<k>` histogram
#[derive(Clone)]
pub struct MetricsListener {
    metrics: Arc<dyn Metrics>,
}

impl MetricsListener {
    /// Create a listener writing into the given registry
    pub fn new(metrics: Arc<dyn Metrics>) -> Self {
        Self { metrics }
    }
}

impl DecisionTableListener for MetricsListener {
    fn notify(&self, table: &DecisionTable, result: &DecisionTableResult) -> anyhow::Result<()> {
        self.metrics.counter("evaluations_total").inc();
        self.metrics
            .counter(&format!("evaluations_{}", table.key))
            .inc();
        self.metrics
            .counter(&format!("matched_rules_{}", table.key))
            .add(result.matching_rules().len() as u64);
        self.metrics
            .histogram(&format!("decision_elements_{}", table.key))
            .observe(result.executed_decision_elements() as f64);
        Ok(())
    }
}

impl fmt::Debug for MetricsListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetricsListener").finish_non_exhaustive()
    }
}
