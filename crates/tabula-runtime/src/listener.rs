//! Decision table evaluation listeners
//!
//! Listeners observe every completed evaluation. They run synchronously on the
//! caller's stack after the result is assembled and before it is returned.

use crate::error::{EvaluationError, Result};
use crate::result::DecisionTableResult;
use std::fmt;
use std::sync::Arc;
use tabula_core::DecisionTable;

/// Observer of completed decision table evaluations
pub trait DecisionTableListener: Send + Sync {
    /// Called once per evaluation with the assembled result
    ///
    /// A failure aborts the remaining listeners and fails the evaluation.
    fn notify(&self, table: &DecisionTable, result: &DecisionTableResult) -> anyhow::Result<()>;
}

impl<F> DecisionTableListener for F
where
    F: Fn(&DecisionTable, &DecisionTableResult) -> anyhow::Result<()> + Send + Sync,
{
    fn notify(&self, table: &DecisionTable, result: &DecisionTableResult) -> anyhow::Result<()> {
        self(table, result)
    }
}

/// Ordered list of listeners owned by the engine configuration
#[derive(Clone, Default)]
pub struct ListenerChain {
    listeners: Vec<Arc<dyn DecisionTableListener>>,
}

impl ListenerChain {
    /// Create an empty chain
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a listener; listeners run in registration order
    pub fn push(&mut self, listener: Arc<dyn DecisionTableListener>) {
        self.listeners.push(listener);
    }

    /// Append a listener, builder style
    pub fn with(mut self, listener: Arc<dyn DecisionTableListener>) -> Self {
        self.push(listener);
        self
    }

    /// Number of registered listeners
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Whether no listener is registered
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Deliver a result to every listener in order
    pub fn notify(&self, table: &DecisionTable, result: &DecisionTableResult) -> Result<()> {
        for (index, listener) in self.listeners.iter().enumerate() {
            if let Err(source) = listener.notify(table, result) {
                tracing::warn!(
                    table = %table.key,
                    listener = index,
                    error = %source,
                    "Decision table listener failed"
                );
                return Err(EvaluationError::Listener { index, source });
            }
        }
        Ok(())
    }
}

impl fmt::Debug for ListenerChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerChain")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
