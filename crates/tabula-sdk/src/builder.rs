//! Builder pattern for DecisionEngine

use crate::config::EngineConfig;
use crate::decision_engine::DecisionEngine;
use crate::error::{Result, SdkError};
use std::sync::Arc;
use tabula_runtime::{
    DecisionTableEvaluator, DecisionTableListener, ExpressionEvaluator, ListenerChain,
    MetricsCollector, MetricsListener, SimpleExpressionEvaluator,
};

/// Builder for DecisionEngine
///
/// Listeners are fixed once the engine is built.
///
/// # Example
///
/// ```rust,ignore
/// use tabula_sdk::DecisionEngineBuilder;
///
/// let engine = DecisionEngineBuilder::new()
///     .add_listener(Arc::new(audit_listener))
///     .enable_metrics(true)
///     .build()?;
/// ```
pub struct DecisionEngineBuilder {
    config: EngineConfig,
    evaluator: Option<Arc<dyn ExpressionEvaluator>>,
    listeners: ListenerChain,
}

impl DecisionEngineBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            config: EngineConfig::new(),
            evaluator: None,
            listeners: ListenerChain::new(),
        }
    }

    /// Replace the whole configuration
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the input variable name
    pub fn with_input_variable(mut self, input_variable: impl Into<String>) -> Self {
        self.config.input_variable = input_variable.into();
        self
    }

    /// Use a custom expression evaluator instead of the built-in language
    pub fn with_evaluator(mut self, evaluator: Arc<dyn ExpressionEvaluator>) -> Self {
        self.evaluator = Some(evaluator);
        self
    }

    /// Register a listener; listeners run in registration order
    pub fn add_listener(mut self, listener: Arc<dyn DecisionTableListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    /// Enable metrics
    pub fn enable_metrics(mut self, enable: bool) -> Self {
        self.config.enable_metrics = enable;
        self
    }

    /// Build the engine
    ///
    /// With metrics enabled a [`MetricsListener`] runs after the registered
    /// listeners.
    pub fn build(self) -> Result<DecisionEngine> {
        let Self {
            config,
            evaluator,
            mut listeners,
        } = self;

        config.validate()?;

        let evaluator = match evaluator {
            Some(evaluator) => evaluator,
            None => {
                if config.default_expression_language != SimpleExpressionEvaluator::LANGUAGE {
                    return Err(SdkError::ConfigError(format!(
                        "no evaluator for expression language '{}'",
                        config.default_expression_language
                    )));
                }
                Arc::new(SimpleExpressionEvaluator::new())
            }
        };

        let metrics = if config.enable_metrics {
            let collector = Arc::new(MetricsCollector::new());
            listeners.push(Arc::new(MetricsListener::new(collector.clone())));
            Some(collector)
        } else {
            None
        };

        tracing::info!(
            listeners = listeners.len(),
            metrics = config.enable_metrics,
            input_variable = %config.input_variable,
            language = %config.default_expression_language,
            "Decision engine built"
        );

        let table_evaluator = DecisionTableEvaluator::new(evaluator)
            .with_input_variable(config.input_variable.clone())
            .with_default_language(config.default_expression_language.clone())
            .with_listeners(listeners);

        Ok(DecisionEngine::from_parts(table_evaluator, metrics, config))
    }
}

impl Default for DecisionEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
