//! Configuration types for DecisionEngine

use crate::error::{Result, SdkError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tabula_runtime::{DecisionTableEvaluator, SimpleExpressionEvaluator};

/// Main engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Variable an input column's value is bound to while its entries run
    pub input_variable: String,

    /// Enable metrics collection
    pub enable_metrics: bool,

    /// Expression language assumed for untagged cell expressions
    pub default_expression_language: String,
}

impl EngineConfig {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self {
            input_variable: DecisionTableEvaluator::DEFAULT_INPUT_VARIABLE.to_string(),
            enable_metrics: true,
            default_expression_language: SimpleExpressionEvaluator::LANGUAGE.to_string(),
        }
    }

    /// Parse a configuration from YAML; missing fields take their defaults
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Set the input variable name
    pub fn with_input_variable(mut self, input_variable: impl Into<String>) -> Self {
        self.input_variable = input_variable.into();
        self
    }

    /// Set the default expression language
    pub fn with_default_expression_language(mut self, language: impl Into<String>) -> Self {
        self.default_expression_language = language.into();
        self
    }

    /// Enable metrics
    pub fn enable_metrics(mut self, enable: bool) -> Self {
        self.enable_metrics = enable;
        self
    }

    /// Check the configuration values
    pub fn validate(&self) -> Result<()> {
        let valid_identifier = self
            .input_variable
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && self
                .input_variable
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid_identifier {
            return Err(SdkError::ConfigError(format!(
                "input variable '{}' is not a valid identifier",
                self.input_variable
            )));
        }

        if self.default_expression_language.trim().is_empty() {
            return Err(SdkError::ConfigError(
                "default expression language must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}
