//! Value evaluation for cell expressions
//!
//! The engine treats expression syntax as opaque and consumes it through
//! [`ExpressionEvaluator`]. Variables are resolved through a [`VariableContext`],
//! which lets the matcher overlay the input variable on the caller's bindings
//! without copying them.

mod error;
mod simple;

pub use error::ExpressionError;
pub use simple::SimpleExpressionEvaluator;

use std::collections::HashMap;
use tabula_core::{Expression, Value};

/// Resolves variable names during evaluation
pub trait VariableContext: Send + Sync {
    /// Resolve a variable, `None` if it is not bound
    fn resolve(&self, name: &str) -> Option<&Value>;

    /// Check if a variable is bound
    fn has(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }
}

/// Evaluates cell expressions
///
/// Evaluation must be a pure function of the expression and the bindings.
pub trait ExpressionEvaluator: Send + Sync {
    /// Evaluate an expression against the given variables
    fn evaluate(
        &self,
        expression: &Expression,
        context: &dyn VariableContext,
    ) -> Result<Value, ExpressionError>;
}

/// Evaluator wrapper tagging untagged expressions with a default language
pub(crate) struct DefaultLanguage<'a> {
    inner: &'a dyn ExpressionEvaluator,
    language: Option<&'a str>,
}

impl<'a> DefaultLanguage<'a> {
    pub(crate) fn new(inner: &'a dyn ExpressionEvaluator, language: Option<&'a str>) -> Self {
        Self { inner, language }
    }
}

impl ExpressionEvaluator for DefaultLanguage<'_> {
    fn evaluate(
        &self,
        expression: &Expression,
        context: &dyn VariableContext,
    ) -> Result<Value, ExpressionError> {
        match (&expression.language, self.language) {
            (None, Some(language)) => {
                let tagged = expression.clone().with_language(language);
                self.inner.evaluate(&tagged, context)
            }
            _ => self.inner.evaluate(expression, context),
        }
    }
}

/// Variable context backed by a map of caller bindings
#[derive(Debug, Clone, Default)]
pub struct MapContext {
    bindings: HashMap<String, Value>,
}

impl MapContext {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a binding
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.bindings.insert(name.into(), value.into());
    }

    /// Add a binding, builder style
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Number of bindings
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether there are no bindings
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl From<HashMap<String, Value>> for MapContext {
    fn from(bindings: HashMap<String, Value>) -> Self {
        Self { bindings }
    }
}

impl FromIterator<(String, Value)> for MapContext {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            bindings: iter.into_iter().collect(),
        }
    }
}

impl VariableContext for MapContext {
    fn resolve(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name)
    }
}

impl VariableContext for HashMap<String, Value> {
    fn resolve(&self, name: &str) -> Option<&Value> {
        self.get(name)
    }
}

/// A parent context with one overlaid binding
///
/// The overlay shadows a parent binding of the same name.
pub struct ScopedContext<'a> {
    parent: &'a dyn VariableContext,
    name: &'a str,
    value: &'a Value,
}

impl<'a> ScopedContext<'a> {
    /// Overlay `name = value` on `parent`
    pub fn new(parent: &'a dyn VariableContext, name: &'a str, value: &'a Value) -> Self {
        Self {
            parent,
            name,
            value,
        }
    }
}

impl VariableContext for ScopedContext<'_> {
    fn resolve(&self, name: &str) -> Option<&Value> {
        if name == self.name {
            Some(self.value)
        } else {
            self.parent.resolve(name)
        }
    }
}
