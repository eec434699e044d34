//! Cell expressions
//!
//! An expression is opaque to the table model: it carries source text and an
//! optional language tag that the evaluator dispatches on.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A cell or column expression
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "ExpressionRepr")]
pub struct Expression {
    /// Source text
    pub text: String,

    /// Expression language, `None` for the engine default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// Accepts either a bare string or the full `{ text, language }` form
#[derive(Deserialize)]
#[serde(untagged)]
enum ExpressionRepr {
    Text(String),
    Full {
        text: String,
        #[serde(default)]
        language: Option<String>,
    },
}

impl From<ExpressionRepr> for Expression {
    fn from(repr: ExpressionRepr) -> Self {
        match repr {
            ExpressionRepr::Text(text) => Expression::new(text),
            ExpressionRepr::Full { text, language } => Expression { text, language },
        }
    }
}

impl Expression {
    /// Create an expression in the default language
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            language: None,
        }
    }

    /// Set the expression language
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }
}

impl From<&str> for Expression {
    fn from(text: &str) -> Self {
        Expression::new(text)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.language {
            Some(language) => write!(f, "{}:{}", language, self.text),
            None => write!(f, "{}", self.text),
        }
    }
}
