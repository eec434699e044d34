//! Runtime value types for Tabula cell expressions
//!
//! The `Value` enum represents every value a cell can evaluate to. Integers and
//! decimals are kept apart so aggregation can promote to the widest type present.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Runtime value type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Value {
    /// Null value
    #[default]
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value
    Integer(i64),
    /// Decimal value
    Double(f64),
    /// String value
    String(String),
}

impl Value {
    /// Check whether this is the null value
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Check whether this is an integer or a decimal
    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Double(_))
    }

    /// Get the boolean payload, if any
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get the string payload, if any
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Widen a numeric value to `f64`
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Double(d) => Some(*d),
            _ => None,
        }
    }

    /// Equality with numeric widening, so `Integer(1)` equals `Double(1.0)`
    pub fn loose_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Integer(_), Value::Double(_)) | (Value::Double(_), Value::Integer(_)) => {
                self.as_f64() == other.as_f64()
            }
            _ => self == other,
        }
    }

    /// Name of the value's type, used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Double(_) => "double",
            Value::String(_) => "string",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Double(d) => write!(f, "{}", d),
            Value::String(s) => write!(f, "\"{}\"", s),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Double(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_conversions() {
        assert_eq!(Value::from(true), Value::Bool(true));
        assert_eq!(Value::from(42), Value::Integer(42));
        assert_eq!(Value::from(2.5), Value::Double(2.5));
        assert_eq!(Value::from("foo"), Value::String("foo".to_string()));
        assert_eq!(Value::from(None::<i64>), Value::Null);
    }

    #[test]
    fn test_value_numeric_helpers() {
        assert!(Value::Integer(1).is_numeric());
        assert!(Value::Double(1.5).is_numeric());
        assert!(!Value::String("1".to_string()).is_numeric());
        assert_eq!(Value::Integer(3).as_f64(), Some(3.0));
        assert_eq!(Value::Null.as_f64(), None);
    }

    #[test]
    fn test_value_loose_eq() {
        assert!(Value::Integer(1).loose_eq(&Value::Double(1.0)));
        assert!(Value::Double(2.0).loose_eq(&Value::Integer(2)));
        assert!(!Value::Integer(1).loose_eq(&Value::Double(1.5)));
        assert!(!Value::Integer(1).loose_eq(&Value::from("1")));
        assert!(Value::Null.loose_eq(&Value::Null));
    }

    #[test]
    fn test_value_type_name() {
        assert_eq!(Value::Null.type_name(), "null");
        assert_eq!(Value::Bool(false).type_name(), "boolean");
        assert_eq!(Value::Integer(0).type_name(), "integer");
        assert_eq!(Value::Double(0.0).type_name(), "double");
        assert_eq!(Value::String(String::new()).type_name(), "string");
    }

    #[test]
    fn test_value_serde_json() {
        let values = vec![
            Value::Null,
            Value::Bool(true),
            Value::Integer(90),
            Value::Double(2.5),
            Value::String("tabula".to_string()),
        ];

        let json = serde_json::to_string(&values).unwrap();
        assert_eq!(json, r#"[null,true,90,2.5,"tabula"]"#);

        let deserialized: Vec<Value> = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, values);
    }
}
