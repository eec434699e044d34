//! COLLECT aggregation
//!
//! Reduces the aggregation column of the selected rules to a single value.
//! `None` slots are rules without an entry in that column.

use crate::error::{EvaluationError, Result};
use std::cmp::Ordering;
use tabula_core::{BuiltinAggregator, Value};

/// Reduce collected output values with a built-in aggregator
///
/// COUNT counts every rule with an entry in the column, null values included,
/// and yields `0` when nothing was collected. SUM, MIN and MAX skip nulls and
/// yield `None` when no value remains. Integer inputs produce an integer
/// result; a single decimal promotes the result to a decimal.
pub fn aggregate(aggregator: BuiltinAggregator, values: &[Option<Value>]) -> Result<Option<Value>> {
    match aggregator {
        BuiltinAggregator::Count => count(values).map(Some),
        BuiltinAggregator::Sum => reduce(values, sum),
        BuiltinAggregator::Min => reduce(values, |collected| {
            extreme(aggregator, collected, Ordering::Less)
        }),
        BuiltinAggregator::Max => reduce(values, |collected| {
            extreme(aggregator, collected, Ordering::Greater)
        }),
    }
}

fn count(values: &[Option<Value>]) -> Result<Value> {
    let count = values.iter().filter(|value| value.is_some()).count();
    i64::try_from(count)
        .map(Value::Integer)
        .map_err(|_| EvaluationError::AggregationType(format!("COUNT of {} overflows", count)))
}

/// Apply a reduction to the non-null values, `None` when there are none
fn reduce<F>(values: &[Option<Value>], reduction: F) -> Result<Option<Value>>
where
    F: FnOnce(&[&Value]) -> Result<Value>,
{
    let collected: Vec<&Value> = values
        .iter()
        .flatten()
        .filter(|value| !value.is_null())
        .collect();

    if collected.is_empty() {
        return Ok(None);
    }
    reduction(&collected).map(Some)
}

fn sum(values: &[&Value]) -> Result<Value> {
    let mut integer_total: i64 = 0;
    let mut double_total: f64 = 0.0;
    let mut promoted = false;

    for value in values {
        match value {
            Value::Integer(i) => {
                if promoted {
                    double_total += *i as f64;
                } else {
                    integer_total = integer_total.checked_add(*i).ok_or_else(|| {
                        EvaluationError::AggregationType(format!(
                            "SUM overflows adding {} to {}",
                            i, integer_total
                        ))
                    })?;
                }
            }
            Value::Double(d) => {
                if !promoted {
                    promoted = true;
                    double_total = integer_total as f64;
                }
                double_total += d;
            }
            other => return Err(not_numeric(BuiltinAggregator::Sum, other)),
        }
    }

    Ok(if promoted {
        Value::Double(double_total)
    } else {
        Value::Integer(integer_total)
    })
}

/// MIN (`wanted = Less`) or MAX (`wanted = Greater`) over numbers or strings
fn extreme(aggregator: BuiltinAggregator, values: &[&Value], wanted: Ordering) -> Result<Value> {
    let all_strings = values.iter().all(|value| matches!(value, Value::String(_)));

    if !all_strings {
        if let Some(other) = values.iter().find(|value| !value.is_numeric()) {
            return Err(not_numeric(aggregator, other));
        }
    }

    let promoted = values.iter().any(|value| matches!(value, Value::Double(_)));

    let mut best = values[0];
    for value in &values[1..] {
        if compare(value, best) == wanted {
            best = *value;
        }
    }

    Ok(match best {
        Value::Integer(i) if promoted => Value::Double(*i as f64),
        other => other.clone(),
    })
}

fn compare(left: &Value, right: &Value) -> Ordering {
    match (left, right) {
        (Value::Integer(l), Value::Integer(r)) => l.cmp(r),
        (Value::String(l), Value::String(r)) => l.cmp(r),
        _ => match (left.as_f64(), right.as_f64()) {
            (Some(l), Some(r)) => l.total_cmp(&r),
            _ => Ordering::Equal,
        },
    }
}

fn not_numeric(aggregator: BuiltinAggregator, value: &Value) -> EvaluationError {
    EvaluationError::AggregationType(format!(
        "{} cannot aggregate {} value {}",
        aggregator,
        value.type_name(),
        value
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(items: &[Value]) -> Vec<Option<Value>> {
        items.iter().cloned().map(Some).collect()
    }

    fn collected() -> Vec<Option<Value>> {
        values(&[
            Value::Integer(50),
            Value::Integer(10),
            Value::Integer(20),
            Value::Integer(10),
        ])
    }

    #[test]
    fn test_reductions() {
        let collected = collected();
        assert_eq!(
            aggregate(BuiltinAggregator::Count, &collected).unwrap(),
            Some(Value::Integer(4))
        );
        assert_eq!(
            aggregate(BuiltinAggregator::Sum, &collected).unwrap(),
            Some(Value::Integer(90))
        );
        assert_eq!(
            aggregate(BuiltinAggregator::Min, &collected).unwrap(),
            Some(Value::Integer(10))
        );
        assert_eq!(
            aggregate(BuiltinAggregator::Max, &collected).unwrap(),
            Some(Value::Integer(50))
        );
    }

    #[test]
    fn test_count_includes_nulls_but_not_missing_entries() {
        let collected = vec![Some(Value::Null), Some(Value::Integer(1)), None];
        assert_eq!(
            aggregate(BuiltinAggregator::Count, &collected).unwrap(),
            Some(Value::Integer(2))
        );
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(
            aggregate(BuiltinAggregator::Count, &[]).unwrap(),
            Some(Value::Integer(0))
        );
        for aggregator in [
            BuiltinAggregator::Sum,
            BuiltinAggregator::Min,
            BuiltinAggregator::Max,
        ] {
            assert_eq!(aggregate(aggregator, &[]).unwrap(), None);
            assert_eq!(aggregate(aggregator, &[Some(Value::Null), None]).unwrap(), None);
        }
    }

    #[test]
    fn test_double_promotes_result() {
        let collected = values(&[Value::Integer(1), Value::Double(2.5), Value::Integer(3)]);
        assert_eq!(
            aggregate(BuiltinAggregator::Sum, &collected).unwrap(),
            Some(Value::Double(6.5))
        );
        assert_eq!(
            aggregate(BuiltinAggregator::Max, &collected).unwrap(),
            Some(Value::Double(3.0))
        );
        assert_eq!(
            aggregate(BuiltinAggregator::Min, &collected).unwrap(),
            Some(Value::Double(1.0))
        );
    }

    #[test]
    fn test_string_min_max() {
        let collected = values(&[Value::from("pear"), Value::from("apple"), Value::from("fig")]);
        assert_eq!(
            aggregate(BuiltinAggregator::Min, &collected).unwrap(),
            Some(Value::from("apple"))
        );
        assert_eq!(
            aggregate(BuiltinAggregator::Max, &collected).unwrap(),
            Some(Value::from("pear"))
        );
    }

    #[test]
    fn test_type_errors() {
        let strings = values(&[Value::from("a"), Value::Integer(1)]);
        assert!(matches!(
            aggregate(BuiltinAggregator::Sum, &strings),
            Err(EvaluationError::AggregationType(_))
        ));
        assert!(matches!(
            aggregate(BuiltinAggregator::Max, &strings),
            Err(EvaluationError::AggregationType(_))
        ));

        let booleans = values(&[Value::Bool(true), Value::Bool(false)]);
        assert!(matches!(
            aggregate(BuiltinAggregator::Min, &booleans),
            Err(EvaluationError::AggregationType(_))
        ));
    }

    #[test]
    fn test_sum_overflow() {
        let collected = values(&[Value::Integer(i64::MAX), Value::Integer(1)]);
        assert!(matches!(
            aggregate(BuiltinAggregator::Sum, &collected),
            Err(EvaluationError::AggregationType(_))
        ));
    }
}
