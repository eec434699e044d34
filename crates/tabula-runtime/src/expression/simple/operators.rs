//! Operator execution for the built-in expression language

use super::parser::{BinaryOp, UnaryOp};
use crate::expression::ExpressionError;
use std::cmp::Ordering;
use tabula_core::Value;

type Result<T> = std::result::Result<T, ExpressionError>;

/// Execute an arithmetic operation
pub(crate) fn execute_arithmetic(left: &Value, op: BinaryOp, right: &Value) -> Result<Value> {
    // Null in any arithmetic operation propagates as Null
    if left.is_null() || right.is_null() {
        tracing::trace!("Null in arithmetic: {} {:?} {}, returning null", left, op, right);
        return Ok(Value::Null);
    }

    match (left, op, right) {
        (Value::Integer(l), _, Value::Integer(r)) => integer_arithmetic(*l, op, *r),
        (Value::String(l), BinaryOp::Add, Value::String(r)) => {
            Ok(Value::String(format!("{}{}", l, r)))
        }
        _ => match (left.as_f64(), right.as_f64()) {
            (Some(l), Some(r)) => double_arithmetic(l, op, r),
            _ => Err(ExpressionError::TypeMismatch(format!(
                "cannot apply {:?} to {} and {}",
                op,
                left.type_name(),
                right.type_name()
            ))),
        },
    }
}

fn integer_arithmetic(l: i64, op: BinaryOp, r: i64) -> Result<Value> {
    let overflow = || ExpressionError::Overflow(format!("{} {:?} {}", l, op, r));
    match op {
        BinaryOp::Add => l.checked_add(r).map(Value::Integer).ok_or_else(overflow),
        BinaryOp::Sub => l.checked_sub(r).map(Value::Integer).ok_or_else(overflow),
        BinaryOp::Mul => l.checked_mul(r).map(Value::Integer).ok_or_else(overflow),
        BinaryOp::Div => {
            if r == 0 {
                Err(ExpressionError::DivisionByZero)
            } else if l.checked_rem(r).ok_or_else(overflow)? == 0 {
                l.checked_div(r).map(Value::Integer).ok_or_else(overflow)
            } else {
                Ok(Value::Double(l as f64 / r as f64))
            }
        }
        _ => Err(ExpressionError::TypeMismatch(format!(
            "{:?} is not an arithmetic operator",
            op
        ))),
    }
}

fn double_arithmetic(l: f64, op: BinaryOp, r: f64) -> Result<Value> {
    match op {
        BinaryOp::Add => Ok(Value::Double(l + r)),
        BinaryOp::Sub => Ok(Value::Double(l - r)),
        BinaryOp::Mul => Ok(Value::Double(l * r)),
        BinaryOp::Div => {
            if r == 0.0 {
                Err(ExpressionError::DivisionByZero)
            } else {
                Ok(Value::Double(l / r))
            }
        }
        _ => Err(ExpressionError::TypeMismatch(format!(
            "{:?} is not an arithmetic operator",
            op
        ))),
    }
}

/// Structural equality with numeric widening (`1 == 1.0`)
pub(crate) fn values_equal(left: &Value, right: &Value) -> bool {
    left.loose_eq(right)
}

/// Execute a comparison operation
pub(crate) fn execute_compare(left: &Value, op: BinaryOp, right: &Value) -> Result<bool> {
    match op {
        BinaryOp::Eq => return Ok(values_equal(left, right)),
        BinaryOp::Ne => return Ok(!values_equal(left, right)),
        _ => {}
    }

    // Ordering against null is never satisfied
    if left.is_null() || right.is_null() {
        tracing::trace!("Null comparison: {} {:?} {}, returning false", left, op, right);
        return Ok(false);
    }

    let ordering = compare_values(left, right).ok_or_else(|| {
        ExpressionError::TypeMismatch(format!(
            "cannot compare {} and {} with {:?}",
            left.type_name(),
            right.type_name(),
            op
        ))
    })?;

    Ok(match op {
        BinaryOp::Lt => ordering == Ordering::Less,
        BinaryOp::Le => ordering != Ordering::Greater,
        BinaryOp::Gt => ordering == Ordering::Greater,
        BinaryOp::Ge => ordering != Ordering::Less,
        _ => false,
    })
}

/// Order two values of compatible types
pub(crate) fn compare_values(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Integer(l), Value::Integer(r)) => Some(l.cmp(r)),
        (Value::String(l), Value::String(r)) => Some(l.cmp(r)),
        (Value::Bool(l), Value::Bool(r)) => Some(l.cmp(r)),
        _ => match (left.as_f64(), right.as_f64()) {
            (Some(l), Some(r)) => l.partial_cmp(&r),
            _ => None,
        },
    }
}

/// Execute a logical operation on already evaluated operands
pub(crate) fn execute_logical(left: &Value, op: BinaryOp, right: &Value) -> Result<Value> {
    match (left, op, right) {
        (Value::Bool(l), BinaryOp::And, Value::Bool(r)) => Ok(Value::Bool(*l && *r)),
        (Value::Bool(l), BinaryOp::Or, Value::Bool(r)) => Ok(Value::Bool(*l || *r)),
        _ => Err(ExpressionError::TypeMismatch(format!(
            "cannot apply {:?} to {} and {}",
            op,
            left.type_name(),
            right.type_name()
        ))),
    }
}

/// Execute a unary operation
pub(crate) fn execute_unary(operand: &Value, op: UnaryOp) -> Result<Value> {
    match (op, operand) {
        (_, Value::Null) => Ok(Value::Null),
        (UnaryOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
        (UnaryOp::Negate, Value::Integer(i)) => i
            .checked_neg()
            .map(Value::Integer)
            .ok_or_else(|| ExpressionError::Overflow(format!("-{}", i))),
        (UnaryOp::Negate, Value::Double(d)) => Ok(Value::Double(-d)),
        _ => Err(ExpressionError::TypeMismatch(format!(
            "cannot apply {:?} to {}",
            op,
            operand.type_name()
        ))),
    }
}
