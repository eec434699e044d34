//! Built-in expression language
//!
//! A small boolean/arithmetic language sufficient for input entries such as
//! `cellInput == "gold"` or `age >= 18 and age < 65`, and output entries such as
//! `"approved"` or `base * 2`. Language tag: `simple` (also used when an
//! expression carries no tag).

mod operators;
mod parser;

use super::{ExpressionError, ExpressionEvaluator, VariableContext};
use operators::{execute_arithmetic, execute_compare, execute_logical, execute_unary, values_equal};
use parser::{BinaryOp, Node};
use tabula_core::{Expression, Value};

/// Evaluator for the built-in `simple` language
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleExpressionEvaluator;

impl SimpleExpressionEvaluator {
    /// Language tag handled by this evaluator
    pub const LANGUAGE: &'static str = "simple";

    /// Create a new evaluator
    pub fn new() -> Self {
        Self
    }

    fn eval(&self, node: &Node, context: &dyn VariableContext) -> Result<Value, ExpressionError> {
        match node {
            Node::Literal(value) => Ok(value.clone()),

            Node::Variable(name) => context
                .resolve(name)
                .cloned()
                .ok_or_else(|| ExpressionError::UnknownVariable(name.clone())),

            Node::Unary { op, operand } => {
                let operand = self.eval(operand, context)?;
                execute_unary(&operand, *op)
            }

            Node::Binary { left, op, right } => match op {
                BinaryOp::And | BinaryOp::Or => self.eval_logical(left, *op, right, context),
                BinaryOp::Eq
                | BinaryOp::Ne
                | BinaryOp::Lt
                | BinaryOp::Le
                | BinaryOp::Gt
                | BinaryOp::Ge => {
                    let left = self.eval(left, context)?;
                    let right = self.eval(right, context)?;
                    execute_compare(&left, *op, &right).map(Value::Bool)
                }
                BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div => {
                    let left = self.eval(left, context)?;
                    let right = self.eval(right, context)?;
                    execute_arithmetic(&left, *op, &right)
                }
            },

            Node::Membership {
                value,
                list,
                negated,
            } => {
                let value = self.eval(value, context)?;
                let mut found = false;
                for item in list {
                    if values_equal(&value, &self.eval(item, context)?) {
                        found = true;
                        break;
                    }
                }
                Ok(Value::Bool(found != *negated))
            }
        }
    }

    /// `&&` and `||` short-circuit on the left operand
    fn eval_logical(
        &self,
        left: &Node,
        op: BinaryOp,
        right: &Node,
        context: &dyn VariableContext,
    ) -> Result<Value, ExpressionError> {
        let left = self.eval(left, context)?;
        match (op, &left) {
            (BinaryOp::And, Value::Bool(false)) => return Ok(Value::Bool(false)),
            (BinaryOp::Or, Value::Bool(true)) => return Ok(Value::Bool(true)),
            _ => {}
        }
        let right = self.eval(right, context)?;
        execute_logical(&left, op, &right)
    }
}

impl ExpressionEvaluator for SimpleExpressionEvaluator {
    fn evaluate(
        &self,
        expression: &Expression,
        context: &dyn VariableContext,
    ) -> Result<Value, ExpressionError> {
        match expression.language.as_deref() {
            None | Some(Self::LANGUAGE) => {}
            Some(other) => return Err(ExpressionError::UnsupportedLanguage(other.to_string())),
        }

        let node = parser::parse(&expression.text)?;
        self.eval(&node, context)
    }
}
