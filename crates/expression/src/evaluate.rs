//! Evaluation of expressions against a [`Memory`].

use crate::error::{EvalError, Result};
use crate::expression::{ComparisonOperator, Expression};
use crate::value::{Memory, Value};
use std::cmp::Ordering;

impl Expression {
    /// Evaluate to a value. Pure: repeated calls with the same memory agree.
    pub fn evaluate(&self, memory: &Memory) -> Result<Value> {
        match self {
            Self::Constant(v) => Ok(v.clone()),
            Self::Accessor(name) => Ok(memory.get(name).clone()),
            Self::Not(child) => Ok(Value::Bool(!child.evaluate(memory)?.is_truthy())),
            Self::And(children) => {
                for child in children {
                    if !child.evaluate(memory)?.is_truthy() {
                        return Ok(Value::Bool(false));
                    }
                }
                Ok(Value::Bool(true))
            }
            Self::Or(children) => {
                for child in children {
                    if child.evaluate(memory)?.is_truthy() {
                        return Ok(Value::Bool(true));
                    }
                }
                Ok(Value::Bool(false))
            }
            // May be present or absent, so it never constrains on its own.
            Self::Optional(_) => Ok(Value::Bool(true)),
            Self::Ignore(child) => child.evaluate(memory),
            Self::Exists(child) => Ok(Value::Bool(!child.evaluate(memory)?.is_null())),
            Self::Compare(op, left, right) => {
                let left = left.evaluate(memory)?;
                let right = right.evaluate(memory)?;
                compare(*op, &left, &right).map(Value::Bool)
            }
        }
    }

    /// Evaluate and interpret the result by truthiness.
    pub fn try_evaluate_bool(&self, memory: &Memory) -> Result<bool> {
        self.evaluate(memory).map(|v| v.is_truthy())
    }
}

fn compare(op: ComparisonOperator, left: &Value, right: &Value) -> Result<bool> {
    let ordering = || match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => Ok(a.cmp(b)),
        (Value::Text(a), Value::Text(b)) => Ok(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Ok(a.cmp(b)),
        _ => Err(EvalError::TypeMismatch {
            op: op.to_string(),
            left: left.kind(),
            right: right.kind(),
        }),
    };

    Ok(match op {
        ComparisonOperator::Equal => left == right,
        ComparisonOperator::NotEqual => left != right,
        ComparisonOperator::LessThan => ordering()? == Ordering::Less,
        ComparisonOperator::LessThanOrEqual => ordering()? != Ordering::Greater,
        ComparisonOperator::GreaterThan => ordering()? == Ordering::Greater,
        ComparisonOperator::GreaterThanOrEqual => ordering()? != Ordering::Less,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmp(op: ComparisonOperator, name: &str, v: i64) -> Expression {
        Expression::compare(op, Expression::accessor(name), Expression::constant(v))
    }

    #[test]
    fn exists_and_comparisons() {
        let memory = Memory::new().with("blah", 1).with("woof", 3);
        let e = Expression::and(vec![
            Expression::exists("blah"),
            cmp(ComparisonOperator::Equal, "woof", 3),
        ]);
        assert_eq!(e.try_evaluate_bool(&memory), Ok(true));
        assert_eq!(Expression::exists("foo").try_evaluate_bool(&memory), Ok(false));
        assert_eq!(
            cmp(ComparisonOperator::GreaterThanOrEqual, "woof", 4).try_evaluate_bool(&memory),
            Ok(false)
        );
    }

    #[test]
    fn ordering_against_null_is_an_error() {
        let memory = Memory::new();
        let err = cmp(ComparisonOperator::LessThan, "missing", 3)
            .try_evaluate_bool(&memory)
            .unwrap_err();
        assert!(matches!(err, EvalError::TypeMismatch { left: "null", .. }));
        // Equality works across kinds.
        assert_eq!(
            cmp(ComparisonOperator::NotEqual, "missing", 3).try_evaluate_bool(&memory),
            Ok(true)
        );
    }

    #[test]
    fn empty_and_is_true_empty_or_is_false() {
        let memory = Memory::new();
        assert_eq!(Expression::and(vec![]).try_evaluate_bool(&memory), Ok(true));
        assert_eq!(Expression::or(vec![]).try_evaluate_bool(&memory), Ok(false));
    }

    #[test]
    fn short_circuit_skips_errors() {
        let memory = Memory::new();
        let bad = cmp(ComparisonOperator::LessThan, "missing", 3);
        let e = Expression::or(vec![Expression::constant(true), bad]);
        assert_eq!(e.try_evaluate_bool(&memory), Ok(true));
    }
}
