//! Host-supplied capabilities: predicate comparers and clause optimizers.

use crate::clause::Clause;
use crate::relationship::Relationship;
use expression::{ComparisonOperator, Expression, ExpressionType, Value};
use std::collections::HashMap;
use std::fmt;

/// Decides how two predicates of the same [`ExpressionType`] relate.
pub trait PredicateComparer {
    fn relationship(&self, predicate: &Expression, other: &Expression) -> Relationship;
}

impl<F> PredicateComparer for F
where
    F: Fn(&Expression, &Expression) -> Relationship,
{
    fn relationship(&self, predicate: &Expression, other: &Expression) -> Relationship {
        self(predicate, other)
    }
}

/// Rewrites a freshly generated clause in place (e.g. algebraic simplification).
pub trait ClauseOptimizer {
    fn optimize(&self, clause: &mut Clause);
}

impl<F> ClauseOptimizer for F
where
    F: Fn(&mut Clause),
{
    fn optimize(&self, clause: &mut Clause) {
        self(clause)
    }
}

/// Registry of predicate comparers keyed by predicate type.
#[derive(Default)]
pub struct Comparers {
    by_type: HashMap<ExpressionType, Box<dyn PredicateComparer>>,
}

impl Comparers {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the comparer for `expression_type`.
    pub fn register(
        &mut self,
        expression_type: ExpressionType,
        comparer: impl PredicateComparer + 'static,
    ) {
        self.by_type.insert(expression_type, Box::new(comparer));
    }

    #[must_use]
    pub fn get(&self, expression_type: ExpressionType) -> Option<&dyn PredicateComparer> {
        self.by_type.get(&expression_type).map(|c| c.as_ref())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_type.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_type.is_empty()
    }

    /// Relationship between two predicates.
    ///
    /// Two negations compare their operands and invert the answer. A
    /// registered comparer is consulted only when both sides share a type;
    /// otherwise the answer is `Equal` or `Incomparable` by deep equality.
    #[must_use]
    pub fn predicate_relationship(&self, predicate: &Expression, other: &Expression) -> Relationship {
        if let (Expression::Not(p), Expression::Not(q)) = (predicate, other) {
            return self.predicate_relationship(p, q).swap();
        }

        let expression_type = predicate.expression_type();
        if expression_type == other.expression_type() {
            if let Some(comparer) = self.get(expression_type) {
                return comparer.relationship(predicate, other);
            }
        }

        if predicate.deep_equals(other) {
            Relationship::Equal
        } else {
            Relationship::Incomparable
        }
    }
}

impl fmt::Debug for Comparers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut types: Vec<_> = self.by_type.keys().collect();
        types.sort();
        f.debug_struct("Comparers").field("types", &types).finish()
    }
}

/// Comparer for `accessor op integer` bounds under `<`, `<=`, `>`, `>=`.
///
/// With the same accessor and operator the tighter bound specializes the
/// looser one: `x > 5` specializes `x > 3`, `x < 2` specializes `x < 4`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NumericBoundComparer;

impl NumericBoundComparer {
    /// Register this comparer for every ordering operator.
    pub fn register_all(comparers: &mut Comparers) {
        for ty in [
            ExpressionType::LessThan,
            ExpressionType::LessThanOrEqual,
            ExpressionType::GreaterThan,
            ExpressionType::GreaterThanOrEqual,
        ] {
            comparers.register(ty, NumericBoundComparer);
        }
    }

    fn bound(expression: &Expression) -> Option<(ComparisonOperator, &str, i64)> {
        match expression {
            Expression::Compare(op, left, right) => match (&**left, &**right) {
                (Expression::Accessor(name), Expression::Constant(Value::Integer(v))) => {
                    Some((*op, name.as_str(), *v))
                }
                _ => None,
            },
            _ => None,
        }
    }
}

impl PredicateComparer for NumericBoundComparer {
    fn relationship(&self, predicate: &Expression, other: &Expression) -> Relationship {
        use std::cmp::Ordering;

        match (Self::bound(predicate), Self::bound(other)) {
            (Some((op_a, name_a, a)), Some((op_b, name_b, b)))
                if op_a == op_b && name_a == name_b && op_a.is_ordering() =>
            {
                let tighter = match op_a {
                    ComparisonOperator::GreaterThan | ComparisonOperator::GreaterThanOrEqual => {
                        a.cmp(&b)
                    }
                    _ => b.cmp(&a),
                };
                match tighter {
                    Ordering::Equal => Relationship::Equal,
                    Ordering::Greater => Relationship::Specializes,
                    Ordering::Less => Relationship::Generalizes,
                }
            }
            _ if predicate.deep_equals(other) => Relationship::Equal,
            _ => Relationship::Incomparable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmp(op: ComparisonOperator, name: &str, v: i64) -> Expression {
        Expression::compare(op, Expression::accessor(name), Expression::constant(v))
    }

    fn comparers() -> Comparers {
        let mut comparers = Comparers::new();
        NumericBoundComparer::register_all(&mut comparers);
        comparers
    }

    #[test]
    fn structural_fallback_without_comparer() {
        let comparers = Comparers::new();
        let a = Expression::exists("a");
        assert_eq!(
            comparers.predicate_relationship(&a, &a.clone()),
            Relationship::Equal
        );
        assert_eq!(
            comparers.predicate_relationship(&a, &Expression::exists("b")),
            Relationship::Incomparable
        );
    }

    #[test]
    fn numeric_bounds() {
        let comparers = comparers();
        let gt5 = cmp(ComparisonOperator::GreaterThan, "x", 5);
        let gt3 = cmp(ComparisonOperator::GreaterThan, "x", 3);
        let lt2 = cmp(ComparisonOperator::LessThan, "x", 2);
        let lt4 = cmp(ComparisonOperator::LessThan, "x", 4);
        assert_eq!(comparers.predicate_relationship(&gt5, &gt3), Relationship::Specializes);
        assert_eq!(comparers.predicate_relationship(&gt3, &gt5), Relationship::Generalizes);
        assert_eq!(comparers.predicate_relationship(&lt2, &lt4), Relationship::Specializes);
        assert_eq!(comparers.predicate_relationship(&gt5, &lt4), Relationship::Incomparable);
        assert_eq!(
            comparers.predicate_relationship(&gt5, &cmp(ComparisonOperator::GreaterThan, "y", 5)),
            Relationship::Incomparable
        );
    }

    #[test]
    fn negation_inverts_comparer_answer() {
        let comparers = comparers();
        let not_gt5 = Expression::not(cmp(ComparisonOperator::GreaterThan, "x", 5));
        let not_gt3 = Expression::not(cmp(ComparisonOperator::GreaterThan, "x", 3));
        assert_eq!(
            comparers.predicate_relationship(&not_gt5, &not_gt3),
            Relationship::Generalizes
        );
    }

    #[test]
    fn comparer_needs_matching_types() {
        let mut comparers = Comparers::new();
        comparers.register(ExpressionType::Exists, |_: &Expression, _: &Expression| {
            Relationship::Specializes
        });
        let exists = Expression::exists("a");
        assert_eq!(
            comparers.predicate_relationship(&exists, &Expression::exists("b")),
            Relationship::Specializes
        );
        assert_eq!(
            comparers.predicate_relationship(&exists, &Expression::accessor("a")),
            Relationship::Incomparable
        );
        assert_eq!(comparers.len(), 1);
    }
}
