//! Expression trees.
//!
//! - [`ComparisonOperator`]: `== | != | < | <= | > | >=`
//! - [`ExpressionType`]: one identifier per node kind, used to key comparers
//! - [`Expression`]: the tree itself
//!
//! # Example
//! ```rust
//! use expression::{ComparisonOperator, Expression};
//! let e = Expression::and(vec![
//!     Expression::exists("blah"),
//!     Expression::compare(ComparisonOperator::Equal, Expression::accessor("woof"), Expression::constant(3)),
//! ]);
//! assert_eq!(e.to_string(), "exists(blah) && woof == 3");
//! ```

use crate::value::Value;
use common::{compute_fp, compute_unordered_fp};
use itertools::Itertools;
use std::fmt;

/// Comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOperator {
    Equal,              // ==
    NotEqual,           // !=
    LessThan,           // <
    LessThanOrEqual,    // <=
    GreaterThan,        // >
    GreaterThanOrEqual, // >=
}

impl ComparisonOperator {
    /// The operator whose result is the logical negation of this one.
    #[must_use]
    pub fn negate(self) -> Self {
        match self {
            Self::Equal => Self::NotEqual,
            Self::NotEqual => Self::Equal,
            Self::LessThan => Self::GreaterThanOrEqual,
            Self::LessThanOrEqual => Self::GreaterThan,
            Self::GreaterThan => Self::LessThanOrEqual,
            Self::GreaterThanOrEqual => Self::LessThan,
        }
    }

    /// `==` and `!=` compare any two values; the rest need matching kinds.
    #[must_use]
    #[inline]
    pub fn is_ordering(self) -> bool {
        !matches!(self, Self::Equal | Self::NotEqual)
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sym = match self {
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::LessThan => "<",
            Self::LessThanOrEqual => "<=",
            Self::GreaterThan => ">",
            Self::GreaterThanOrEqual => ">=",
        };
        write!(f, "{sym}")
    }
}

/// Kind of an expression node. Predicate comparers are registered per type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ExpressionType {
    Constant,
    Accessor,
    Not,
    And,
    Or,
    Optional,
    Ignore,
    Exists,
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
}

impl From<ComparisonOperator> for ExpressionType {
    fn from(op: ComparisonOperator) -> Self {
        match op {
            ComparisonOperator::Equal => Self::Equal,
            ComparisonOperator::NotEqual => Self::NotEqual,
            ComparisonOperator::LessThan => Self::LessThan,
            ComparisonOperator::LessThanOrEqual => Self::LessThanOrEqual,
            ComparisonOperator::GreaterThan => Self::GreaterThan,
            ComparisonOperator::GreaterThanOrEqual => Self::GreaterThanOrEqual,
        }
    }
}

/// A boolean (or value) expression over a [`Memory`](crate::Memory).
///
/// `Optional` and `Ignore` are markers understood by trigger normalization:
/// `optional(e)` may be present or absent, `ignore(e)` is checked only when a
/// trigger fires and never takes part in structural comparison.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expression {
    Constant(Value),
    Accessor(String),
    Not(Box<Expression>),
    And(Vec<Expression>),
    Or(Vec<Expression>),
    Optional(Box<Expression>),
    Ignore(Box<Expression>),
    Exists(Box<Expression>),
    Compare(ComparisonOperator, Box<Expression>, Box<Expression>),
}

impl Expression {
    #[must_use]
    pub fn constant(value: impl Into<Value>) -> Self {
        Self::Constant(value.into())
    }

    #[must_use]
    pub fn accessor(name: impl Into<String>) -> Self {
        Self::Accessor(name.into())
    }

    /// `exists(name)`.
    #[must_use]
    pub fn exists(name: impl Into<String>) -> Self {
        Self::Exists(Box::new(Self::accessor(name)))
    }

    #[allow(clippy::should_implement_trait)]
    #[must_use]
    pub fn not(child: Expression) -> Self {
        Self::Not(Box::new(child))
    }

    #[must_use]
    pub fn and(children: Vec<Expression>) -> Self {
        Self::And(children)
    }

    #[must_use]
    pub fn or(children: Vec<Expression>) -> Self {
        Self::Or(children)
    }

    #[must_use]
    pub fn optional(child: Expression) -> Self {
        Self::Optional(Box::new(child))
    }

    #[must_use]
    pub fn ignore(child: Expression) -> Self {
        Self::Ignore(Box::new(child))
    }

    #[must_use]
    pub fn compare(op: ComparisonOperator, left: Expression, right: Expression) -> Self {
        Self::Compare(op, Box::new(left), Box::new(right))
    }

    /// Node kind, the key used to look up a predicate comparer.
    #[must_use]
    pub fn expression_type(&self) -> ExpressionType {
        match self {
            Self::Constant(_) => ExpressionType::Constant,
            Self::Accessor(_) => ExpressionType::Accessor,
            Self::Not(_) => ExpressionType::Not,
            Self::And(_) => ExpressionType::And,
            Self::Or(_) => ExpressionType::Or,
            Self::Optional(_) => ExpressionType::Optional,
            Self::Ignore(_) => ExpressionType::Ignore,
            Self::Exists(_) => ExpressionType::Exists,
            Self::Compare(op, _, _) => (*op).into(),
        }
    }

    /// Direct children in order.
    #[must_use]
    pub fn children(&self) -> Vec<&Expression> {
        match self {
            Self::Constant(_) | Self::Accessor(_) => vec![],
            Self::Not(c) | Self::Optional(c) | Self::Ignore(c) | Self::Exists(c) => vec![&**c],
            Self::And(cs) | Self::Or(cs) => cs.iter().collect(),
            Self::Compare(_, l, r) => vec![&**l, &**r],
        }
    }

    /// The literal boolean this expression is, if it is one.
    #[must_use]
    pub fn as_bool_constant(&self) -> Option<bool> {
        match self {
            Self::Constant(v) => v.as_bool(),
            _ => None,
        }
    }

    /// Structural equality where `And`/`Or` operands are compared as
    /// multisets; every other node compares its children in order.
    #[must_use]
    pub fn deep_equals(&self, other: &Expression) -> bool {
        match (self, other) {
            (Self::Constant(a), Self::Constant(b)) => a == b,
            (Self::Accessor(a), Self::Accessor(b)) => a == b,
            (Self::Not(a), Self::Not(b))
            | (Self::Optional(a), Self::Optional(b))
            | (Self::Ignore(a), Self::Ignore(b))
            | (Self::Exists(a), Self::Exists(b)) => a.deep_equals(b),
            (Self::And(a), Self::And(b)) | (Self::Or(a), Self::Or(b)) => {
                same_multiset(a, b)
            }
            (Self::Compare(op_a, la, ra), Self::Compare(op_b, lb, rb)) => {
                op_a == op_b && la.deep_equals(lb) && ra.deep_equals(rb)
            }
            _ => false,
        }
    }

    /// Fingerprint consistent with [`Expression::deep_equals`]: deep-equal
    /// expressions always share a canonical hash.
    #[must_use]
    pub fn canonical_hash(&self) -> u64 {
        match self {
            Self::Constant(v) => compute_fp(("const", v)),
            Self::Accessor(name) => compute_fp(("accessor", name)),
            Self::And(cs) | Self::Or(cs) => compute_unordered_fp(
                self.expression_type(),
                cs.iter().map(Expression::canonical_hash),
            ),
            _ => compute_fp((
                self.expression_type(),
                self.children()
                    .into_iter()
                    .map(Expression::canonical_hash)
                    .collect::<Vec<_>>(),
            )),
        }
    }

    fn is_compound(&self) -> bool {
        matches!(self, Self::And(_) | Self::Or(_) | Self::Compare(..))
    }
}

/// Multiset equality of two expression lists under deep equality.
#[must_use]
pub fn same_multiset(a: &[Expression], b: &[Expression]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut used = vec![false; b.len()];
    a.iter().all(|x| {
        match (0..b.len()).find(|&j| !used[j] && x.deep_equals(&b[j])) {
            Some(j) => {
                used[j] = true;
                true
            }
            None => false,
        }
    })
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn operand(e: &Expression) -> String {
            if e.is_compound() {
                format!("({e})")
            } else {
                e.to_string()
            }
        }

        fn junct(e: &Expression) -> String {
            if matches!(e, Expression::And(_) | Expression::Or(_)) {
                format!("({e})")
            } else {
                e.to_string()
            }
        }

        match self {
            Self::Constant(v) => write!(f, "{v}"),
            Self::Accessor(name) => write!(f, "{name}"),
            Self::Not(c) => write!(f, "!{}", operand(c)),
            Self::And(cs) if cs.is_empty() => write!(f, "true"),
            Self::Or(cs) if cs.is_empty() => write!(f, "false"),
            Self::And(cs) => write!(f, "{}", cs.iter().map(junct).join(" && ")),
            Self::Or(cs) => write!(f, "{}", cs.iter().map(junct).join(" || ")),
            Self::Optional(c) => write!(f, "optional({c})"),
            Self::Ignore(c) => write!(f, "ignore({c})"),
            Self::Exists(c) => write!(f, "exists({c})"),
            Self::Compare(op, l, r) => write!(f, "{} {op} {}", operand(l), operand(r)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gt(name: &str, v: i64) -> Expression {
        Expression::compare(
            ComparisonOperator::GreaterThan,
            Expression::accessor(name),
            Expression::constant(v),
        )
    }

    #[test]
    fn display_golden() {
        let e = Expression::or(vec![
            Expression::and(vec![Expression::exists("a"), gt("b", 3)]),
            Expression::not(Expression::exists("c")),
        ]);
        assert_eq!(e.to_string(), "(exists(a) && b > 3) || !exists(c)");
        assert_eq!(Expression::and(vec![]).to_string(), "true");
        assert_eq!(
            Expression::ignore(Expression::not(Expression::exists("foo"))).to_string(),
            "ignore(!exists(foo))"
        );
    }

    #[test]
    fn deep_equals_ignores_conjunct_order() {
        let a = Expression::and(vec![Expression::exists("a"), gt("b", 3)]);
        let b = Expression::and(vec![gt("b", 3), Expression::exists("a")]);
        assert!(a.deep_equals(&b));
        assert_ne!(a, b);
        assert_eq!(a.canonical_hash(), b.canonical_hash());
    }

    #[test]
    fn deep_equals_respects_comparison_operands() {
        let a = Expression::compare(
            ComparisonOperator::LessThan,
            Expression::accessor("x"),
            Expression::constant(1),
        );
        let b = Expression::compare(
            ComparisonOperator::LessThan,
            Expression::constant(1),
            Expression::accessor("x"),
        );
        assert!(!a.deep_equals(&b));
        assert!(a.deep_equals(&a.clone()));
    }

    #[test]
    fn multiset_counts_duplicates() {
        let x = Expression::exists("x");
        let y = Expression::exists("y");
        assert!(!same_multiset(&[x.clone(), x.clone()], &[x.clone(), y.clone()]));
        assert!(same_multiset(&[x.clone(), y.clone()], &[y, x]));
    }

    #[test]
    fn expression_types() {
        assert_eq!(gt("a", 1).expression_type(), ExpressionType::GreaterThan);
        assert_eq!(Expression::exists("a").expression_type(), ExpressionType::Exists);
        assert_eq!(
            ComparisonOperator::LessThan.negate(),
            ComparisonOperator::GreaterThanOrEqual
        );
    }
}
