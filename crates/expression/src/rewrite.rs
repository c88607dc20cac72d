//! Structural rewrites: negation normal form and variable substitution.

use crate::expression::Expression;
use crate::value::Value;

impl Expression {
    /// Push every `Not` down to the atomic predicates (De Morgan).
    ///
    /// Comparisons absorb a negation by flipping their operator, boolean
    /// literals flip their value, and `optional`/`ignore` markers pass the
    /// negation through to their operand.
    #[must_use]
    pub fn push_down_not(&self) -> Expression {
        self.push_down(false)
    }

    fn push_down(&self, negate: bool) -> Expression {
        match self {
            Self::Not(child) => child.push_down(!negate),
            Self::And(children) => {
                let children = children.iter().map(|c| c.push_down(negate)).collect();
                if negate {
                    Self::Or(children)
                } else {
                    Self::And(children)
                }
            }
            Self::Or(children) => {
                let children = children.iter().map(|c| c.push_down(negate)).collect();
                if negate {
                    Self::And(children)
                } else {
                    Self::Or(children)
                }
            }
            Self::Optional(child) => Self::optional(child.push_down(negate)),
            Self::Ignore(child) => Self::ignore(child.push_down(negate)),
            Self::Constant(Value::Bool(b)) if negate => Self::Constant(Value::Bool(!b)),
            Self::Compare(op, left, right) if negate => {
                Self::Compare(op.negate(), left.clone(), right.clone())
            }
            leaf if negate => Self::not(leaf.clone()),
            leaf => leaf.clone(),
        }
    }

    /// Rebuild this node with every direct child replaced by `f(child)`.
    #[must_use]
    pub fn map_children(&self, mut f: impl FnMut(&Expression) -> Expression) -> Expression {
        match self {
            Self::Constant(_) | Self::Accessor(_) => self.clone(),
            Self::Not(c) => Self::not(f(&**c)),
            Self::Optional(c) => Self::optional(f(&**c)),
            Self::Ignore(c) => Self::ignore(f(&**c)),
            Self::Exists(c) => Self::Exists(Box::new(f(&**c))),
            Self::And(cs) => Self::And(cs.iter().map(f).collect()),
            Self::Or(cs) => Self::Or(cs.iter().map(f).collect()),
            Self::Compare(op, l, r) => Self::compare(*op, f(&**l), f(&**r)),
        }
    }

    /// Replace every accessor of `variable` with an accessor of `binding`.
    ///
    /// Returns the rewritten expression and whether anything changed.
    #[must_use]
    pub fn substitute(&self, variable: &str, binding: &str) -> (Expression, bool) {
        match self {
            Self::Accessor(name) if name == variable => (Self::accessor(binding), true),
            Self::Constant(_) | Self::Accessor(_) => (self.clone(), false),
            _ => {
                let mut changed = false;
                let rewritten = self.map_children(|child| {
                    let (child, child_changed) = child.substitute(variable, binding);
                    changed |= child_changed;
                    child
                });
                if changed {
                    (rewritten, true)
                } else {
                    (self.clone(), false)
                }
            }
        }
    }

    /// Does any accessor in this expression read `variable`?
    #[must_use]
    pub fn references(&self, variable: &str) -> bool {
        match self {
            Self::Accessor(name) => name == variable,
            _ => self.children().into_iter().any(|c| c.references(variable)),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{ComparisonOperator, Expression};

    fn lt(name: &str, v: i64) -> Expression {
        Expression::compare(
            ComparisonOperator::LessThan,
            Expression::accessor(name),
            Expression::constant(v),
        )
    }

    #[test]
    fn de_morgan() {
        let e = Expression::not(Expression::and(vec![
            Expression::exists("a"),
            Expression::or(vec![Expression::exists("b"), lt("c", 3)]),
        ]));
        assert_eq!(
            e.push_down_not().to_string(),
            "!exists(a) || (!exists(b) && c >= 3)"
        );
    }

    #[test]
    fn double_negation_and_literals() {
        let e = Expression::not(Expression::not(Expression::exists("a")));
        assert_eq!(e.push_down_not(), Expression::exists("a"));
        let f = Expression::not(Expression::constant(true));
        assert_eq!(f.push_down_not(), Expression::constant(false));
    }

    #[test]
    fn negation_passes_through_markers() {
        let e = Expression::not(Expression::optional(Expression::exists("a")));
        assert_eq!(
            e.push_down_not(),
            Expression::optional(Expression::not(Expression::exists("a")))
        );
        let i = Expression::not(Expression::ignore(lt("a", 1)));
        assert_eq!(i.push_down_not().to_string(), "ignore(a >= 1)");
    }

    #[test]
    fn substitute_rewrites_nested_accessors() {
        let e = Expression::and(vec![Expression::exists("x"), lt("x", 3), lt("y", 1)]);
        let (s, changed) = e.substitute("x", "a");
        assert!(changed);
        assert_eq!(s.to_string(), "exists(a) && a < 3 && y < 1");

        let (same, changed) = e.substitute("z", "a");
        assert!(!changed);
        assert_eq!(same, e);
    }

    #[test]
    fn references_variable() {
        assert!(lt("x", 1).references("x"));
        assert!(!Expression::exists("y").references("x"));
    }
}
