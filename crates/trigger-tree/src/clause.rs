//! Clauses: one conjunction of a trigger's disjunctive normal form.

use crate::comparer::Comparers;
use crate::relationship::Relationship;
use common::{compute_fp, compute_unordered_fp};
use expression::{same_multiset, Expression, Memory};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// A conjunction of predicates plus the quantifier bindings that produced it.
#[derive(Debug, Clone, Default)]
pub struct Clause {
    conjuncts: Vec<Expression>,
    // quantifier variable -> chosen binding
    bindings: BTreeMap<String, String>,
    // checked when a trigger fires, never compared structurally
    ignored: Option<Expression>,
    subsumed: bool,
}

impl Clause {
    #[must_use]
    pub fn new(conjuncts: Vec<Expression>) -> Self {
        Self {
            conjuncts,
            ..Self::default()
        }
    }

    /// The empty clause, which is always true.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    #[inline]
    pub fn conjuncts(&self) -> &[Expression] {
        &self.conjuncts
    }

    /// Mutable access for clause optimizers.
    #[inline]
    pub fn conjuncts_mut(&mut self) -> &mut Vec<Expression> {
        &mut self.conjuncts
    }

    #[must_use]
    #[inline]
    pub fn bindings(&self) -> &BTreeMap<String, String> {
        &self.bindings
    }

    /// Binding recorded for a quantifier variable.
    #[must_use]
    pub fn binding(&self, variable: &str) -> Option<&str> {
        self.bindings.get(variable).map(String::as_str)
    }

    pub(crate) fn bind(&mut self, variable: &str, binding: &str) {
        self.bindings.insert(variable.to_string(), binding.to_string());
    }

    #[must_use]
    #[inline]
    pub fn ignored(&self) -> Option<&Expression> {
        self.ignored.as_ref()
    }

    #[must_use]
    #[inline]
    pub fn is_subsumed(&self) -> bool {
        self.subsumed
    }

    pub(crate) fn mark_subsumed(&mut self) {
        self.subsumed = true;
    }

    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.conjuncts.len()
    }

    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.conjuncts.is_empty()
    }

    /// Copy carrying only conjuncts and bindings, as stored in tree nodes.
    #[must_use]
    pub fn without_ignored(&self) -> Self {
        Self {
            conjuncts: self.conjuncts.clone(),
            bindings: self.bindings.clone(),
            ignored: None,
            subsumed: false,
        }
    }

    /// Evaluate the conjunction (ignored part excluded).
    pub fn try_evaluate(&self, memory: &Memory) -> expression::Result<bool> {
        for conjunct in &self.conjuncts {
            if !conjunct.try_evaluate_bool(memory)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Same conjunct multiset and same bindings.
    #[must_use]
    pub fn deep_equals(&self, other: &Clause) -> bool {
        self.bindings == other.bindings && same_multiset(&self.conjuncts, &other.conjuncts)
    }

    /// Fingerprint consistent with [`Clause::deep_equals`].
    #[must_use]
    pub fn canonical_hash(&self) -> u64 {
        let conjuncts =
            compute_unordered_fp("clause", self.conjuncts.iter().map(Expression::canonical_hash));
        compute_fp((conjuncts, &self.bindings))
    }

    /// Drop conjuncts deep-equal to an earlier conjunct.
    pub(crate) fn remove_duplicate_predicates(&mut self) {
        let conjuncts = std::mem::take(&mut self.conjuncts);
        self.conjuncts = dedup_by_hash(conjuncts, Expression::canonical_hash, |a, b| {
            a.deep_equals(b)
        });
    }

    /// Move `ignore(..)` conjuncts into the ignored expression.
    pub(crate) fn split_ignores(&mut self) {
        let mut ignores = Vec::new();
        let mut conjuncts = Vec::with_capacity(self.conjuncts.len());
        for conjunct in std::mem::take(&mut self.conjuncts) {
            match conjunct {
                Expression::Ignore(inner) => ignores.push(*inner),
                other => conjuncts.push(other),
            }
        }
        self.conjuncts = conjuncts;
        self.ignored = match ignores.len() {
            0 => None,
            1 => ignores.pop(),
            _ => Some(Expression::and(ignores)),
        };
    }

    /// Relationship of this clause to `other` under `comparers`.
    ///
    /// A clause covers another when each of its predicates equals or
    /// generalizes some predicate of the other. Mutual cover is `Equal`,
    /// one-way cover gives the direction. A clause never equals a clause of
    /// a different length; at best the shorter one generalizes the longer.
    /// Equal clauses are then told apart by their quantifier bindings.
    #[must_use]
    pub fn relationship(&self, other: &Clause, comparers: &Comparers) -> Relationship {
        let swapped = other.len() < self.len();
        let (shorter, longer) = if swapped { (other, self) } else { (self, other) };

        let up = shorter.covers(longer, comparers);
        let down = longer.covers(shorter, comparers);
        let mut so_far = match (up, down) {
            (true, true) => Relationship::Equal,
            (true, false) => Relationship::Generalizes,
            (false, true) => Relationship::Specializes,
            (false, false) => Relationship::Incomparable,
        };
        if shorter.len() != longer.len() {
            so_far = match so_far {
                Relationship::Equal | Relationship::Generalizes => Relationship::Generalizes,
                _ => Relationship::Incomparable,
            };
        }

        bindings_relationship(so_far, shorter, longer).swap_if(swapped)
    }

    /// Every predicate here equals or generalizes one of `other`'s.
    fn covers(&self, other: &Clause, comparers: &Comparers) -> bool {
        self.conjuncts.iter().all(|predicate| {
            other.conjuncts.iter().any(|candidate| {
                matches!(
                    comparers.predicate_relationship(predicate, candidate),
                    Relationship::Equal | Relationship::Generalizes
                )
            })
        })
    }

    /// Does this (trigger) clause fire for `node_clause` under `memory`?
    ///
    /// The conjuncts must describe the node clause and the ignored
    /// expression, if any, must evaluate true.
    #[must_use]
    pub fn matches(&self, node_clause: &Clause, memory: &Memory, comparers: &Comparers) -> bool {
        let same = self.deep_equals(node_clause)
            || self.relationship(node_clause, comparers) == Relationship::Equal;
        if !same {
            return false;
        }
        match &self.ignored {
            Some(ignored) => matches!(ignored.try_evaluate_bool(memory), Ok(true)),
            None => true,
        }
    }
}

/// Refine an `Equal` clause relationship by the quantifier bindings.
///
/// The smaller binding map must be contained in the larger one; a strictly
/// smaller map makes its clause the specialization.
fn bindings_relationship(so_far: Relationship, shorter: &Clause, longer: &Clause) -> Relationship {
    if so_far != Relationship::Equal {
        return so_far;
    }

    let swapped = shorter.bindings.len() > longer.bindings.len();
    let (small, large) = if swapped {
        (&longer.bindings, &shorter.bindings)
    } else {
        (&shorter.bindings, &longer.bindings)
    };

    let contained = small.iter().all(|(k, v)| large.get(k) == Some(v));
    let relationship = if !contained {
        Relationship::Incomparable
    } else if small.len() < large.len() {
        Relationship::Specializes
    } else {
        Relationship::Equal
    };
    relationship.swap_if(swapped)
}

/// Keep the first of every group of `eq`-equal items, bucketing by `hash`.
pub(crate) fn dedup_by_hash<T>(
    items: Vec<T>,
    hash: impl Fn(&T) -> u64,
    eq: impl Fn(&T, &T) -> bool,
) -> Vec<T> {
    let mut buckets: HashMap<u64, Vec<usize>> = HashMap::new();
    let mut kept: Vec<T> = Vec::with_capacity(items.len());
    for item in items {
        let bucket = buckets.entry(hash(&item)).or_default();
        if bucket.iter().any(|&i| eq(&kept[i], &item)) {
            continue;
        }
        bucket.push(kept.len());
        kept.push(item);
    }
    kept
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.subsumed {
            write!(f, "*")?;
        }
        write!(f, "(")?;
        for (i, conjunct) in self.conjuncts.iter().enumerate() {
            if i > 0 {
                write!(f, " && ")?;
            }
            write!(f, "{conjunct}")?;
        }
        write!(f, ")")?;
        if let Some(ignored) = &self.ignored {
            write!(f, " ignored({ignored})")?;
        }
        for (variable, binding) in &self.bindings {
            write!(f, " {variable}->{binding}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comparer::NumericBoundComparer;
    use expression::ComparisonOperator;

    fn gt(name: &str, v: i64) -> Expression {
        Expression::compare(
            ComparisonOperator::GreaterThan,
            Expression::accessor(name),
            Expression::constant(v),
        )
    }

    fn lt(name: &str, v: i64) -> Expression {
        Expression::compare(
            ComparisonOperator::LessThan,
            Expression::accessor(name),
            Expression::constant(v),
        )
    }

    fn clause(names: &[&str]) -> Clause {
        Clause::new(names.iter().map(|n| Expression::exists(*n)).collect())
    }

    fn numeric() -> Comparers {
        let mut comparers = Comparers::new();
        NumericBoundComparer::register_all(&mut comparers);
        comparers
    }

    #[test]
    fn structural_relationships() {
        let comparers = Comparers::new();
        let a = clause(&["a"]);
        let ab = clause(&["a", "b"]);
        let ba = clause(&["b", "a"]);
        let c = clause(&["c"]);
        assert_eq!(a.relationship(&ab, &comparers), Relationship::Generalizes);
        assert_eq!(ab.relationship(&a, &comparers), Relationship::Specializes);
        assert_eq!(ab.relationship(&ba, &comparers), Relationship::Equal);
        assert_eq!(a.relationship(&c, &comparers), Relationship::Incomparable);
        assert_eq!(Clause::empty().relationship(&a, &comparers), Relationship::Generalizes);
        assert_eq!(
            Clause::empty().relationship(&Clause::empty(), &comparers),
            Relationship::Equal
        );
    }

    #[test]
    fn comparer_driven_relationships() {
        let comparers = numeric();
        let tight = Clause::new(vec![Expression::exists("a"), gt("x", 5)]);
        let loose = Clause::new(vec![Expression::exists("a"), gt("x", 3)]);
        assert_eq!(tight.relationship(&loose, &comparers), Relationship::Specializes);
        assert_eq!(loose.relationship(&tight, &comparers), Relationship::Generalizes);

        // A shorter clause whose predicate is tighter cannot generalize.
        let short_tight = Clause::new(vec![gt("x", 5)]);
        let long_loose = Clause::new(vec![gt("x", 3), Expression::exists("a")]);
        assert_eq!(
            short_tight.relationship(&long_loose, &comparers),
            Relationship::Incomparable
        );
        assert_eq!(
            long_loose.relationship(&short_tight, &comparers),
            Relationship::Incomparable
        );
    }

    #[test]
    fn relationship_ignores_conjunct_order() {
        let comparers = numeric();
        let tight = [gt("x", 5), Expression::exists("a")];
        let loose = [gt("x", 3), Expression::exists("a")];
        for t in [tight.to_vec(), tight.iter().rev().cloned().collect()] {
            for l in [loose.to_vec(), loose.iter().rev().cloned().collect()] {
                let (t, l) = (Clause::new(t.clone()), Clause::new(l));
                assert_eq!(t.relationship(&l, &comparers), Relationship::Specializes);
                assert_eq!(l.relationship(&t, &comparers), Relationship::Generalizes);
            }
        }
    }

    #[test]
    fn opposite_directions_are_incomparable() {
        let comparers = numeric();
        let a = Clause::new(vec![gt("x", 5), gt("y", 1)]);
        let b = Clause::new(vec![gt("x", 3), gt("y", 2)]);
        assert_eq!(a.relationship(&b, &comparers), Relationship::Incomparable);
        assert_eq!(b.relationship(&a, &comparers), Relationship::Incomparable);
    }

    #[test]
    fn related_bounds_clause_equals_itself() {
        let comparers = numeric();
        let c = Clause::new(vec![lt("x", 1), lt("x", 5), Expression::exists("b")]);
        assert_eq!(c.relationship(&c.clone(), &comparers), Relationship::Equal);
    }

    #[test]
    fn same_size_relationship_is_symmetric() {
        // x < 5 is redundant next to x < 2, and x < 2 generalizes x < 1.
        let comparers = numeric();
        let loose = Clause::new(vec![lt("x", 5), lt("x", 2)]);
        let tight = Clause::new(vec![Expression::exists("b"), lt("x", 1)]);
        assert_eq!(loose.relationship(&tight, &comparers), Relationship::Generalizes);
        assert_eq!(tight.relationship(&loose, &comparers), Relationship::Specializes);
    }

    #[test]
    fn size_mismatch_never_equal() {
        // Pinned: the extra conjunct is a tautology, yet the shorter clause
        // only generalizes the longer one.
        let comparers = Comparers::new();
        let a = clause(&["a"]);
        let with_true = Clause::new(vec![Expression::exists("a"), Expression::constant(true)]);
        assert_eq!(a.relationship(&with_true, &comparers), Relationship::Generalizes);
        assert_eq!(with_true.relationship(&a, &comparers), Relationship::Specializes);
    }

    #[test]
    fn bindings_refine_equal_clauses() {
        let comparers = Comparers::new();
        let mut bound = clause(&["a"]);
        bound.bind("x", "a");
        let unbound = clause(&["a"]);
        let mut other = clause(&["a"]);
        other.bind("x", "b");

        assert_eq!(unbound.relationship(&bound, &comparers), Relationship::Specializes);
        assert_eq!(bound.relationship(&unbound, &comparers), Relationship::Generalizes);
        assert_eq!(bound.relationship(&other, &comparers), Relationship::Incomparable);
        assert_eq!(bound.relationship(&bound.clone(), &comparers), Relationship::Equal);
    }

    #[test]
    fn split_ignores_collects_markers() {
        let mut c = Clause::new(vec![
            Expression::ignore(Expression::not(Expression::exists("foo"))),
            Expression::exists("blah"),
            Expression::ignore(Expression::exists("bar")),
        ]);
        c.split_ignores();
        assert_eq!(c.conjuncts(), &[Expression::exists("blah")]);
        assert_eq!(
            c.ignored().map(ToString::to_string).as_deref(),
            Some("!exists(foo) && exists(bar)")
        );
        assert_eq!(
            c.to_string(),
            "(exists(blah)) ignored(!exists(foo) && exists(bar))"
        );
    }

    #[test]
    fn matches_checks_ignored() {
        let comparers = Comparers::new();
        let mut trigger_clause = Clause::new(vec![
            Expression::exists("blah"),
            Expression::ignore(Expression::exists("foo")),
        ]);
        trigger_clause.split_ignores();
        let node_clause = trigger_clause.without_ignored();

        let with_foo = Memory::new().with("blah", 1).with("foo", 1);
        let without_foo = Memory::new().with("blah", 1);
        assert!(trigger_clause.matches(&node_clause, &with_foo, &comparers));
        assert!(!trigger_clause.matches(&node_clause, &without_foo, &comparers));
        assert!(!trigger_clause.matches(&clause(&["other"]), &with_foo, &comparers));
    }

    #[test]
    fn duplicate_predicates_removed() {
        let mut c = Clause::new(vec![
            Expression::exists("a"),
            Expression::exists("b"),
            Expression::exists("a"),
        ]);
        c.remove_duplicate_predicates();
        assert_eq!(c.len(), 2);
        assert_eq!(c.to_string(), "(exists(a) && exists(b))");
    }
}
