//! Triggers: an expression normalized into clauses, paired with an action.
//!
//! Construction runs the normalization pipeline:
//! 1. push negations down to the predicates
//! 2. expand into disjunctive normal form
//! 3. drop duplicate predicates inside each clause
//! 4. apply clause optimizers
//! 5. expand quantifiers, in declaration order
//! 6. drop duplicate predicates and duplicate clauses again
//! 7. mark clauses subsumed by a sibling clause
//! 8. split `ignore(..)` predicates out of the conjuncts

use crate::clause::{dedup_by_hash, Clause};
use crate::comparer::{ClauseOptimizer, Comparers};
use crate::quantifier::Quantifier;
use crate::relationship::Relationship;
use expression::{Expression, Memory};
use std::fmt;
use tracing::trace;

/// Stable handle of a trigger inside one tree. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TriggerId(pub(crate) usize);

impl fmt::Display for TriggerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct Trigger<A> {
    id: TriggerId,
    expression: Expression,
    action: A,
    quantifiers: Vec<Quantifier>,
    clauses: Vec<Clause>,
}

impl<A> Trigger<A> {
    pub(crate) fn new(
        id: TriggerId,
        expression: Expression,
        action: A,
        quantifiers: Vec<Quantifier>,
        comparers: &Comparers,
        optimizers: &[Box<dyn ClauseOptimizer>],
    ) -> Self {
        let normal_form = expression.push_down_not();
        let mut clauses = generate_clauses(&normal_form);
        trace!("{id}: {} clause(s) from {normal_form}", clauses.len());

        for clause in &mut clauses {
            clause.remove_duplicate_predicates();
            for optimizer in optimizers {
                optimizer.optimize(clause);
            }
        }

        for quantifier in &quantifiers {
            clauses = clauses.iter().flat_map(|c| quantifier.expand(c)).collect();
            trace!("{id}: {} clause(s) after {quantifier}", clauses.len());
        }

        for clause in &mut clauses {
            clause.remove_duplicate_predicates();
        }
        let mut clauses = dedup_by_hash(clauses, Clause::canonical_hash, Clause::deep_equals);

        mark_subsumed(&mut clauses, comparers);
        for clause in &mut clauses {
            clause.split_ignores();
        }

        Self {
            id,
            expression,
            action,
            quantifiers,
            clauses,
        }
    }

    #[inline]
    pub fn id(&self) -> TriggerId {
        self.id
    }

    /// The expression as registered.
    #[inline]
    pub fn expression(&self) -> &Expression {
        &self.expression
    }

    #[inline]
    pub fn action(&self) -> &A {
        &self.action
    }

    #[inline]
    pub fn quantifiers(&self) -> &[Quantifier] {
        &self.quantifiers
    }

    /// Disjunctive normal form, including subsumed clauses.
    #[inline]
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Clauses that are inserted into the tree.
    pub fn active_clauses(&self) -> impl Iterator<Item = &Clause> {
        self.clauses.iter().filter(|c| !c.is_subsumed())
    }

    /// Relationship of this trigger's condition to `other`'s.
    ///
    /// `A` specializes `B` when every active clause of `A` equals or
    /// specializes some active clause of `B`.
    pub fn relationship(&self, other: &Trigger<A>, comparers: &Comparers) -> Relationship {
        let first = covered_by(self, other, comparers);
        let second = covered_by(other, self, comparers);
        match (first, second) {
            (Relationship::Equal, Relationship::Equal) => Relationship::Equal,
            (Relationship::Equal | Relationship::Specializes, _) => Relationship::Specializes,
            (_, Relationship::Equal | Relationship::Specializes) => Relationship::Generalizes,
            _ => Relationship::Incomparable,
        }
    }

    /// Does one of this trigger's clauses fire for `node_clause`?
    pub fn matches(&self, node_clause: &Clause, memory: &Memory, comparers: &Comparers) -> bool {
        self.active_clauses()
            .any(|c| c.matches(node_clause, memory, comparers))
    }
}

impl<A> fmt::Display for Trigger<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.clauses.is_empty() {
            return write!(f, "{}: <empty>", self.id);
        }
        write!(f, "{}: ", self.id)?;
        for (i, clause) in self.clauses.iter().enumerate() {
            if i > 0 {
                write!(f, " || ")?;
            }
            write!(f, "{clause}")?;
        }
        Ok(())
    }
}

/// Equal if every active clause of `trigger` equals one of `other`,
/// Specializes if every one equals or specializes one and at least one
/// specializes, Incomparable otherwise.
fn covered_by<A>(trigger: &Trigger<A>, other: &Trigger<A>, comparers: &Comparers) -> Relationship {
    let mut so_far = Relationship::Incomparable;
    for clause in trigger.active_clauses() {
        let found = other
            .active_clauses()
            .map(|second| clause.relationship(second, comparers))
            .find(|r| matches!(r, Relationship::Equal | Relationship::Specializes));
        match found {
            None => return Relationship::Incomparable,
            Some(Relationship::Specializes) => so_far = Relationship::Specializes,
            Some(_) => {
                if so_far == Relationship::Incomparable {
                    so_far = Relationship::Equal;
                }
            }
        }
    }
    so_far
}

/// Disjunctive normal form of a negation-normal expression.
fn generate_clauses(expression: &Expression) -> Vec<Clause> {
    match expression {
        Expression::And(children) => {
            let mut so_far: Option<Vec<Clause>> = None;
            for child in children {
                let clauses = generate_clauses(child);
                if clauses.is_empty() {
                    // a false conjunct kills the whole conjunction
                    return vec![];
                }
                so_far = Some(match so_far {
                    None => clauses,
                    Some(previous) => previous
                        .iter()
                        .flat_map(|old| {
                            clauses.iter().map(move |new| {
                                let mut conjuncts = old.conjuncts().to_vec();
                                conjuncts.extend_from_slice(new.conjuncts());
                                Clause::new(conjuncts)
                            })
                        })
                        .collect(),
                });
            }
            so_far.unwrap_or_else(|| vec![Clause::empty()])
        }
        Expression::Or(children) => children.iter().flat_map(generate_clauses).collect(),
        Expression::Optional(child) => {
            let mut clauses = vec![Clause::empty()];
            clauses.extend(generate_clauses(child));
            clauses
        }
        other => match other.as_bool_constant() {
            Some(true) => vec![Clause::empty()],
            Some(false) => vec![],
            None => vec![Clause::new(vec![other.clone()])],
        },
    }
}

/// Drop later clauses equal to an earlier one and flag clauses implied by
/// a more general sibling.
fn mark_subsumed(clauses: &mut Vec<Clause>, comparers: &Comparers) {
    let mut i = 0;
    while i < clauses.len() {
        if !clauses[i].is_subsumed() {
            let mut j = i + 1;
            while j < clauses.len() {
                if clauses[j].is_subsumed() {
                    j += 1;
                    continue;
                }
                let relationship = clauses[i].relationship(&clauses[j], comparers);
                match relationship {
                    Relationship::Equal => {
                        clauses.remove(j);
                        continue;
                    }
                    Relationship::Specializes => {
                        clauses[i].mark_subsumed();
                        break;
                    }
                    Relationship::Generalizes => clauses[j].mark_subsumed(),
                    Relationship::Incomparable => {}
                }
                j += 1;
            }
        }
        i += 1;
    }
}
