//! Quantifiers expand templated predicates into concrete clauses.

use crate::clause::Clause;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuantifierType {
    /// Within a clause, duplicate every predicate mentioning the variable
    /// once per binding.
    All,
    /// Produce one clause per binding.
    Any,
}

impl fmt::Display for QuantifierType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Any => write!(f, "any"),
        }
    }
}

/// A variable, how it is quantified, and the names it may be bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quantifier {
    variable: String,
    quantifier_type: QuantifierType,
    bindings: Vec<String>,
}

impl Quantifier {
    pub fn new(
        variable: impl Into<String>,
        quantifier_type: QuantifierType,
        bindings: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            variable: variable.into(),
            quantifier_type,
            bindings: bindings.into_iter().map(Into::into).collect(),
        }
    }

    pub fn all(
        variable: impl Into<String>,
        bindings: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self::new(variable, QuantifierType::All, bindings)
    }

    pub fn any(
        variable: impl Into<String>,
        bindings: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self::new(variable, QuantifierType::Any, bindings)
    }

    #[inline]
    pub fn variable(&self) -> &str {
        &self.variable
    }

    #[inline]
    pub fn quantifier_type(&self) -> QuantifierType {
        self.quantifier_type
    }

    #[inline]
    pub fn bindings(&self) -> &[String] {
        &self.bindings
    }

    /// Expand one clause against this quantifier.
    pub fn expand(&self, clause: &Clause) -> Vec<Clause> {
        match self.quantifier_type {
            QuantifierType::All => vec![self.expand_all(clause)],
            QuantifierType::Any => self.expand_any(clause),
        }
    }

    fn expand_all(&self, clause: &Clause) -> Clause {
        let mut expanded = clause.clone();
        let conjuncts = expanded.conjuncts_mut();
        let old = std::mem::take(conjuncts);

        if self.bindings.is_empty() {
            // Vacuously true: predicates over the variable disappear.
            conjuncts.extend(old.into_iter().filter(|c| !c.references(&self.variable)));
            return expanded;
        }

        for predicate in &old {
            for binding in &self.bindings {
                let (substituted, changed) = predicate.substitute(&self.variable, binding);
                conjuncts.push(substituted);
                if !changed {
                    break;
                }
            }
        }
        expanded
    }

    fn expand_any(&self, clause: &Clause) -> Vec<Clause> {
        if self.bindings.is_empty() {
            let mentioned = clause
                .conjuncts()
                .iter()
                .any(|c| c.references(&self.variable));
            return if mentioned { vec![] } else { vec![clause.clone()] };
        }

        let mut expanded = Vec::with_capacity(self.bindings.len());
        for binding in &self.bindings {
            let mut changed = false;
            let conjuncts = clause
                .conjuncts()
                .iter()
                .map(|c| {
                    let (substituted, c_changed) = c.substitute(&self.variable, binding);
                    changed |= c_changed;
                    substituted
                })
                .collect();

            let mut next = clause.clone();
            *next.conjuncts_mut() = conjuncts;
            if changed {
                next.bind(&self.variable, binding);
            }
            expanded.push(next);
            if !changed {
                break;
            }
        }
        expanded
    }
}

impl fmt::Display for Quantifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} [{}]",
            self.quantifier_type,
            self.variable,
            self.bindings.join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use expression::Expression;

    fn clause(names: &[&str]) -> Clause {
        Clause::new(names.iter().map(|n| Expression::exists(*n)).collect())
    }

    fn rendered(clauses: &[Clause]) -> Vec<String> {
        clauses.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn all_duplicates_predicates_per_binding() {
        let q = Quantifier::all("x", ["a", "b"]);
        let out = q.expand(&clause(&["x", "c"]));
        assert_eq!(
            rendered(&out),
            vec!["(exists(a) && exists(b) && exists(c))".to_string()]
        );
    }

    #[test]
    fn all_without_bindings_drops_references() {
        let q = Quantifier::all("x", Vec::<String>::new());
        let out = q.expand(&clause(&["x", "c"]));
        assert_eq!(rendered(&out), vec!["(exists(c))".to_string()]);
    }

    #[test]
    fn any_yields_one_clause_per_binding() {
        let q = Quantifier::any("x", ["a", "b"]);
        let out = q.expand(&clause(&["x", "c"]));
        assert_eq!(
            rendered(&out),
            vec![
                "(exists(a) && exists(c)) x->a".to_string(),
                "(exists(b) && exists(c)) x->b".to_string(),
            ]
        );
        assert_eq!(out[1].binding("x"), Some("b"));
    }

    #[test]
    fn any_stops_when_variable_unused() {
        let q = Quantifier::any("x", ["a", "b"]);
        let out = q.expand(&clause(&["c"]));
        assert_eq!(rendered(&out), vec!["(exists(c))".to_string()]);
    }

    #[test]
    fn any_without_bindings_keeps_only_unrelated_clauses() {
        let q = Quantifier::any("x", Vec::<String>::new());
        assert!(q.expand(&clause(&["x"])).is_empty());
        assert_eq!(q.expand(&clause(&["c"])).len(), 1);
    }
}
