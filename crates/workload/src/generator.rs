//! Seeded random trigger expressions with memories that satisfy them.

use expression::{ComparisonOperator, Expression, Memory, Value};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;
use trigger_tree::Quantifier;

/// Operators used for generated comparisons. `!=` is left out: a missing
/// value is never equal to anything, so it would match too eagerly.
const COMPARISONS: [ComparisonOperator; 5] = [
    ComparisonOperator::LessThan,
    ComparisonOperator::LessThanOrEqual,
    ComparisonOperator::Equal,
    ComparisonOperator::GreaterThanOrEqual,
    ComparisonOperator::GreaterThan,
];

/// A generated expression and a variable assignment under which it holds.
#[derive(Debug, Clone)]
pub struct ExpressionInfo {
    pub expression: Expression,
    pub bindings: BTreeMap<String, Value>,
    pub quantifiers: Vec<Quantifier>,
}

impl ExpressionInfo {
    fn new(expression: Expression, bindings: BTreeMap<String, Value>) -> Self {
        Self {
            expression,
            bindings,
            quantifiers: Vec::new(),
        }
    }

    /// The satisfying assignment as a memory.
    pub fn memory(&self) -> Memory {
        self.bindings
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

pub struct Generator {
    rng: StdRng,
}

impl Generator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn random_string(&mut self, len: usize) -> String {
        (0..len)
            .map(|_| char::from(b'a' + self.rng.gen_range(0..26u8)))
            .collect()
    }

    /// `name op constant` where the chosen value satisfies the comparison.
    fn simple_comparison(&mut self, name: &str) -> ExpressionInfo {
        let op = COMPARISONS[self.rng.gen_range(0..COMPARISONS.len())];
        let value: i64 = self.rng.gen_range(-1_000..1_000);
        let constant = match op {
            ComparisonOperator::LessThan => value + 1,
            ComparisonOperator::GreaterThan => value - 1,
            _ => value,
        };
        let expression = Expression::compare(
            op,
            Expression::accessor(name),
            Expression::constant(constant),
        );
        ExpressionInfo::new(expression, BTreeMap::from([(name.to_string(), value.into())]))
    }

    /// A presence test, either `exists(name)` or `name != null`.
    fn has_value(&mut self, name: &str) -> ExpressionInfo {
        let (expression, value) = if self.rng.gen_bool(0.5) {
            let value: i64 = self.rng.gen();
            (Expression::exists(name), Value::from(value))
        } else {
            let expression = Expression::compare(
                ComparisonOperator::NotEqual,
                Expression::accessor(name),
                Expression::Constant(Value::Null),
            );
            (expression, Value::from(self.random_string(5)))
        };
        ExpressionInfo::new(expression, BTreeMap::from([(name.to_string(), value)]))
    }

    /// `n` single predicates over variables `{prefix}0..{prefix}n`.
    pub fn predicates(&mut self, n: usize, prefix: &str) -> Vec<ExpressionInfo> {
        (0..n)
            .map(|i| {
                let name = format!("{prefix}{i}");
                if self.rng.gen_bool(0.5) {
                    self.simple_comparison(&name)
                } else {
                    self.has_value(&name)
                }
            })
            .collect()
    }

    /// Pick `count` distinct entries of `pool`.
    fn distinct<'a>(&mut self, pool: &'a [ExpressionInfo], count: usize) -> Vec<&'a ExpressionInfo> {
        pool.choose_multiple(&mut self.rng, count.min(pool.len()))
            .collect()
    }

    fn operand_count(&mut self, min: usize, max: usize) -> usize {
        self.rng.gen_range(min..max)
    }

    fn combine(
        parts: &[&ExpressionInfo],
        build: fn(Vec<Expression>) -> Expression,
    ) -> ExpressionInfo {
        let expression = build(parts.iter().map(|p| p.expression.clone()).collect());
        ExpressionInfo::new(expression, merge_bindings(parts.iter().copied()))
    }

    pub fn conjunctions(
        &mut self,
        pool: &[ExpressionInfo],
        n: usize,
        min: usize,
        max: usize,
    ) -> Vec<ExpressionInfo> {
        (0..n)
            .map(|_| {
                let count = self.operand_count(min, max);
                Self::combine(&self.distinct(pool, count), Expression::and)
            })
            .collect()
    }

    pub fn disjunctions(
        &mut self,
        pool: &[ExpressionInfo],
        n: usize,
        min: usize,
        max: usize,
    ) -> Vec<ExpressionInfo> {
        (0..n)
            .map(|_| {
                let count = self.operand_count(min, max);
                Self::combine(&self.distinct(pool, count), Expression::or)
            })
            .collect()
    }

    /// Conjunctions whose first operand is `optional(..)`, negated a quarter
    /// of the time.
    pub fn optionals(
        &mut self,
        pool: &[ExpressionInfo],
        n: usize,
        min: usize,
        max: usize,
    ) -> Vec<ExpressionInfo> {
        (0..n)
            .map(|_| {
                let count = self.operand_count(min, max);
                let parts = self.distinct(pool, count);
                let mut operands: Vec<Expression> =
                    parts.iter().map(|p| p.expression.clone()).collect();
                if let Some(first) = operands.first_mut() {
                    let mut optional = Expression::optional(first.clone());
                    if self.rng.gen_bool(0.25) {
                        optional = Expression::not(optional);
                    }
                    *first = optional;
                }
                ExpressionInfo::new(
                    Expression::and(operands),
                    merge_bindings(parts.iter().copied()),
                )
            })
            .collect()
    }

    /// Expressions from `pool` with up to `max_quantifiers` quantifiers, each
    /// mapping one of the expression's variables onto up to `max_expansion`
    /// variables holding the same kind of value.
    pub fn quantified(
        &mut self,
        pool: &[ExpressionInfo],
        n: usize,
        max_expansion: usize,
        max_quantifiers: usize,
    ) -> Vec<ExpressionInfo> {
        let all = merge_bindings(pool.iter());
        let mut by_kind: BTreeMap<&'static str, Vec<String>> = BTreeMap::new();
        for (name, value) in &all {
            by_kind.entry(value.kind()).or_default().push(name.clone());
        }

        let mut result = Vec::with_capacity(n);
        for _ in 0..n {
            let Some(base) = pool.choose(&mut self.rng) else {
                break;
            };
            let mut info = ExpressionInfo::new(base.expression.clone(), BTreeMap::new());
            let wanted = 1 + self.rng.gen_range(0..max_quantifiers.max(1));
            let variables: Vec<&String> = base
                .bindings
                .keys()
                .collect::<Vec<_>>()
                .choose_multiple(&mut self.rng, wanted)
                .copied()
                .collect();

            for variable in variables {
                let value = &base.bindings[variable];
                let mut mappings = vec![variable.clone()];
                let expansion = 1 + self.rng.gen_range(0..max_expansion.max(1));
                if let Some(candidates) = by_kind.get(value.kind()) {
                    for _ in 1..expansion {
                        if let Some(mapping) = candidates.choose(&mut self.rng) {
                            if !mappings.contains(mapping) {
                                mappings.push(mapping.clone());
                            }
                        }
                    }
                }

                if self.rng.gen_bool(0.5) {
                    if let Some(chosen) = mappings.choose(&mut self.rng) {
                        info.bindings
                            .entry(chosen.clone())
                            .or_insert_with(|| value.clone());
                    }
                    info.quantifiers
                        .push(Quantifier::any(variable.clone(), mappings));
                } else {
                    for mapping in &mappings {
                        info.bindings
                            .entry(mapping.clone())
                            .or_insert_with(|| value.clone());
                    }
                    info.quantifiers
                        .push(Quantifier::all(variable.clone(), mappings));
                }
            }
            result.push(info);
        }
        result
    }

    /// Negations of expressions drawn from `pool`. No satisfying memory is
    /// tracked for these.
    pub fn nots(&mut self, pool: &[ExpressionInfo], n: usize) -> Vec<ExpressionInfo> {
        (0..n)
            .filter_map(|_| pool.choose(&mut self.rng))
            .map(|base| ExpressionInfo {
                expression: Expression::not(base.expression.clone()),
                bindings: BTreeMap::new(),
                quantifiers: base.quantifiers.clone(),
            })
            .collect()
    }
}

/// Union of the bindings of `infos`; later entries win.
pub fn merge_bindings<'a>(
    infos: impl IntoIterator<Item = &'a ExpressionInfo>,
) -> BTreeMap<String, Value> {
    let mut merged = BTreeMap::new();
    for info in infos {
        merged.extend(info.bindings.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
    merged
}
