//! Command line arguments for the workload tool.

use clap::Parser;
use std::path::PathBuf;

/// Command line arguments for the trigger tree workload driver
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Seed for the random workload (same seed, same workload)
    #[arg(long, default_value_t = 0)]
    pub seed: u64,

    /// Number of distinct base predicates to draw from
    #[arg(long, default_value_t = 100, value_name = "N")]
    pub predicates: usize,

    /// Number of single-predicate triggers
    #[arg(long, default_value_t = 50, value_name = "N")]
    pub singletons: usize,

    /// Number of conjunction triggers
    #[arg(long, default_value_t = 100, value_name = "N")]
    pub conjunctions: usize,

    /// Number of disjunction triggers
    #[arg(long, default_value_t = 100, value_name = "N")]
    pub disjunctions: usize,

    /// Number of triggers with an optional leading predicate
    #[arg(long, default_value_t = 100, value_name = "N")]
    pub optionals: usize,

    /// Number of quantified triggers
    #[arg(long, default_value_t = 100, value_name = "N")]
    pub quantifiers: usize,

    /// Number of negated triggers
    #[arg(long, default_value_t = 100, value_name = "N")]
    pub nots: usize,

    /// Minimum number of operands in generated conjunctions/disjunctions
    #[arg(long, default_value_t = 2)]
    pub min_clause: usize,

    /// Maximum number of operands in generated conjunctions/disjunctions (exclusive)
    #[arg(long, default_value_t = 4)]
    pub max_clause: usize,

    /// Maximum number of bindings per quantifier
    #[arg(long, default_value_t = 3)]
    pub max_expansion: usize,

    /// Maximum number of quantifiers per trigger
    #[arg(long, default_value_t = 3)]
    pub max_quantifiers: usize,

    /// Order integer bounds on the same variable (`x > 5` under `x > 3`)
    /// instead of comparing them structurally
    #[arg(long)]
    pub bound_comparers: bool,

    /// Write the final tree (before removal) as Graphviz to this path
    #[arg(long, value_name = "PATH")]
    pub dot: Option<PathBuf>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "info", value_name = "FILTER")]
    pub log: String,
}

impl Args {
    pub fn dot(&self) -> Option<&PathBuf> {
        self.dot.as_ref()
    }

    /// Total number of triggers the workload will add.
    pub fn total_triggers(&self) -> usize {
        self.singletons
            + self.conjunctions
            + self.disjunctions
            + self.optionals
            + self.quantifiers
            + self.nots
    }

    /// Operand count bounds, normalized so that `min < max`.
    pub fn clause_bounds(&self) -> (usize, usize) {
        let min = self.min_clause.max(1);
        (min, self.max_clause.max(min + 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_parse() {
        let args = Args::parse_from(["workload"]);
        assert_eq!(args.seed, 0);
        assert_eq!(args.total_triggers(), 550);
        assert_eq!(args.clause_bounds(), (2, 4));
        assert!(args.dot().is_none());
        assert!(!args.bound_comparers);
    }

    #[test]
    fn clause_bounds_are_normalized() {
        let args = Args::parse_from(["workload", "--min-clause", "3", "--max-clause", "1"]);
        assert_eq!(args.clause_bounds(), (3, 4));
    }
}
