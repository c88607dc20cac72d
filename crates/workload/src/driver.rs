//! Builds a random workload into a tree and checks the tree against it.

use crate::generator::{ExpressionInfo, Generator};
use common::{Args, RunReport};
use tracing::{debug, info};
use trigger_tree::{Comparers, NumericBoundComparer, Relationship, TriggerId, TriggerTree};

/// Every expression family the driver inserts, in insertion order.
pub struct Workload {
    /// Base predicates plus conjunctions; these carry satisfying memories.
    pub predicates: Vec<ExpressionInfo>,
    pub stages: Vec<(&'static str, Vec<ExpressionInfo>)>,
}

impl Workload {
    pub fn generate(args: &Args) -> Self {
        let mut generator = Generator::new(args.seed);
        let (min, max) = args.clause_bounds();

        let base = generator.predicates(args.predicates, "mem");
        let singletons: Vec<_> = base.iter().take(args.singletons).cloned().collect();
        let conjunctions = generator.conjunctions(&base, args.conjunctions, min, max);

        let mut predicates = base;
        predicates.extend(conjunctions.iter().cloned());
        let disjunctions = generator.disjunctions(&predicates, args.disjunctions, min, max);

        let mut all = predicates.clone();
        all.extend(disjunctions.iter().cloned());
        let optionals = generator.optionals(&all, args.optionals, min, max);
        all.extend(optionals.iter().cloned());
        let quantified =
            generator.quantified(&all, args.quantifiers, args.max_expansion, args.max_quantifiers);
        all.extend(quantified.iter().cloned());
        let nots = generator.nots(&all, args.nots);

        Self {
            predicates,
            stages: vec![
                ("singletons", singletons),
                ("conjunctions", conjunctions),
                ("disjunctions", disjunctions),
                ("optionals", optionals),
                ("quantifiers", quantified),
                ("nots", nots),
            ],
        }
    }
}

/// An empty tree configured the way `args` asks.
pub fn tree_for(args: &Args) -> TriggerTree<usize> {
    let mut comparers = Comparers::new();
    if args.bound_comparers {
        NumericBoundComparer::register_all(&mut comparers);
    }
    TriggerTree::new().with_comparers(comparers)
}

/// Run the whole workload. Returns `true` if every check passed.
pub fn run(args: &Args) -> bool {
    let mut report = RunReport::new("workload", args.seed);
    let workload = Workload::generate(args);
    let mut tree = tree_for(args);
    let mut ids: Vec<TriggerId> = Vec::new();

    for (stage, infos) in &workload.stages {
        let mut unmatched = Vec::new();
        for info in infos {
            let id = tree.add_trigger(
                info.expression.clone(),
                ids.len(),
                info.quantifiers.clone(),
            );
            ids.push(id);
            if *stage == "conjunctions" && tree.matches(&info.memory()).is_empty() {
                unmatched.push(info.expression.to_string());
            }
        }
        debug!("{stage}: {} nodes, {} roots", tree.node_count(), tree.root_count());

        report.record(
            &format!("add {stage}"),
            if tree.total_triggers() == ids.len() {
                Ok(format!("triggers={}", ids.len()))
            } else {
                Err(format!(
                    "expected {} triggers, tree holds {}",
                    ids.len(),
                    tree.total_triggers()
                ))
            },
        );
        if !unmatched.is_empty() {
            report.report_failure(
                &format!("{stage} match their own memory"),
                Some(&unmatched.join("; ")),
            );
        }
    }

    report.record(
        "verify after insertion",
        tree.verify()
            .map(|()| format!("nodes={}, roots={}", tree.node_count(), tree.root_count())),
    );
    report.record("most specific matches", check_most_specific(&tree, &workload.predicates));

    if let Some(path) = args.dot() {
        report.record(
            "write graph",
            std::fs::write(path, tree.to_dot()).map(|()| path.display().to_string()),
        );
    }

    for id in &ids {
        tree.remove_trigger(*id);
    }
    report.record(
        "remove all",
        if tree.total_triggers() == 0 && tree.node_count() == 0 {
            Ok(format!("removed={}", ids.len()))
        } else {
            Err(format!(
                "{} triggers and {} nodes left",
                tree.total_triggers(),
                tree.node_count()
            ))
        },
    );
    report.record("verify after removal", tree.verify().map(|()| String::new()));

    info!("{}", "-".repeat(80));
    report.finish()
}

/// For every satisfying memory, each pair of fired triggers must have a pair
/// of holding clauses that are equal or incomparable.
pub fn check_most_specific(
    tree: &TriggerTree<usize>,
    predicates: &[ExpressionInfo],
) -> Result<String, String> {
    let mut pairs = 0;
    let mut failures = String::new();
    for info in predicates {
        let memory = info.memory();
        let matches = tree.matches(&memory);
        for (i, first) in matches.iter().enumerate() {
            for second in &matches[i + 1..] {
                pairs += 1;
                let holding = |t: &trigger_tree::Trigger<usize>| {
                    t.active_clauses()
                        .filter(|c| matches!(c.try_evaluate(&memory), Ok(true)))
                        .cloned()
                        .collect::<Vec<_>>()
                };
                let (left, right) = (holding(*first), holding(*second));
                let unrelated = left.iter().any(|a| {
                    right.iter().any(|b| {
                        matches!(
                            a.relationship(b, tree.comparers()),
                            Relationship::Equal | Relationship::Incomparable
                        )
                    })
                });
                if !unrelated {
                    failures.push_str(&format!("{} vs {}; ", first.id(), second.id()));
                }
            }
        }
    }

    if failures.is_empty() {
        Ok(format!("memories={}, pairs={pairs}", predicates.len()))
    } else {
        Err(failures)
    }
}
