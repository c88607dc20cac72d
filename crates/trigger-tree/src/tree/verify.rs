//! Invariant checks over a whole tree, for tests and diagnostics.

use super::TriggerTree;
use crate::error::{Invariant, TreeError};
use crate::node::NodeId;
use crate::relationship::Relationship;
use itertools::Itertools;

impl<A: PartialEq> TriggerTree<A> {
    /// Walk every reachable node and check the tree invariants.
    ///
    /// Returns the first violation found, located at the offending node.
    pub fn verify(&self) -> Result<(), TreeError> {
        for id in self.reachable() {
            let Some(node) = self.node(id) else {
                continue;
            };

            for child in node.specializations() {
                let relationship = self.node_relationship(*child, id);
                if relationship != Relationship::Specializes {
                    return Err(violation(
                        id,
                        Invariant::Specialization,
                        format!("child {child} {relationship} its parent"),
                    ));
                }
            }

            for (a, b) in node.specializations().iter().tuple_combinations() {
                let relationship = self.node_relationship(*a, *b);
                if relationship != Relationship::Incomparable {
                    return Err(violation(
                        id,
                        Invariant::SiblingIncomparability,
                        format!("{a} {relationship} {b}"),
                    ));
                }
            }

            for trigger in node.all_triggers().iter().chain(node.triggers()) {
                if self.trigger(*trigger).is_none() {
                    return Err(TreeError::UnknownTrigger {
                        node: id,
                        trigger: *trigger,
                    });
                }
            }

            for trigger in node.all_triggers() {
                let covered = node.triggers().iter().any(|visible| {
                    visible == trigger
                        || matches!(
                            self.trigger_relationship(*trigger, *visible),
                            Relationship::Equal | Relationship::Generalizes
                        )
                });
                if !covered {
                    return Err(violation(
                        id,
                        Invariant::TriggerCompleteness,
                        format!("{trigger} is not covered by {:?}", node.triggers()),
                    ));
                }
            }
        }
        Ok(())
    }
}

fn violation(node: NodeId, invariant: Invariant, detail: String) -> TreeError {
    TreeError::InvariantViolation {
        node,
        invariant,
        detail,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clause::Clause;
    use crate::node::Node;
    use expression::Expression;

    #[test]
    fn detects_comparable_siblings() {
        let mut tree: TriggerTree<u32> = TriggerTree::new();
        tree.add_trigger(Expression::exists("a"), 1, vec![]);
        assert!(tree.verify().is_ok());

        // Hand-attach a specialization of the existing root next to it.
        let clause = Clause::new(vec![Expression::exists("a"), Expression::exists("b")]);
        let bad = tree.nodes.alloc(Node::new(clause));
        let root = tree.root();
        tree.nodes.get_mut(root).unwrap().attach(bad);

        match tree.verify() {
            Err(TreeError::InvariantViolation { node, invariant, .. }) => {
                assert_eq!(node, root);
                assert_eq!(invariant, Invariant::SiblingIncomparability);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn detects_misplaced_child() {
        let mut tree: TriggerTree<u32> = TriggerTree::new();
        tree.add_trigger(
            Expression::and(vec![Expression::exists("a"), Expression::exists("b")]),
            1,
            vec![],
        );
        let child = tree.node(tree.root()).unwrap().specializations()[0];
        let general = tree
            .nodes
            .alloc(Node::new(Clause::new(vec![Expression::exists("a")])));
        tree.nodes.get_mut(child).unwrap().attach(general);

        assert!(matches!(
            tree.verify(),
            Err(TreeError::InvariantViolation {
                invariant: Invariant::Specialization,
                ..
            })
        ));
    }
}
