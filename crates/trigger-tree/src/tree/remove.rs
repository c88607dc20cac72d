//! Removing a trigger from every node that carries it.

use super::TriggerTree;
use crate::node::NodeId;
use crate::relationship::Relationship;
use crate::trigger::TriggerId;
use std::collections::HashSet;
use tracing::trace;

impl<A: PartialEq> TriggerTree<A> {
    pub(super) fn remove_everywhere(&mut self, trigger: TriggerId) -> bool {
        let mut visited = HashSet::new();
        let mut removed = false;
        self.remove_at(self.root, trigger, &mut visited, &mut removed);
        removed
    }

    fn remove_at(
        &mut self,
        at: NodeId,
        trigger: TriggerId,
        visited: &mut HashSet<NodeId>,
        removed: &mut bool,
    ) {
        if !visited.insert(at) {
            return;
        }

        if let Some(node) = self.nodes.get_mut(at) {
            if node.all_triggers.contains(&trigger) {
                node.all_triggers.retain(|t| *t != trigger);
                *removed = true;
                trace!("{trigger} removed from {at}");

                if node.triggers.contains(&trigger) {
                    node.triggers.retain(|t| *t != trigger);
                    // Promote shadowed triggers no visible trigger covers.
                    for candidate in node.all_triggers.clone() {
                        if node.triggers.contains(&candidate) {
                            continue;
                        }
                        let covered = node.triggers.iter().any(|existing| {
                            let relationship = match (
                                self.triggers.get(&candidate),
                                self.triggers.get(existing),
                            ) {
                                (Some(c), Some(e)) => c.relationship(e, &self.comparers),
                                _ => Relationship::Incomparable,
                            };
                            matches!(relationship, Relationship::Equal | Relationship::Generalizes)
                        });
                        if !covered {
                            trace!("{candidate} promoted at {at}");
                            node.triggers.push(candidate);
                        }
                    }
                }
            }
        }

        let mut emptied = Vec::new();
        for child in self.nodes.children(at) {
            self.remove_at(child, trigger, visited, removed);
            if self.nodes.get(child).is_some_and(|n| n.triggers.is_empty()) {
                emptied.push(child);
            }
        }

        // Splice out children left without triggers.
        for child in emptied {
            if let Some(node) = self.nodes.get_mut(at) {
                node.detach(child);
            }
            trace!("{child} spliced out of {at}");
            for grandchild in self.nodes.children(child) {
                self.add_specialization(at, grandchild);
            }
        }
    }
}
