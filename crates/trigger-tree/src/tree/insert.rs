//! Merging a clause into the tree.

use super::TriggerTree;
use crate::clause::Clause;
use crate::node::{Node, NodeId};
use crate::relationship::Relationship;
use crate::trigger::TriggerId;
use std::collections::HashMap;
use tracing::trace;

/// What happened to the incoming node below some existing node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Operation {
    None,
    /// An equal clause already carries an equal action.
    Found,
    /// The trigger now lives in the tree.
    Added,
    /// The existing node was moved under the incoming one.
    Inserted,
}

impl<A: PartialEq> TriggerTree<A> {
    /// Insert one clause of `trigger`. True if the trigger was placed.
    pub(super) fn insert_clause(&mut self, clause: Clause, trigger: TriggerId) -> bool {
        let incoming = self.nodes.alloc(Node::with_trigger(clause, trigger));
        let mut ops = HashMap::new();
        let op = self.add_node(self.root, incoming, trigger, &mut ops);
        trace!("{trigger}: clause insertion visited {} node(s): {op:?}", ops.len());
        op == Operation::Added
    }

    fn add_node(
        &mut self,
        at: NodeId,
        incoming: NodeId,
        trigger: TriggerId,
        ops: &mut HashMap<NodeId, Operation>,
    ) -> Operation {
        if let Some(op) = ops.get(&at) {
            return *op;
        }

        let relationship = self.node_relationship(at, incoming);
        trace!("{at} {relationship} {incoming}");
        let op = match relationship {
            Relationship::Equal => self.merge_trigger(at, trigger),
            Relationship::Incomparable => {
                let mut op = Operation::None;
                for child in self.nodes.children(at) {
                    match self.add_node(child, incoming, trigger, ops) {
                        Operation::Added => op = Operation::Added,
                        Operation::Found if op != Operation::Added => op = Operation::Found,
                        _ => {}
                    }
                }
                op
            }
            Relationship::Specializes => {
                self.add_specialization(incoming, at);
                Operation::Inserted
            }
            Relationship::Generalizes => {
                let mut op = Operation::None;
                let mut inserted = Vec::new();
                for child in self.nodes.children(at) {
                    match self.add_node(child, incoming, trigger, ops) {
                        Operation::Inserted => inserted.push(child),
                        Operation::Added => op = Operation::Added,
                        Operation::Found if op != Operation::Added => op = Operation::Found,
                        _ => {}
                    }
                }

                // Nothing below holds the trigger: it belongs here, above
                // whatever children it generalizes.
                if op == Operation::None {
                    if let Some(node) = self.nodes.get_mut(at) {
                        for child in &inserted {
                            node.detach(*child);
                        }
                        node.attach(incoming);
                    }
                    trace!("{incoming} attached under {at}, adopting {inserted:?}");
                    op = Operation::Added;
                }
                op
            }
        };

        ops.insert(at, op);
        op
    }

    /// Register `trigger` on a node whose clause equals the incoming one.
    fn merge_trigger(&mut self, at: NodeId, trigger: TriggerId) -> Operation {
        let Some(incoming) = self.triggers.get(&trigger) else {
            return Operation::None;
        };
        let Some(node) = self.nodes.get_mut(at) else {
            return Operation::None;
        };

        let found = node.all_triggers.iter().any(|existing| {
            self.triggers
                .get(existing)
                .is_some_and(|e| e.action() == incoming.action())
        });
        if found {
            trace!("{trigger}: action already at {at}");
            return Operation::Found;
        }

        node.all_triggers.push(trigger);
        let mut add = true;
        let mut i = 0;
        while i < node.triggers.len() {
            let relationship = match self.triggers.get(&node.triggers[i]) {
                Some(existing) => incoming.relationship(existing, &self.comparers),
                None => Relationship::Incomparable,
            };
            match relationship {
                Relationship::Generalizes => {
                    trace!("{trigger} shadowed by {} at {at}", node.triggers[i]);
                    add = false;
                    break;
                }
                Relationship::Specializes => {
                    trace!("{trigger} replaces {} at {at}", node.triggers[i]);
                    node.triggers.remove(i);
                }
                _ => i += 1,
            }
        }
        if add && !node.triggers.contains(&trigger) {
            node.triggers.push(trigger);
        }
        Operation::Added
    }

    /// Place `candidate` among the specializations of `at`.
    ///
    /// Skipped when an equal child exists, pushed further down when a child
    /// is more general, and otherwise adopts every child it generalizes.
    pub(super) fn add_specialization(&mut self, at: NodeId, candidate: NodeId) -> bool {
        if at == candidate {
            return false;
        }

        let mut generalized = Vec::new();
        for child in self.nodes.children(at) {
            if child == candidate {
                return false;
            }
            match self.node_relationship(candidate, child) {
                Relationship::Equal => {
                    trace!("{at} already has {candidate} as {child}");
                    return false;
                }
                Relationship::Specializes => return self.add_specialization(child, candidate),
                Relationship::Generalizes => generalized.push(child),
                Relationship::Incomparable => {}
            }
        }

        for child in generalized {
            if let Some(node) = self.nodes.get_mut(at) {
                node.detach(child);
            }
            self.add_specialization(candidate, child);
        }
        match self.nodes.get_mut(at) {
            Some(node) => node.attach(candidate),
            None => false,
        }
    }
}
