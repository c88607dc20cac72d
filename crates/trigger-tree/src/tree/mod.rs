//! The trigger tree: a specialization hierarchy of clauses.
//!
//! Every active clause of every trigger lives in a [`Node`]. A node's
//! children strictly specialize it and siblings are mutually incomparable,
//! so matching can stop at the most specific clauses that hold.
//!
//! The root node carries the empty clause and is never removed; the nodes
//! directly below it are the tree's roots.

mod insert;
mod matching;
mod remove;
mod render;
mod verify;

pub use matching::TriggerMatch;

use crate::clause::Clause;
use crate::comparer::{ClauseOptimizer, Comparers, PredicateComparer};
use crate::node::{Node, NodeId, Nodes};
use crate::quantifier::Quantifier;
use crate::relationship::Relationship;
use crate::trigger::{Trigger, TriggerId};
use expression::{Expression, ExpressionType};
use std::collections::BTreeMap;
use tracing::debug;

pub struct TriggerTree<A> {
    nodes: Nodes,
    root: NodeId,
    triggers: BTreeMap<TriggerId, Trigger<A>>,
    comparers: Comparers,
    optimizers: Vec<Box<dyn ClauseOptimizer>>,
    next_trigger: usize,
    total_triggers: usize,
}

impl<A: PartialEq> Default for TriggerTree<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: PartialEq> TriggerTree<A> {
    pub fn new() -> Self {
        let mut nodes = Nodes::default();
        let root = nodes.alloc(Node::new(Clause::empty()));
        Self {
            nodes,
            root,
            triggers: BTreeMap::new(),
            comparers: Comparers::new(),
            optimizers: Vec::new(),
            next_trigger: 0,
            total_triggers: 0,
        }
    }

    /// Register a predicate comparer for `expression_type`.
    ///
    /// Comparers shape the tree, so they are set while building it, before
    /// any trigger is added.
    #[must_use]
    pub fn with_comparer(
        mut self,
        expression_type: ExpressionType,
        comparer: impl PredicateComparer + 'static,
    ) -> Self {
        self.comparers.register(expression_type, comparer);
        self
    }

    /// Replace the whole comparer registry. Construction time only, like
    /// [`TriggerTree::with_comparer`].
    #[must_use]
    pub fn with_comparers(mut self, comparers: Comparers) -> Self {
        self.comparers = comparers;
        self
    }

    /// Append a clause optimizer; optimizers run in registration order.
    #[must_use]
    pub fn with_optimizer(mut self, optimizer: impl ClauseOptimizer + 'static) -> Self {
        self.optimizers.push(Box::new(optimizer));
        self
    }

    /// Normalize `expression` and merge its clauses into the tree.
    ///
    /// A trigger whose expression has no satisfiable clause, or whose every
    /// clause already carries an equal action, is not retained: the returned
    /// id then resolves to nothing.
    pub fn add_trigger(
        &mut self,
        expression: Expression,
        action: A,
        quantifiers: Vec<Quantifier>,
    ) -> TriggerId {
        let id = TriggerId(self.next_trigger);
        self.next_trigger += 1;

        let trigger = Trigger::new(
            id,
            expression,
            action,
            quantifiers,
            &self.comparers,
            &self.optimizers,
        );
        debug!("Add {trigger}");
        let clauses: Vec<Clause> = trigger.active_clauses().map(Clause::without_ignored).collect();
        self.triggers.insert(id, trigger);

        let mut added = false;
        for clause in clauses {
            added |= self.insert_clause(clause, id);
        }
        self.nodes.collect_garbage(self.root);

        if added {
            self.total_triggers += 1;
        } else {
            debug!("{id} not retained");
            self.triggers.remove(&id);
        }
        id
    }

    /// Remove a trigger everywhere it occurs. Returns false if it was not present.
    pub fn remove_trigger(&mut self, id: TriggerId) -> bool {
        if !self.triggers.contains_key(&id) {
            return false;
        }
        debug!("Remove {id}");
        let removed = self.remove_everywhere(id);
        self.nodes.collect_garbage(self.root);
        self.triggers.remove(&id);
        if removed {
            self.total_triggers -= 1;
        }
        removed
    }

    /// Number of live triggers.
    #[inline]
    pub fn total_triggers(&self) -> usize {
        self.total_triggers
    }

    pub fn trigger(&self, id: TriggerId) -> Option<&Trigger<A>> {
        self.triggers.get(&id)
    }

    /// Live triggers in insertion order.
    pub fn triggers(&self) -> impl Iterator<Item = &Trigger<A>> {
        self.triggers.values()
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Number of top-level clauses (children of the empty root clause).
    pub fn root_count(&self) -> usize {
        self.node(self.root).map_or(0, |n| n.specializations().len())
    }

    /// Number of live nodes, not counting the root.
    pub fn node_count(&self) -> usize {
        self.nodes.len() - 1
    }

    #[inline]
    pub fn comparers(&self) -> &Comparers {
        &self.comparers
    }

    pub(crate) fn node_relationship(&self, a: NodeId, b: NodeId) -> Relationship {
        match (self.nodes.get(a), self.nodes.get(b)) {
            (Some(a), Some(b)) => a.clause().relationship(b.clause(), &self.comparers),
            _ => Relationship::Incomparable,
        }
    }

    pub(crate) fn trigger_relationship(&self, a: TriggerId, b: TriggerId) -> Relationship {
        match (self.triggers.get(&a), self.triggers.get(&b)) {
            (Some(a), Some(b)) => a.relationship(b, &self.comparers),
            _ => Relationship::Incomparable,
        }
    }

    /// Live nodes reachable from the root, parents before children.
    pub fn reachable(&self) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut seen = std::collections::HashSet::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            order.push(id);
            if let Some(node) = self.nodes.get(id) {
                stack.extend(node.specializations().iter().rev().copied());
            }
        }
        order
    }
}
