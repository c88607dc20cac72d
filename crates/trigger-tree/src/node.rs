//! Tree nodes and the arena that owns them.

use crate::clause::Clause;
use crate::trigger::TriggerId;
use std::collections::HashSet;
use std::fmt;

/// Index of a node in its tree's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// One clause shared by one or more triggers.
///
/// `triggers` holds the triggers visible at this level; `all_triggers`
/// additionally keeps the more general ones they shadow.
#[derive(Debug, Clone)]
pub struct Node {
    clause: Clause,
    pub(crate) triggers: Vec<TriggerId>,
    pub(crate) all_triggers: Vec<TriggerId>,
    pub(crate) specializations: Vec<NodeId>,
}

impl Node {
    pub(crate) fn new(clause: Clause) -> Self {
        Self {
            clause,
            triggers: Vec::new(),
            all_triggers: Vec::new(),
            specializations: Vec::new(),
        }
    }

    pub(crate) fn with_trigger(clause: Clause, trigger: TriggerId) -> Self {
        Self {
            triggers: vec![trigger],
            all_triggers: vec![trigger],
            ..Self::new(clause)
        }
    }

    #[inline]
    pub fn clause(&self) -> &Clause {
        &self.clause
    }

    #[inline]
    pub fn triggers(&self) -> &[TriggerId] {
        &self.triggers
    }

    #[inline]
    pub fn all_triggers(&self) -> &[TriggerId] {
        &self.all_triggers
    }

    #[inline]
    pub fn specializations(&self) -> &[NodeId] {
        &self.specializations
    }

    pub(crate) fn detach(&mut self, child: NodeId) {
        self.specializations.retain(|c| *c != child);
    }

    pub(crate) fn attach(&mut self, child: NodeId) -> bool {
        if self.specializations.contains(&child) {
            return false;
        }
        self.specializations.push(child);
        true
    }
}

/// Slot arena with free-list reuse. Edges are `NodeId` lists, so moving a
/// subtree is an edge rewrite.
#[derive(Debug, Default)]
pub(crate) struct Nodes {
    slots: Vec<Option<Node>>,
    free: Vec<usize>,
}

impl Nodes {
    pub(crate) fn alloc(&mut self, node: Node) -> NodeId {
        match self.free.pop() {
            Some(index) => {
                self.slots[index] = Some(node);
                NodeId(index)
            }
            None => {
                self.slots.push(Some(node));
                NodeId(self.slots.len() - 1)
            }
        }
    }

    pub(crate) fn get(&self, id: NodeId) -> Option<&Node> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots.get_mut(id.0).and_then(Option::as_mut)
    }

    /// Children of `id`, copied so the caller may restructure while iterating.
    pub(crate) fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.get(id)
            .map(|n| n.specializations.clone())
            .unwrap_or_default()
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Free every node not reachable from `root`. Returns how many were freed.
    pub(crate) fn collect_garbage(&mut self, root: NodeId) -> usize {
        let mut reachable = HashSet::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if reachable.insert(id) {
                if let Some(node) = self.get(id) {
                    stack.extend(node.specializations.iter().copied());
                }
            }
        }

        let mut freed = 0;
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.is_some() && !reachable.contains(&NodeId(index)) {
                *slot = None;
                self.free.push(index);
                freed += 1;
            }
        }
        freed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use expression::Expression;

    fn leaf(name: &str) -> Node {
        Node::new(Clause::new(vec![Expression::exists(name)]))
    }

    #[test]
    fn garbage_collection_reuses_slots() {
        let mut nodes = Nodes::default();
        let root = nodes.alloc(Node::new(Clause::empty()));
        let kept = nodes.alloc(leaf("a"));
        let dropped = nodes.alloc(leaf("b"));
        nodes.get_mut(root).unwrap().attach(kept);

        assert_eq!(nodes.collect_garbage(root), 1);
        assert!(nodes.get(dropped).is_none());
        assert_eq!(nodes.len(), 2);

        let reused = nodes.alloc(leaf("c"));
        assert_eq!(reused, dropped);
    }

    #[test]
    fn attach_is_idempotent() {
        let mut node = leaf("a");
        assert!(node.attach(NodeId(3)));
        assert!(!node.attach(NodeId(3)));
        node.detach(NodeId(3));
        assert!(node.specializations().is_empty());
    }
}
