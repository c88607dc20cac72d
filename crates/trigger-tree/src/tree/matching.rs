//! Most-specific matching against a memory.

use super::TriggerTree;
use crate::clause::Clause;
use crate::node::NodeId;
use crate::trigger::{Trigger, TriggerId};
use expression::Memory;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// A fired trigger together with the node clauses it fired on.
#[derive(Debug)]
pub struct TriggerMatch<'a, A> {
    pub trigger: &'a Trigger<A>,
    pub clauses: Vec<&'a Clause>,
}

impl<A: PartialEq> TriggerTree<A> {
    /// The most specific triggers that hold in `memory`, in insertion order.
    pub fn matches(&self, memory: &Memory) -> Vec<&Trigger<A>> {
        self.match_details(memory)
            .into_iter()
            .map(|m| m.trigger)
            .collect()
    }

    /// Like [`TriggerTree::matches`], also reporting which clauses fired.
    pub fn match_details(&self, memory: &Memory) -> Vec<TriggerMatch<'_, A>> {
        let mut memo = HashMap::new();
        let mut fired: BTreeMap<TriggerId, Vec<NodeId>> = BTreeMap::new();
        self.match_at(self.root, memory, &mut memo, &mut fired);
        debug!(
            "{} trigger(s) fired, {} node(s) evaluated",
            fired.len(),
            memo.len()
        );

        fired
            .into_iter()
            .filter_map(|(id, nodes)| {
                let trigger = self.triggers.get(&id)?;
                let clauses = nodes
                    .into_iter()
                    .filter_map(|n| self.nodes.get(n).map(|node| node.clause()))
                    .collect();
                Some(TriggerMatch { trigger, clauses })
            })
            .collect()
    }

    /// True if this node or a specialization below it fired.
    fn match_at(
        &self,
        at: NodeId,
        memory: &Memory,
        memo: &mut HashMap<NodeId, bool>,
        fired: &mut BTreeMap<TriggerId, Vec<NodeId>>,
    ) -> bool {
        if let Some(found) = memo.get(&at) {
            return *found;
        }
        let Some(node) = self.nodes.get(at) else {
            return false;
        };

        let mut found = false;
        for child in node.specializations() {
            if self.match_at(*child, memory, memo, fired) {
                found = true;
            }
        }

        // A more specific clause already answered for this one.
        if !found && matches!(node.clause().try_evaluate(memory), Ok(true)) {
            for id in node.triggers() {
                let Some(trigger) = self.triggers.get(id) else {
                    continue;
                };
                if trigger.matches(node.clause(), memory, &self.comparers) {
                    fired.entry(*id).or_default().push(at);
                    found = true;
                }
            }
        }

        memo.insert(at, found);
        found
    }
}
