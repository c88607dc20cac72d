use crate::node::NodeId;
use crate::trigger::TriggerId;
use std::fmt;
use thiserror::Error;

/// Structural property every node of a trigger tree must keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invariant {
    /// Every child strictly specializes its parent.
    Specialization,
    /// Children of one node are mutually incomparable.
    SiblingIncomparability,
    /// Every trigger of a node is covered by one of its visible triggers.
    TriggerCompleteness,
}

impl fmt::Display for Invariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Specialization => "specialization",
            Self::SiblingIncomparability => "sibling incomparability",
            Self::TriggerCompleteness => "trigger completeness",
        };
        write!(f, "{s}")
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("Tree error: {invariant} violated at {node}: {detail}")]
    InvariantViolation {
        node: NodeId,
        invariant: Invariant,
        detail: String,
    },
    #[error("Tree error: {node} refers to unknown trigger {trigger}")]
    UnknownTrigger { node: NodeId, trigger: TriggerId },
}
