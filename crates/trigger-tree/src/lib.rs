//! Trigger Tree
//!
//! Organizes boolean trigger expressions into a specialization hierarchy
//! so that matching a memory returns only the most specific triggers that
//! hold.
//!
//! - [`trigger`]: normalization of an expression into clauses
//! - [`clause`]: clause relationships and matching
//! - [`quantifier`]: expansion of templated predicates
//! - [`comparer`]: pluggable predicate comparers and clause optimizers
//! - [`tree`]: insertion, removal, matching and verification
//!
//! # Example
//! ```rust
//! use expression::{Expression, Memory};
//! use trigger_tree::TriggerTree;
//!
//! let mut tree = TriggerTree::new();
//! tree.add_trigger(Expression::exists("blah"), "general", vec![]);
//! tree.add_trigger(
//!     Expression::and(vec![Expression::exists("blah"), Expression::exists("foo")]),
//!     "specific",
//!     vec![],
//! );
//! let memory = Memory::new().with("blah", 1).with("foo", 1);
//! let fired: Vec<_> = tree.matches(&memory).iter().map(|t| *t.action()).collect();
//! assert_eq!(fired, vec!["specific"]);
//! ```

pub mod clause;
pub mod comparer;
pub mod error;
pub mod node;
pub mod quantifier;
pub mod relationship;
pub mod tree;
pub mod trigger;

pub use clause::Clause;
pub use comparer::{ClauseOptimizer, Comparers, NumericBoundComparer, PredicateComparer};
pub use error::{Invariant, TreeError};
pub use node::{Node, NodeId};
pub use quantifier::{Quantifier, QuantifierType};
pub use relationship::Relationship;
pub use tree::{TriggerMatch, TriggerTree};
pub use trigger::{Trigger, TriggerId};
