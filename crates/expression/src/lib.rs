//! Expression Library
//!
//! The boolean expression model that trigger trees are built from:
//! - [`value`]: runtime values and the [`Memory`] expressions read from
//! - [`expression`]: the [`Expression`] tree, its node kinds, deep equality
//!   and canonical hashing
//! - [`rewrite`]: negation push-down and variable substitution
//! - [`evaluate`]: evaluation against a memory
//!
//! # Example
//! ```rust
//! use expression::{Expression, Memory};
//! let e = Expression::not(Expression::or(vec![
//!     Expression::exists("a"),
//!     Expression::exists("b"),
//! ]));
//! assert_eq!(e.push_down_not().to_string(), "!exists(a) && !exists(b)");
//! assert_eq!(e.try_evaluate_bool(&Memory::new().with("a", 1)), Ok(false));
//! ```

pub mod error;
pub mod evaluate;
pub mod expression;
pub mod rewrite;
pub mod value;

pub use error::{EvalError, Result};
pub use expression::{same_multiset, ComparisonOperator, Expression, ExpressionType};
pub use value::{Memory, Value};
