//! Random trigger workloads for exercising a trigger tree end to end.

pub mod driver;
pub mod generator;

pub use driver::{check_most_specific, run, tree_for, Workload};
pub use generator::{merge_bindings, ExpressionInfo, Generator};
