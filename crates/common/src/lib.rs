//! Shared utilities for the trigger tree workspace.

pub mod args;
pub mod formatter;

pub use args::Args;
pub use formatter::RunReport;

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Computes a derived fingerprint by hashing all identifying inputs together.
///
/// NOTE: Uses `DefaultHasher` which is deterministic within a build but not
/// guaranteed stable across Rust versions.
pub fn compute_fp<T: Hash>(t: T) -> u64 {
    let mut h = DefaultHasher::new();
    t.hash(&mut h);
    h.finish()
}

/// Fingerprint of a multiset of fingerprints: the result does not depend on
/// the order in which `fps` are supplied.
pub fn compute_unordered_fp<T: Hash>(tag: T, fps: impl IntoIterator<Item = u64>) -> u64 {
    let mut fps: Vec<u64> = fps.into_iter().collect();
    fps.sort_unstable();
    compute_fp((tag, fps))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unordered_fp_ignores_order() {
        assert_eq!(
            compute_unordered_fp("and", [1, 2, 3]),
            compute_unordered_fp("and", [3, 1, 2])
        );
        assert_ne!(
            compute_unordered_fp("and", [1, 2, 3]),
            compute_unordered_fp("or", [1, 2, 3])
        );
    }

    #[test]
    fn fp_is_deterministic() {
        assert_eq!(compute_fp(("x", 1)), compute_fp(("x", 1)));
        assert_ne!(compute_fp(("x", 1)), compute_fp(("x", 2)));
    }
}
