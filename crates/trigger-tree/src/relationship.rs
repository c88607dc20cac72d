//! Relationship between two logical conditions.

use std::fmt;

/// How one condition relates to another.
///
/// `A Specializes B` means every memory satisfying `A` also satisfies `B`
/// but not the other way round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relationship {
    Equal,
    Specializes,
    Generalizes,
    Incomparable,
}

impl Relationship {
    /// The relationship seen from the other operand.
    #[must_use]
    pub fn swap(self) -> Self {
        match self {
            Self::Specializes => Self::Generalizes,
            Self::Generalizes => Self::Specializes,
            other => other,
        }
    }

    /// Swap only when `swapped` is set.
    #[must_use]
    #[inline]
    pub fn swap_if(self, swapped: bool) -> Self {
        if swapped {
            self.swap()
        } else {
            self
        }
    }
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Equal => "Equal",
            Self::Specializes => "Specializes",
            Self::Generalizes => "Generalizes",
            Self::Incomparable => "Incomparable",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::Relationship::*;

    #[test]
    fn swap_inverts_direction_only() {
        assert_eq!(Specializes.swap(), Generalizes);
        assert_eq!(Generalizes.swap(), Specializes);
        assert_eq!(Equal.swap(), Equal);
        assert_eq!(Incomparable.swap(), Incomparable);
        assert_eq!(Specializes.swap_if(false), Specializes);
    }
}
