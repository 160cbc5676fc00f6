//! Subtree membership by interval arithmetic.
//!
//! A node is a descendant-or-self of another iff its left bound lies within
//! the other's interval, so membership never walks the tree.

use crate::models::Bounds;

impl Bounds {
    /// `left <= point <= right`.
    pub fn contains_point(&self, point: i64) -> bool {
        self.left() <= point && point <= self.right()
    }

    /// Whether `inner` is a descendant-or-self of `self`.
    ///
    /// Checking the left bound suffices for a well-formed nested set.
    pub fn contains(&self, inner: &Bounds) -> bool {
        self.contains_point(inner.left())
    }
}

/// Interval form with optional operands; a missing side never matches.
pub fn contains(outer: Option<Bounds>, inner: Option<Bounds>) -> bool {
    match (outer, inner) {
        (Some(outer), Some(inner)) => outer.contains(&inner),
        _ => false,
    }
}

/// Whether `point` falls in any of `ranges`, stopping at the first hit.
pub fn any_contains_point(ranges: &[Bounds], point: i64) -> bool {
    ranges.iter().any(|range| range.contains_point(point))
}
