//! Nested-set hierarchy nodes shared by the sales-person and territory trees.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Which nested-set tree a node id belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeKind {
    SalesPerson,
    Territory,
}

impl TreeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TreeKind::SalesPerson => "sales_person",
            TreeKind::Territory => "territory",
        }
    }
}

impl std::fmt::Display for TreeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A well-formed nested-set interval (`left <= right`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bounds {
    left: i64,
    right: i64,
}

impl Bounds {
    /// Returns `None` for an inverted interval.
    pub fn new(left: i64, right: i64) -> Option<Self> {
        (left <= right).then_some(Self { left, right })
    }

    pub fn left(&self) -> i64 {
        self.left
    }

    pub fn right(&self) -> i64 {
        self.right
    }
}

/// Hierarchy node snapshot as stored by the hierarchy tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct HierarchyNode {
    pub id: String,
    #[sqlx(rename = "lft")]
    pub left: i64,
    #[sqlx(rename = "rgt")]
    pub right: i64,
}

impl HierarchyNode {
    pub fn new(id: impl Into<String>, left: i64, right: i64) -> Self {
        Self {
            id: id.into(),
            left,
            right,
        }
    }

    /// The node's interval, or `None` when the stored bounds are inverted.
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::new(self.left, self.right)
    }
}
