//! Tree bounds lookups. Every failure degrades to "absent".

use super::metrics::record_store_error;
use super::store::HierarchyStore;
use crate::models::{Bounds, TreeKind};

/// Interval of `node_id` in `tree`.
///
/// `None` for an empty or unknown id, inverted stored bounds, or an
/// unreachable store.
pub async fn bounds_of(
    store: &dyn HierarchyStore,
    tree: TreeKind,
    node_id: &str,
) -> Option<Bounds> {
    if node_id.is_empty() {
        return None;
    }

    let node = match store.node(tree, node_id).await {
        Ok(node) => node?,
        Err(e) => {
            tracing::warn!(tree = %tree, node_id = %node_id, error = %e, "Bounds lookup failed");
            record_store_error("node_bounds");
            return None;
        }
    };

    let bounds = node.bounds();
    if bounds.is_none() {
        tracing::warn!(
            tree = %tree,
            node_id = %node_id,
            left = node.left,
            right = node.right,
            "Ignoring node with inverted bounds"
        );
    }
    bounds
}

/// Subtree intervals of every territory managed by `sales_person_id`.
///
/// Nodes with unusable bounds are skipped; a failed lookup yields no ranges.
pub async fn managed_territory_bounds(
    store: &dyn HierarchyStore,
    sales_person_id: &str,
) -> Vec<Bounds> {
    if sales_person_id.is_empty() {
        return Vec::new();
    }

    match store.territories_managed_by(sales_person_id).await {
        Ok(territories) => territories.iter().filter_map(|t| t.bounds()).collect(),
        Err(e) => {
            tracing::warn!(
                sales_person_id = %sales_person_id,
                error = %e,
                "Managed territory lookup failed"
            );
            record_store_error("managed_territories");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::HierarchyNode;
    use crate::services::InMemoryHierarchyStore;

    #[tokio::test]
    async fn resolves_known_nodes() {
        let store = InMemoryHierarchyStore::new()
            .with_sales_person("A", None, 2, 5)
            .with_territory("North", None, 10, 15);

        assert_eq!(
            bounds_of(&store, TreeKind::SalesPerson, "A").await,
            Bounds::new(2, 5)
        );
        assert_eq!(
            bounds_of(&store, TreeKind::Territory, "North").await,
            Bounds::new(10, 15)
        );
    }

    #[tokio::test]
    async fn empty_unknown_and_cross_tree_ids_are_absent() {
        let store = InMemoryHierarchyStore::new().with_sales_person("A", None, 2, 5);

        assert_eq!(bounds_of(&store, TreeKind::SalesPerson, "").await, None);
        assert_eq!(bounds_of(&store, TreeKind::SalesPerson, "Z").await, None);
        assert_eq!(bounds_of(&store, TreeKind::Territory, "A").await, None);
    }

    #[tokio::test]
    async fn unreachable_store_degrades_to_absent() {
        let store = InMemoryHierarchyStore::new()
            .with_sales_person("A", None, 2, 5)
            .unreachable();

        assert_eq!(bounds_of(&store, TreeKind::SalesPerson, "A").await, None);
        assert!(managed_territory_bounds(&store, "A").await.is_empty());
    }

    #[tokio::test]
    async fn managed_ranges_skip_inverted_nodes() {
        let store = InMemoryHierarchyStore::new()
            .with_territory("North", Some("A"), 10, 15)
            .with_territory("South", Some("A"), 20, 25)
            .with_territory("East", Some("B"), 30, 35)
            .with_node(TreeKind::Territory, HierarchyNode::new("Broken", 9, 1), Some("A"));

        let ranges = managed_territory_bounds(&store, "A").await;
        assert_eq!(ranges.len(), 2);
        assert!(ranges.contains(&Bounds::new(10, 15).unwrap()));
        assert!(ranges.contains(&Bounds::new(20, 25).unwrap()));
    }
}
