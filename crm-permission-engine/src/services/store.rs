//! Read-only data access the visibility rules depend on.

use async_trait::async_trait;
use std::collections::BTreeSet;

use super::error::StoreError;
use crate::models::{HierarchyNode, TreeKind};

/// Collaborator owning the hierarchy, identity, role and settings tables.
///
/// Identity lookups return every matching row so the resolver can detect
/// broken 1:1 links instead of silently picking one.
#[async_trait]
pub trait HierarchyStore: Send + Sync {
    /// The engine toggle from CRM settings.
    async fn engine_enabled(&self) -> Result<bool, StoreError>;

    async fn roles_for_user(&self, user_id: &str) -> Result<BTreeSet<String>, StoreError>;

    async fn full_access_roles(&self) -> Result<BTreeSet<String>, StoreError>;

    /// Employee ids linked to `user_id`.
    async fn employees_for_user(&self, user_id: &str) -> Result<Vec<String>, StoreError>;

    /// Sales-person node ids linked to `employee_id`.
    async fn sales_persons_for_employee(
        &self,
        employee_id: &str,
    ) -> Result<Vec<String>, StoreError>;

    async fn node(
        &self,
        tree: TreeKind,
        node_id: &str,
    ) -> Result<Option<HierarchyNode>, StoreError>;

    /// Territory nodes whose `territory_manager` is `sales_person_id`.
    async fn territories_managed_by(
        &self,
        sales_person_id: &str,
    ) -> Result<Vec<HierarchyNode>, StoreError>;
}
