//! In-memory hierarchy store for tests and for hosts that keep the trees in process.

use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet, HashSet};

use super::error::StoreError;
use super::store::HierarchyStore;
use crate::models::{AccessSettings, HierarchyNode, TreeKind};

/// Lookups that can be switched to fail, simulating an unreachable backing store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lookup {
    EngineFlag,
    Roles,
    FullAccessRoles,
    Identity,
    Nodes,
    ManagedTerritories,
}

impl Lookup {
    const ALL: [Lookup; 6] = [
        Lookup::EngineFlag,
        Lookup::Roles,
        Lookup::FullAccessRoles,
        Lookup::Identity,
        Lookup::Nodes,
        Lookup::ManagedTerritories,
    ];
}

/// Snapshot of the hierarchy tables held in memory.
///
/// Built once with the `with_*` methods; identity links are kept as plain
/// rows so duplicate links can be represented.
#[derive(Debug, Clone, Default)]
pub struct InMemoryHierarchyStore {
    settings: AccessSettings,
    user_roles: BTreeMap<String, BTreeSet<String>>,
    employee_links: Vec<(String, String)>,
    sales_person_links: Vec<(String, String)>,
    nodes: BTreeMap<(TreeKind, String), HierarchyNode>,
    territory_managers: BTreeMap<String, String>,
    failing: HashSet<Lookup>,
}

impl InMemoryHierarchyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(mut self, settings: AccessSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_roles<I, S>(mut self, user_id: &str, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.user_roles
            .entry(user_id.to_string())
            .or_default()
            .extend(roles.into_iter().map(Into::into));
        self
    }

    /// Link a user to an employee record.
    pub fn with_user(mut self, user_id: &str, employee_id: &str) -> Self {
        self.employee_links
            .push((user_id.to_string(), employee_id.to_string()));
        self
    }

    /// Add a sales-person node, optionally linked to an employee.
    pub fn with_sales_person(
        mut self,
        sales_person_id: &str,
        employee_id: Option<&str>,
        left: i64,
        right: i64,
    ) -> Self {
        if let Some(employee_id) = employee_id {
            self.sales_person_links
                .push((employee_id.to_string(), sales_person_id.to_string()));
        }
        self.with_node(
            TreeKind::SalesPerson,
            HierarchyNode::new(sales_person_id, left, right),
            None,
        )
    }

    /// Add a user, a dedicated employee, and the sales-person node they map to.
    pub fn with_placed_user(
        self,
        user_id: &str,
        sales_person_id: &str,
        left: i64,
        right: i64,
    ) -> Self {
        let employee_id = format!("EMP-{}", user_id);
        self.with_user(user_id, &employee_id)
            .with_sales_person(sales_person_id, Some(&employee_id), left, right)
    }

    /// Add a territory node, optionally managed by a sales person.
    pub fn with_territory(
        self,
        territory_id: &str,
        manager: Option<&str>,
        left: i64,
        right: i64,
    ) -> Self {
        self.with_node(
            TreeKind::Territory,
            HierarchyNode::new(territory_id, left, right),
            manager,
        )
    }

    /// Insert a raw node, bypassing any bounds checks.
    pub fn with_node(
        mut self,
        tree: TreeKind,
        node: HierarchyNode,
        manager: Option<&str>,
    ) -> Self {
        if let (TreeKind::Territory, Some(manager)) = (tree, manager) {
            self.territory_managers
                .insert(node.id.clone(), manager.to_string());
        }
        self.nodes.insert((tree, node.id.clone()), node);
        self
    }

    pub fn failing(mut self, lookup: Lookup) -> Self {
        self.failing.insert(lookup);
        self
    }

    /// Fail every lookup.
    pub fn unreachable(mut self) -> Self {
        self.failing.extend(Lookup::ALL);
        self
    }

    fn check(&self, lookup: Lookup) -> Result<(), StoreError> {
        if self.failing.contains(&lookup) {
            return Err(StoreError::Unavailable(format!(
                "{:?} lookup unavailable",
                lookup
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl HierarchyStore for InMemoryHierarchyStore {
    async fn engine_enabled(&self) -> Result<bool, StoreError> {
        self.check(Lookup::EngineFlag)?;
        Ok(self.settings.engine_enabled)
    }

    async fn roles_for_user(&self, user_id: &str) -> Result<BTreeSet<String>, StoreError> {
        self.check(Lookup::Roles)?;
        Ok(self.user_roles.get(user_id).cloned().unwrap_or_default())
    }

    async fn full_access_roles(&self) -> Result<BTreeSet<String>, StoreError> {
        self.check(Lookup::FullAccessRoles)?;
        Ok(self.settings.full_access_roles.clone())
    }

    async fn employees_for_user(&self, user_id: &str) -> Result<Vec<String>, StoreError> {
        self.check(Lookup::Identity)?;
        Ok(self
            .employee_links
            .iter()
            .filter(|(user, _)| user == user_id)
            .map(|(_, employee)| employee.clone())
            .collect())
    }

    async fn sales_persons_for_employee(
        &self,
        employee_id: &str,
    ) -> Result<Vec<String>, StoreError> {
        self.check(Lookup::Identity)?;
        Ok(self
            .sales_person_links
            .iter()
            .filter(|(employee, _)| employee == employee_id)
            .map(|(_, sales_person)| sales_person.clone())
            .collect())
    }

    async fn node(
        &self,
        tree: TreeKind,
        node_id: &str,
    ) -> Result<Option<HierarchyNode>, StoreError> {
        self.check(Lookup::Nodes)?;
        Ok(self.nodes.get(&(tree, node_id.to_string())).cloned())
    }

    async fn territories_managed_by(
        &self,
        sales_person_id: &str,
    ) -> Result<Vec<HierarchyNode>, StoreError> {
        self.check(Lookup::ManagedTerritories)?;
        Ok(self
            .territory_managers
            .iter()
            .filter(|(_, manager)| manager.as_str() == sales_person_id)
            .filter_map(|(territory_id, _)| {
                self.nodes
                    .get(&(TreeKind::Territory, territory_id.clone()))
                    .cloned()
            })
            .collect())
    }
}
