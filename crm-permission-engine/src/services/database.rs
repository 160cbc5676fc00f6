//! PostgreSQL hierarchy store.
//!
//! Reads the tables created by `migrations/`; never writes.

use async_trait::async_trait;
use sqlx::postgres::PgPool;
use std::collections::BTreeSet;

use super::error::StoreError;
use super::store::HierarchyStore;
use crate::models::{HierarchyNode, TreeKind};

/// PostgreSQL-backed [`HierarchyStore`].
#[derive(Clone)]
pub struct PgHierarchyStore {
    pool: PgPool,
}

impl PgHierarchyStore {
    /// Create a new store from a connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HierarchyStore for PgHierarchyStore {
    async fn engine_enabled(&self) -> Result<bool, StoreError> {
        let enabled: Option<bool> =
            sqlx::query_scalar("SELECT engine_enabled FROM crm_settings WHERE singleton = TRUE")
                .fetch_optional(&self.pool)
                .await?;

        // A missing settings row means the field default, which is enabled.
        Ok(enabled.unwrap_or(true))
    }

    async fn roles_for_user(&self, user_id: &str) -> Result<BTreeSet<String>, StoreError> {
        let roles: Vec<String> =
            sqlx::query_scalar("SELECT role FROM user_roles WHERE user_id = $1")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;
        Ok(roles.into_iter().collect())
    }

    async fn full_access_roles(&self) -> Result<BTreeSet<String>, StoreError> {
        let roles: Vec<String> = sqlx::query_scalar("SELECT role FROM crm_full_access_roles")
            .fetch_all(&self.pool)
            .await?;
        Ok(roles.into_iter().collect())
    }

    async fn employees_for_user(&self, user_id: &str) -> Result<Vec<String>, StoreError> {
        let employees: Vec<String> = sqlx::query_scalar(
            "SELECT employee_id FROM employees WHERE user_id = $1 ORDER BY employee_id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(employees)
    }

    async fn sales_persons_for_employee(
        &self,
        employee_id: &str,
    ) -> Result<Vec<String>, StoreError> {
        let sales_persons: Vec<String> = sqlx::query_scalar(
            "SELECT sales_person_id FROM sales_persons WHERE employee_id = $1 ORDER BY sales_person_id",
        )
        .bind(employee_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(sales_persons)
    }

    async fn node(
        &self,
        tree: TreeKind,
        node_id: &str,
    ) -> Result<Option<HierarchyNode>, StoreError> {
        let query = match tree {
            TreeKind::SalesPerson => {
                "SELECT sales_person_id AS id, lft, rgt FROM sales_persons WHERE sales_person_id = $1"
            }
            TreeKind::Territory => {
                "SELECT territory_id AS id, lft, rgt FROM territories WHERE territory_id = $1"
            }
        };

        let node = sqlx::query_as::<_, HierarchyNode>(query)
            .bind(node_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(node)
    }

    async fn territories_managed_by(
        &self,
        sales_person_id: &str,
    ) -> Result<Vec<HierarchyNode>, StoreError> {
        let territories = sqlx::query_as::<_, HierarchyNode>(
            r#"
            SELECT territory_id AS id, lft, rgt
            FROM territories
            WHERE territory_manager = $1
            ORDER BY lft
            "#,
        )
        .bind(sales_person_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(territories)
    }
}
