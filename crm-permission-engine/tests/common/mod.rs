//! Test helper module for permission engine integration tests.
//!
//! Provides hierarchy fixtures for the in-memory store and setup utilities
//! for PostgreSQL-backed tests.

#![allow(dead_code)]

use crm_permission_engine::{
    config::DatabaseConfig, db, models::AccessSettings, InMemoryHierarchyStore, VisibilityPolicy,
};
use once_cell::sync::Lazy;
use sqlx::PgPool;
use std::sync::Arc;

static TRACING: Lazy<()> = Lazy::new(|| {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
});

pub fn init_tracing() {
    Lazy::force(&TRACING);
}

pub const ROOT_USER: &str = "root@example.com";
pub const MANAGER_A: &str = "a@example.com";
pub const REP_A1: &str = "a1@example.com";
pub const MANAGER_B: &str = "b@example.com";
pub const UNPLACED_USER: &str = "ghost@example.com";
/// One employee linked to two sales persons.
pub const SPLIT_OWNER: &str = "split@example.com";
/// Two employees for the same user.
pub const TWICE_LINKED_OWNER: &str = "twice@example.com";
/// Sales person stored with `lft > rgt`.
pub const INVERTED_OWNER: &str = "inverted@example.com";

/// Sales-person tree:
///
/// ```text
/// SP-Root (1,10)
/// ├── SP-A (2,5)
/// │   └── SP-A1 (3,4)
/// └── SP-B (6,9)
/// ```
///
/// Territory tree:
///
/// ```text
/// World (1,30)
/// ├── West (2,9)
/// ├── North (10,15)      managed by SP-A
/// │   └── North-East (11,12)
/// ├── Central (16,19)
/// └── South (20,25)      managed by SP-A
///     └── South-West (22,23)
/// ```
pub fn sample_store() -> InMemoryHierarchyStore {
    InMemoryHierarchyStore::new()
        .with_placed_user(ROOT_USER, "SP-Root", 1, 10)
        .with_placed_user(MANAGER_A, "SP-A", 2, 5)
        .with_placed_user(REP_A1, "SP-A1", 3, 4)
        .with_placed_user(MANAGER_B, "SP-B", 6, 9)
        .with_territory("World", None, 1, 30)
        .with_territory("West", None, 2, 9)
        .with_territory("North", Some("SP-A"), 10, 15)
        .with_territory("North-East", None, 11, 12)
        .with_territory("Central", None, 16, 19)
        .with_territory("South", Some("SP-A"), 20, 25)
        .with_territory("South-West", None, 22, 23)
}

pub fn policy_for(store: InMemoryHierarchyStore) -> VisibilityPolicy {
    init_tracing();
    VisibilityPolicy::new(Arc::new(store))
}

pub fn sample_policy() -> VisibilityPolicy {
    policy_for(sample_store())
}

pub fn sample_policy_with(settings: AccessSettings) -> VisibilityPolicy {
    policy_for(sample_store().with_settings(settings))
}

/// Nested-set bounds for a tree given as `parents[k]` = parent of node `k + 1`
/// (node 0 is the root; every parent index is smaller than its child).
pub fn nested_set_bounds(parents: &[usize]) -> Vec<(i64, i64)> {
    let count = parents.len() + 1;
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); count];
    for (k, parent) in parents.iter().enumerate() {
        children[*parent].push(k + 1);
    }

    let mut bounds = vec![(0, 0); count];
    let mut counter = 0i64;
    let mut stack = vec![(0usize, false)];
    while let Some((node, visited)) = stack.pop() {
        counter += 1;
        if visited {
            bounds[node].1 = counter;
        } else {
            bounds[node].0 = counter;
            stack.push((node, true));
            for child in children[node].iter().rev() {
                stack.push((*child, false));
            }
        }
    }
    bounds
}

// ============================================================================
// PostgreSQL helpers
// ============================================================================

static DATABASE_LOCK: Lazy<tokio::sync::Mutex<()>> = Lazy::new(|| tokio::sync::Mutex::new(()));

/// Serialize tests that reset the shared database.
pub async fn lock_database() -> tokio::sync::MutexGuard<'static, ()> {
    DATABASE_LOCK.lock().await
}

pub fn test_database_config() -> DatabaseConfig {
    DatabaseConfig {
        url: std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "postgres://localhost/crm_permissions_test".to_string()),
        max_connections: 5,
        min_connections: 1,
        acquire_timeout_seconds: 5,
    }
}

/// Connect, migrate, and reset every table the engine reads.
pub async fn create_test_pool() -> Result<PgPool, anyhow::Error> {
    init_tracing();
    let pool = db::create_pool(&test_database_config()).await?;
    db::run_migrations(&pool).await?;
    cleanup_test_data(&pool).await?;
    Ok(pool)
}

pub async fn cleanup_test_data(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("DROP TABLE IF EXISTS leads").execute(pool).await?;
    sqlx::query(
        "TRUNCATE territories, sales_persons, employees, user_roles, crm_full_access_roles",
    )
    .execute(pool)
    .await?;
    sqlx::query("UPDATE crm_settings SET engine_enabled = TRUE")
        .execute(pool)
        .await?;
    Ok(())
}

/// Load the same hierarchy as [`sample_store`] into PostgreSQL.
pub async fn seed_sample_hierarchy(pool: &PgPool) -> Result<(), sqlx::Error> {
    let users = [
        (ROOT_USER, "SP-Root", None, 1i64, 10i64),
        (MANAGER_A, "SP-A", Some("SP-Root"), 2, 5),
        (REP_A1, "SP-A1", Some("SP-A"), 3, 4),
        (MANAGER_B, "SP-B", Some("SP-Root"), 6, 9),
    ];
    for (user_id, sales_person_id, parent, lft, rgt) in users {
        let employee_id = format!("EMP-{}", user_id);
        sqlx::query("INSERT INTO employees (employee_id, user_id) VALUES ($1, $2)")
            .bind(&employee_id)
            .bind(user_id)
            .execute(pool)
            .await?;
        sqlx::query(
            r#"
            INSERT INTO sales_persons (sales_person_id, parent_sales_person_id, employee_id, lft, rgt)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(sales_person_id)
        .bind(parent)
        .bind(&employee_id)
        .bind(lft)
        .bind(rgt)
        .execute(pool)
        .await?;
    }

    let territories = [
        ("World", None, None, 1i64, 30i64),
        ("West", Some("World"), None, 2, 9),
        ("North", Some("World"), Some("SP-A"), 10, 15),
        ("North-East", Some("North"), None, 11, 12),
        ("Central", Some("World"), None, 16, 19),
        ("South", Some("World"), Some("SP-A"), 20, 25),
        ("South-West", Some("South"), None, 22, 23),
    ];
    for (territory_id, parent, manager, lft, rgt) in territories {
        sqlx::query(
            r#"
            INSERT INTO territories (territory_id, parent_territory_id, territory_manager, lft, rgt)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(territory_id)
        .bind(parent)
        .bind(manager)
        .bind(lft)
        .bind(rgt)
        .execute(pool)
        .await?;
    }

    Ok(())
}

/// Add identity links and nodes the engine must refuse to resolve:
/// [`SPLIT_OWNER`], [`TWICE_LINKED_OWNER`], [`INVERTED_OWNER`], and an
/// inverted `Broken` territory under North.
pub async fn seed_irregular_nodes(pool: &PgPool) -> Result<(), sqlx::Error> {
    let employees = [
        ("EMP-split", SPLIT_OWNER),
        ("EMP-twice-1", TWICE_LINKED_OWNER),
        ("EMP-twice-2", TWICE_LINKED_OWNER),
        ("EMP-inverted", INVERTED_OWNER),
    ];
    for (employee_id, user_id) in employees {
        sqlx::query("INSERT INTO employees (employee_id, user_id) VALUES ($1, $2)")
            .bind(employee_id)
            .bind(user_id)
            .execute(pool)
            .await?;
    }

    let sales_persons = [
        ("SP-split-1", "SP-A", "EMP-split", 3i64, 3i64),
        ("SP-split-2", "SP-B", "EMP-split", 7, 7),
        ("SP-twice", "SP-A", "EMP-twice-1", 4, 4),
        ("SP-inverted", "SP-A", "EMP-inverted", 4, 1),
    ];
    for (sales_person_id, parent, employee_id, lft, rgt) in sales_persons {
        sqlx::query(
            r#"
            INSERT INTO sales_persons (sales_person_id, parent_sales_person_id, employee_id, lft, rgt)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(sales_person_id)
        .bind(parent)
        .bind(employee_id)
        .bind(lft)
        .bind(rgt)
        .execute(pool)
        .await?;
    }

    sqlx::query(
        r#"
        INSERT INTO territories (territory_id, parent_territory_id, lft, rgt)
        VALUES ('Broken', 'North', 13, 12)
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create a `leads` table holding `(lead_id, lead_owner, territory)` rows.
pub async fn seed_leads(
    pool: &PgPool,
    leads: &[(&str, Option<&str>, Option<&str>)],
) -> Result<(), sqlx::Error> {
    sqlx::query("CREATE TABLE leads (lead_id TEXT PRIMARY KEY, lead_owner TEXT, territory TEXT)")
        .execute(pool)
        .await?;
    for (lead_id, owner, territory) in leads {
        sqlx::query("INSERT INTO leads (lead_id, lead_owner, territory) VALUES ($1, $2, $3)")
            .bind(*lead_id)
            .bind(*owner)
            .bind(*territory)
            .execute(pool)
            .await?;
    }
    Ok(())
}
