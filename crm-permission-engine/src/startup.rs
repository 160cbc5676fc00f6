//! Wiring from [`PermissionConfig`] to a ready [`VisibilityPolicy`].

use service_core::error::AppError;
use service_core::observability::init_tracing;
use std::sync::Arc;

use crate::config::PermissionConfig;
use crate::db;
use crate::services::{metrics, InMemoryHierarchyStore, PgHierarchyStore, VisibilityPolicy};

/// Install the global tracing subscriber and register metrics.
///
/// Call once per process, from inside a Tokio runtime when an OTLP endpoint
/// is configured.
pub fn init_observability(config: &PermissionConfig) -> Result<(), AppError> {
    init_tracing(
        &config.common.service_name,
        &config.common.log_level,
        config.common.otlp_endpoint.as_deref(),
    )?;
    metrics::init_metrics();

    tracing::info!(
        service = %config.common.service_name,
        engine_enabled = config.access.engine_enabled,
        "Permission engine observability initialized"
    );
    Ok(())
}

/// Connect to PostgreSQL, apply migrations, check the schema is readable,
/// and build a policy over the database-backed store.
pub async fn connect_policy(config: &PermissionConfig) -> Result<VisibilityPolicy, AppError> {
    let pool = db::create_pool(&config.database).await?;
    db::run_migrations(&pool).await?;
    db::health_check(&pool).await?;
    tracing::info!("Hierarchy store ready");

    Ok(VisibilityPolicy::new(Arc::new(PgHierarchyStore::new(pool))))
}

/// An empty in-memory store carrying the configured access settings.
pub fn in_memory_store(config: &PermissionConfig) -> InMemoryHierarchyStore {
    InMemoryHierarchyStore::new().with_settings(config.access.clone())
}
