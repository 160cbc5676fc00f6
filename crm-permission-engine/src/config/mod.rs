use serde::Deserialize;
use service_core::config::{self as core_config, layered_builder};
use service_core::error::AppError;
use std::path::Path;
use validator::{Validate, ValidationError};

use crate::models::AccessSettings;

/// Environment prefix: `CRM__DATABASE__URL`, `CRM__ACCESS__ENGINE_ENABLED`, ...
pub const ENV_PREFIX: &str = "CRM";

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PermissionConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    #[validate(nested)]
    pub database: DatabaseConfig,
    /// Settings served by the in-memory store; the Postgres store reads
    /// them from `crm_settings` instead.
    #[serde(default)]
    pub access: AccessSettings,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "validate_pool_bounds"))]
pub struct DatabaseConfig {
    #[validate(length(min = 1, message = "database.url must be set"))]
    pub url: String,
    #[serde(default = "default_max_connections")]
    #[validate(range(min = 1))]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_acquire_timeout_seconds")]
    #[validate(range(min = 1))]
    pub acquire_timeout_seconds: u64,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_acquire_timeout_seconds() -> u64 {
    30
}

fn validate_pool_bounds(config: &DatabaseConfig) -> Result<(), ValidationError> {
    if config.min_connections > config.max_connections {
        return Err(ValidationError::new("min_connections_exceeds_max"));
    }
    Ok(())
}

impl PermissionConfig {
    pub fn load() -> Result<Self, AppError> {
        Self::load_from(None)
    }

    /// Load from `file` (or `configuration.*` in the working directory when
    /// `None`), overridden by `CRM__*` environment variables.
    pub fn load_from(file: Option<&Path>) -> Result<Self, AppError> {
        let config = layered_builder(ENV_PREFIX, file, &["access.full_access_roles"]).build()?;
        let config: PermissionConfig = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }
}
