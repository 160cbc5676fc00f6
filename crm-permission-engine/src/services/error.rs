use serde::Serialize;
use thiserror::Error;

/// Failure of the backing hierarchy store.
///
/// Never reaches callers of the visibility entry points; a failed lookup
/// counts as "no match".
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Hierarchy data that breaks the one-user-one-sales-person invariant.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IntegrityError {
    #[error("user '{user_id}' is linked to {count} employees")]
    DuplicateIdentityLink { user_id: String, count: usize },

    #[error("employee '{employee_id}' is linked to {count} sales persons")]
    DuplicateSalesPerson { employee_id: String, count: usize },
}
