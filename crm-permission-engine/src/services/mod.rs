//! Services layer for the CRM permission engine.
//!
//! Hierarchy lookups, containment arithmetic, and the visibility policy
//! built on them.

pub mod bounds;
pub mod containment;
mod database;
pub mod error;
pub mod filter;
pub mod identity;
pub mod memory;
pub mod metrics;
pub mod policy;
mod store;

pub use database::PgHierarchyStore;
pub use error::{IntegrityError, StoreError};
pub use filter::{FilterClause, FilterExpression, RecordFacts};
pub use memory::{InMemoryHierarchyStore, Lookup};
pub use policy::{
    AccessDecision, DenyReason, GrantPath, OverrideDecision, OverrideReason, VisibilityPolicy,
};
pub use store::HierarchyStore;
