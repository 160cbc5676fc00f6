//! Hierarchy-based visibility for CRM records.
//!
//! Users see records owned inside their sales-person subtree, and unowned
//! records whose territory falls inside a territory subtree they manage.
//! Both trees are nested sets, so every membership test is a single interval
//! comparison and the bulk-listing filter renders to one SQL condition.

pub mod config;
pub mod db;
pub mod models;
pub mod services;
pub mod startup;

pub use models::{Bounds, HierarchyNode, Record, RecordSchema, TreeKind};
pub use services::{
    AccessDecision, FilterExpression, HierarchyStore, InMemoryHierarchyStore, PgHierarchyStore,
    VisibilityPolicy,
};
