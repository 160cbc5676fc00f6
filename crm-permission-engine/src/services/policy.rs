//! Visibility policy for CRM records.
//!
//! Composes the global override (engine toggle and privileged roles) with
//! ownership-chain containment in the sales-person tree and territory
//! containment in the territory tree:
//! - Single records: [`VisibilityPolicy::evaluate`] / [`VisibilityPolicy::is_visible`]
//! - Bulk listing: [`VisibilityPolicy::build_filter`]
//!
//! Only an explicitly disabled engine fails open. Every other failed lookup
//! counts as "no match".

use serde::Serialize;
use std::sync::Arc;

use super::bounds::{bounds_of, managed_territory_bounds};
use super::containment::{any_contains_point, contains};
use super::error::IntegrityError;
use super::filter::{FilterClause, FilterExpression, RecordFacts};
use super::identity::sales_person_of;
use super::metrics::{record_store_error, FILTERS_BUILT_TOTAL, VISIBILITY_DECISIONS_TOTAL};
use super::store::HierarchyStore;
use crate::models::{Bounds, Record, TreeKind, PRIVILEGED_ROLE};

/// Why a user bypasses hierarchy checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "role", rename_all = "snake_case")]
pub enum OverrideReason {
    EngineDisabled,
    PrivilegedRole,
    FullAccessRole(String),
}

/// Outcome of the global override check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrideDecision {
    Unrestricted(OverrideReason),
    Restricted,
}

impl OverrideDecision {
    pub fn is_unrestricted(&self) -> bool {
        matches!(self, OverrideDecision::Unrestricted(_))
    }
}

/// Which containment rule granted a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantPath {
    Ownership,
    Territory,
}

/// Why a restricted user cannot see a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "tree", rename_all = "snake_case")]
pub enum DenyReason {
    /// The user has no sales-person placement.
    UserNotPlaced,
    /// The record owner has no sales-person placement.
    OwnerNotPlaced,
    /// A node involved in the check has no usable bounds.
    MissingBounds(TreeKind),
    /// The owner sits outside the user's sales-person subtree.
    OutsideSalesSubtree,
    /// The record has neither owner nor territory.
    NoTerritory,
    /// The user manages no territory with usable bounds.
    NoManagedTerritory,
    /// The territory lies outside every managed subtree.
    OutsideManagedTerritories,
}

/// Single-record decision; each path is a distinct variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", content = "detail", rename_all = "snake_case")]
pub enum AccessDecision {
    Unrestricted(OverrideReason),
    Granted(GrantPath),
    Denied(DenyReason),
    DataError(IntegrityError),
}

impl AccessDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(
            self,
            AccessDecision::Unrestricted(_) | AccessDecision::Granted(_)
        )
    }

    fn metric_labels(&self) -> (&'static str, &'static str) {
        match self {
            AccessDecision::Unrestricted(OverrideReason::EngineDisabled) => {
                ("unrestricted", "engine_disabled")
            }
            AccessDecision::Unrestricted(OverrideReason::PrivilegedRole) => {
                ("unrestricted", "privileged_role")
            }
            AccessDecision::Unrestricted(OverrideReason::FullAccessRole(_)) => {
                ("unrestricted", "full_access_role")
            }
            AccessDecision::Granted(GrantPath::Ownership) => ("granted", "ownership"),
            AccessDecision::Granted(GrantPath::Territory) => ("granted", "territory"),
            AccessDecision::Denied(DenyReason::UserNotPlaced)
            | AccessDecision::Denied(DenyReason::OwnerNotPlaced)
            | AccessDecision::Denied(DenyReason::OutsideSalesSubtree)
            | AccessDecision::Denied(DenyReason::MissingBounds(TreeKind::SalesPerson)) => {
                ("denied", "ownership")
            }
            AccessDecision::Denied(_) => ("denied", "territory"),
            AccessDecision::DataError(_) => ("data_error", "identity"),
        }
    }
}

/// Visibility rules over a shared hierarchy store.
#[derive(Clone)]
pub struct VisibilityPolicy {
    store: Arc<dyn HierarchyStore>,
}

impl VisibilityPolicy {
    pub fn new(store: Arc<dyn HierarchyStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &dyn HierarchyStore {
        self.store.as_ref()
    }

    /// Whether `user_id` bypasses hierarchy visibility altogether.
    #[tracing::instrument(skip_all, fields(user_id = %user_id))]
    pub async fn has_unrestricted_access(&self, user_id: &str) -> OverrideDecision {
        match self.store.engine_enabled().await {
            Ok(false) => return OverrideDecision::Unrestricted(OverrideReason::EngineDisabled),
            Ok(true) => {}
            // Only an explicit `false` disables the engine.
            Err(e) => {
                tracing::warn!(error = %e, "Engine flag lookup failed; keeping engine enabled");
                record_store_error("engine_flag");
            }
        }

        let roles = match self.store.roles_for_user(user_id).await {
            Ok(roles) => roles,
            Err(e) => {
                tracing::warn!(error = %e, "Role lookup failed");
                record_store_error("roles");
                return OverrideDecision::Restricted;
            }
        };

        if roles.contains(PRIVILEGED_ROLE) {
            return OverrideDecision::Unrestricted(OverrideReason::PrivilegedRole);
        }

        if roles.is_empty() {
            return OverrideDecision::Restricted;
        }

        match self.store.full_access_roles().await {
            Ok(allowed) => {
                if let Some(role) = roles.intersection(&allowed).next() {
                    return OverrideDecision::Unrestricted(OverrideReason::FullAccessRole(
                        role.clone(),
                    ));
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Full-access role lookup failed");
                record_store_error("full_access_roles");
            }
        }

        OverrideDecision::Restricted
    }

    /// Decide whether `user_id` may see `record`, reporting the deciding path.
    ///
    /// An owned record is judged by ownership alone; territory applies only
    /// when the record has no owner.
    #[tracing::instrument(
        skip_all,
        fields(user_id = %user_id, owner = ?record.owner(), territory = ?record.territory())
    )]
    pub async fn evaluate(&self, record: &Record, user_id: &str) -> AccessDecision {
        let decision = match self.has_unrestricted_access(user_id).await {
            OverrideDecision::Unrestricted(reason) => AccessDecision::Unrestricted(reason),
            OverrideDecision::Restricted => {
                let result = match record.owner() {
                    Some(owner) => self.evaluate_ownership(user_id, owner).await,
                    None => self.evaluate_territory(user_id, record.territory()).await,
                };
                result.unwrap_or_else(AccessDecision::DataError)
            }
        };

        let (outcome, path) = decision.metric_labels();
        VISIBILITY_DECISIONS_TOTAL
            .with_label_values(&[outcome, path])
            .inc();
        tracing::debug!(decision = ?decision, "Record visibility evaluated");

        decision
    }

    /// Record-level check: `true` only for unrestricted or granted decisions.
    pub async fn is_visible(&self, record: &Record, user_id: &str) -> bool {
        self.evaluate(record, user_id).await.is_allowed()
    }

    /// Predicate selecting every record `user_id` may see.
    ///
    /// A user with neither a sales-person placement nor a managed territory
    /// gets [`FilterExpression::MatchNone`].
    #[tracing::instrument(skip_all, fields(user_id = %user_id))]
    pub async fn build_filter(&self, user_id: &str) -> Result<FilterExpression, IntegrityError> {
        if self.has_unrestricted_access(user_id).await.is_unrestricted() {
            return Ok(self.finish_filter(FilterExpression::MatchAll));
        }

        let mut clauses = Vec::new();
        if let Some(sales_person) = sales_person_of(self.store(), user_id).await? {
            if let Some(bounds) =
                bounds_of(self.store(), TreeKind::SalesPerson, &sales_person).await
            {
                clauses.push(FilterClause::OwnedWithin(bounds));
            }

            let ranges = managed_territory_bounds(self.store(), &sales_person).await;
            if !ranges.is_empty() {
                clauses.push(FilterClause::UnownedInTerritories { ranges });
            }
        }

        Ok(self.finish_filter(FilterExpression::any_of(clauses)))
    }

    /// Subtree intervals of every territory `user_id` manages.
    pub async fn managed_territory_bounds(
        &self,
        user_id: &str,
    ) -> Result<Vec<Bounds>, IntegrityError> {
        match sales_person_of(self.store(), user_id).await? {
            Some(sales_person) => Ok(managed_territory_bounds(self.store(), &sales_person).await),
            None => Ok(Vec::new()),
        }
    }

    /// Resolve the hierarchy positions a [`FilterExpression`] is evaluated against.
    pub async fn record_facts(&self, record: &Record) -> Result<RecordFacts, IntegrityError> {
        let owner_left = match record.owner() {
            Some(owner) => match sales_person_of(self.store(), owner).await? {
                Some(sales_person) => {
                    bounds_of(self.store(), TreeKind::SalesPerson, &sales_person)
                        .await
                        .map(|b| b.left())
                }
                None => None,
            },
            None => None,
        };

        let territory_left = match record.territory() {
            Some(territory) => bounds_of(self.store(), TreeKind::Territory, territory)
                .await
                .map(|b| b.left()),
            None => None,
        };

        Ok(RecordFacts {
            has_owner: record.owner().is_some(),
            owner_left,
            territory_left,
        })
    }

    async fn evaluate_ownership(
        &self,
        user_id: &str,
        owner: &str,
    ) -> Result<AccessDecision, IntegrityError> {
        let Some(user_sales_person) = sales_person_of(self.store(), user_id).await? else {
            return Ok(AccessDecision::Denied(DenyReason::UserNotPlaced));
        };
        let Some(owner_sales_person) = sales_person_of(self.store(), owner).await? else {
            return Ok(AccessDecision::Denied(DenyReason::OwnerNotPlaced));
        };

        let user_bounds = bounds_of(self.store(), TreeKind::SalesPerson, &user_sales_person).await;
        let owner_bounds =
            bounds_of(self.store(), TreeKind::SalesPerson, &owner_sales_person).await;
        if user_bounds.is_none() || owner_bounds.is_none() {
            return Ok(AccessDecision::Denied(DenyReason::MissingBounds(
                TreeKind::SalesPerson,
            )));
        }

        if contains(user_bounds, owner_bounds) {
            Ok(AccessDecision::Granted(GrantPath::Ownership))
        } else {
            Ok(AccessDecision::Denied(DenyReason::OutsideSalesSubtree))
        }
    }

    async fn evaluate_territory(
        &self,
        user_id: &str,
        territory: Option<&str>,
    ) -> Result<AccessDecision, IntegrityError> {
        let Some(territory) = territory else {
            return Ok(AccessDecision::Denied(DenyReason::NoTerritory));
        };

        let ranges = self.managed_territory_bounds(user_id).await?;
        if ranges.is_empty() {
            return Ok(AccessDecision::Denied(DenyReason::NoManagedTerritory));
        }

        let Some(territory_bounds) = bounds_of(self.store(), TreeKind::Territory, territory).await
        else {
            return Ok(AccessDecision::Denied(DenyReason::MissingBounds(
                TreeKind::Territory,
            )));
        };

        if any_contains_point(&ranges, territory_bounds.left()) {
            Ok(AccessDecision::Granted(GrantPath::Territory))
        } else {
            Ok(AccessDecision::Denied(DenyReason::OutsideManagedTerritories))
        }
    }

    fn finish_filter(&self, filter: FilterExpression) -> FilterExpression {
        FILTERS_BUILT_TOTAL
            .with_label_values(&[filter.shape()])
            .inc();
        tracing::debug!(shape = filter.shape(), "Visibility filter built");
        filter
    }
}
