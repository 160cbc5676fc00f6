//! Declarative "visible records" predicate for bulk listing.
//!
//! Built once per user by [`VisibilityPolicy::build_filter`] and translated
//! into a SQL condition over a record table, so listings never load rows just
//! to test them one by one.
//!
//! [`VisibilityPolicy::build_filter`]: super::policy::VisibilityPolicy::build_filter

use serde::Serialize;

use super::containment::any_contains_point;
use crate::models::{Bounds, RecordSchema};

/// Always-false condition; a user without any clause must see nothing.
pub const MATCH_NONE_SQL: &str = "(1 = 0)";

const SINGLE_EMPLOYEE_USERS_SQL: &str =
    "SELECT user_id FROM employees GROUP BY user_id HAVING COUNT(*) = 1";

const SINGLE_SALES_PERSON_EMPLOYEES_SQL: &str =
    "SELECT employee_id FROM sales_persons GROUP BY employee_id HAVING COUNT(*) = 1";

/// One way a restricted user can see a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "clause", rename_all = "snake_case")]
pub enum FilterClause {
    /// Owner's sales-person node lies within these bounds.
    OwnedWithin(Bounds),
    /// Record has no owner and its territory lies within one of the ranges.
    UnownedInTerritories { ranges: Vec<Bounds> },
}

/// Visibility predicate for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "clauses", rename_all = "snake_case")]
pub enum FilterExpression {
    MatchAll,
    MatchNone,
    AnyOf(Vec<FilterClause>),
}

/// Hierarchy positions of one record, resolved for in-memory filtering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordFacts {
    pub has_owner: bool,
    /// Left bound of the owner's sales-person node.
    pub owner_left: Option<i64>,
    /// Left bound of the record's territory node.
    pub territory_left: Option<i64>,
}

impl FilterExpression {
    /// OR of `clauses`; no clauses means no visibility.
    pub fn any_of(clauses: Vec<FilterClause>) -> Self {
        if clauses.is_empty() {
            FilterExpression::MatchNone
        } else {
            FilterExpression::AnyOf(clauses)
        }
    }

    pub fn shape(&self) -> &'static str {
        match self {
            FilterExpression::MatchAll => "match_all",
            FilterExpression::MatchNone => "match_none",
            FilterExpression::AnyOf(_) => "any_of",
        }
    }

    pub fn matches(&self, facts: &RecordFacts) -> bool {
        match self {
            FilterExpression::MatchAll => true,
            FilterExpression::MatchNone => false,
            FilterExpression::AnyOf(clauses) => clauses.iter().any(|c| c.matches(facts)),
        }
    }

    /// SQL condition over `schema`'s table.
    ///
    /// `MatchAll` renders as an empty string (no extra condition). Only
    /// integer bounds and static identifiers are interpolated.
    pub fn render(&self, schema: &RecordSchema) -> String {
        match self {
            FilterExpression::MatchAll => String::new(),
            FilterExpression::MatchNone => MATCH_NONE_SQL.to_string(),
            FilterExpression::AnyOf(clauses) => {
                let rendered: Vec<String> = clauses.iter().map(|c| c.render(schema)).collect();
                format!("({})", rendered.join(" OR "))
            }
        }
    }
}

impl FilterClause {
    pub fn matches(&self, facts: &RecordFacts) -> bool {
        match self {
            FilterClause::OwnedWithin(bounds) => facts
                .owner_left
                .is_some_and(|left| bounds.contains_point(left)),
            FilterClause::UnownedInTerritories { ranges } => {
                !facts.has_owner
                    && facts
                        .territory_left
                        .is_some_and(|left| any_contains_point(ranges, left))
            }
        }
    }

    fn render(&self, schema: &RecordSchema) -> String {
        match self {
            // Owners linked through more than one employee or sales-person
            // row resolve to no node, as do inverted bounds.
            FilterClause::OwnedWithin(bounds) => format!(
                "{owner} IN (\
                 SELECT e.user_id FROM employees e \
                 JOIN sales_persons sp ON sp.employee_id = e.employee_id \
                 WHERE sp.lft BETWEEN {lft} AND {rgt} \
                 AND sp.lft <= sp.rgt \
                 AND e.user_id IN ({single_employee}) \
                 AND sp.employee_id IN ({single_sales_person}))",
                owner = schema.owner_ref(),
                lft = bounds.left(),
                rgt = bounds.right(),
                single_employee = SINGLE_EMPLOYEE_USERS_SQL,
                single_sales_person = SINGLE_SALES_PERSON_EMPLOYEES_SQL,
            ),
            FilterClause::UnownedInTerritories { ranges } => {
                let owner = schema.owner_ref();
                let territory_conditions: Vec<String> = ranges
                    .iter()
                    .map(|r| format!("t.lft BETWEEN {} AND {}", r.left(), r.right()))
                    .collect();
                format!(
                    "(({owner} IS NULL OR {owner} = '') AND {territory} IN (\
                     SELECT t.territory_id FROM territories t \
                     WHERE t.lft <= t.rgt AND ({conds})))",
                    owner = owner,
                    territory = schema.territory_ref(),
                    conds = territory_conditions.join(" OR "),
                )
            }
        }
    }
}
