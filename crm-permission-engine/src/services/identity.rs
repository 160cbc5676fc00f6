//! User → employee → sales-person resolution.

use super::error::IntegrityError;
use super::metrics::record_store_error;
use super::store::HierarchyStore;

/// The sales-person node a user sits at, if any.
///
/// Absent when the user id is empty, either hop has no row, or the store is
/// unreachable. More than one row on either hop is an integrity violation and
/// is returned as an error rather than resolved arbitrarily.
pub async fn sales_person_of(
    store: &dyn HierarchyStore,
    user_id: &str,
) -> Result<Option<String>, IntegrityError> {
    if user_id.is_empty() {
        return Ok(None);
    }

    let employees = match store.employees_for_user(user_id).await {
        Ok(employees) => employees,
        Err(e) => {
            tracing::warn!(user_id = %user_id, error = %e, "Identity link lookup failed");
            record_store_error("identity_link");
            return Ok(None);
        }
    };

    let employee_id = match employees.as_slice() {
        [] => return Ok(None),
        [employee_id] => employee_id,
        _ => {
            let err = IntegrityError::DuplicateIdentityLink {
                user_id: user_id.to_string(),
                count: employees.len(),
            };
            tracing::error!(error = %err, "Identity link integrity violation");
            return Err(err);
        }
    };

    let sales_persons = match store.sales_persons_for_employee(employee_id).await {
        Ok(sales_persons) => sales_persons,
        Err(e) => {
            tracing::warn!(
                employee_id = %employee_id,
                error = %e,
                "Sales person lookup failed"
            );
            record_store_error("sales_person_link");
            return Ok(None);
        }
    };

    match sales_persons.as_slice() {
        [] => Ok(None),
        [sales_person_id] => Ok(Some(sales_person_id.clone())),
        _ => {
            let err = IntegrityError::DuplicateSalesPerson {
                employee_id: employee_id.clone(),
                count: sales_persons.len(),
            };
            tracing::error!(error = %err, "Sales person integrity violation");
            Err(err)
        }
    }
}
