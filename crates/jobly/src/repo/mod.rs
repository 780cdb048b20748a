//! Entity repositories.
//!
//! Each entity exposes `create`, `find_all`, `get`, `update` and `remove` as
//! associated functions taking `&impl GenericClient`, so they run the same on
//! a pooled connection or inside a caller-owned transaction. Query shape is
//! delegated to [`build_update`](crate::update::build_update) and
//! [`build_filters`](crate::filter::build_filters); repositories only add the
//! entity's table, columns and error translation.

pub mod company;
pub mod job;
pub mod user;

pub use company::{Company, CompanyDetail, CompanyJob, NewCompany};
pub use job::{Job, NewJob};
pub use user::{Application, NewUser, User, UserDetail};

use crate::error::{JoblyError, JoblyResult};
use crate::update::UpdateFields;

/// Reject update keys outside the entity's updatable fields.
///
/// Field names end up as SQL identifiers, so only known names get through.
pub(crate) fn check_updatable(
    entity: &str,
    fields: &UpdateFields,
    updatable: &[&str],
) -> JoblyResult<()> {
    let unknown: Vec<&str> = fields.keys().filter(|k| !updatable.contains(k)).collect();
    if unknown.is_empty() {
        return Ok(());
    }
    Err(JoblyError::validation(format!(
        "{entity} does not allow updating: {}",
        unknown.join(", ")
    )))
}

/// Turn a unique violation into a `Conflict` carrying `message`.
pub(crate) fn conflict_on_unique(err: JoblyError, message: impl FnOnce() -> String) -> JoblyError {
    if err.is_unique_violation() {
        JoblyError::conflict(message())
    } else {
        err
    }
}

/// Turn a check-constraint violation into a `Validation` error.
///
/// Out-of-range values (negative salary, equity above 1) are caller input
/// errors even though only the schema catches them.
pub(crate) fn invalid_on_check(err: JoblyError) -> JoblyError {
    match err {
        JoblyError::CheckViolation(detail) => JoblyError::validation(detail),
        err => err,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn updatable_fields_pass() {
        let fields = UpdateFields::new().set("name", "x").set("numEmployees", 3);
        assert!(check_updatable("company", &fields, &["name", "numEmployees"]).is_ok());
    }

    #[test]
    fn unknown_fields_are_listed() {
        let fields = UpdateFields::new()
            .set("name", "x")
            .set("handle", "c9")
            .set(r#"name"=1; --"#, 1);
        let err = check_updatable("company", &fields, &["name"]).unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("handle"));
    }

    #[test]
    fn empty_fields_are_left_to_the_builder() {
        assert!(check_updatable("company", &UpdateFields::new(), &["name"]).is_ok());
    }

    #[test]
    fn only_unique_violations_become_conflicts() {
        let err = conflict_on_unique(
            JoblyError::UniqueViolation("companies_name_key: duplicate".into()),
            || "Duplicate company: c1".into(),
        );
        assert!(err.is_conflict());

        let err = conflict_on_unique(JoblyError::not_found("x"), || unreachable!());
        assert!(err.is_not_found());
    }

    #[test]
    fn check_violations_become_validation_errors() {
        let err = invalid_on_check(JoblyError::CheckViolation(
            "jobs_salary_check: new row violates check constraint".into(),
        ));
        assert!(err.is_validation());
        assert_eq!(err.status_code(), 400);

        let err = invalid_on_check(JoblyError::UniqueViolation("x".into()));
        assert!(err.is_unique_violation());
    }
}
