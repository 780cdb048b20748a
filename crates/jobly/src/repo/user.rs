//! Users, keyed by `username`, and their job applications.

use super::{check_updatable, conflict_on_unique, invalid_on_check};
use crate::application::{ApplicationState, set_application_status};
use crate::client::GenericClient;
use crate::column::ColumnAliases;
use crate::error::{JoblyError, JoblyResult};
use crate::query::query;
use crate::row::{FromRow, RowExt};
use crate::update::{UpdateFields, build_update};
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;

pub const USER_ALIASES: ColumnAliases = ColumnAliases::new(&[
    ("firstName", "first_name"),
    ("lastName", "last_name"),
    ("isAdmin", "is_admin"),
]);

/// `password` must already be hashed by the caller.
pub const USER_UPDATABLE: &[&str] = &["firstName", "lastName", "password", "email"];

const COLUMNS: &str = "username, first_name, last_name, email, is_admin";

/// A user as exposed to callers; the password hash never leaves storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_admin: bool,
}

impl FromRow for User {
    fn from_row(row: &Row) -> JoblyResult<Self> {
        Ok(Self {
            username: row.try_get_column("username")?,
            first_name: row.try_get_column("first_name")?,
            last_name: row.try_get_column("last_name")?,
            email: row.try_get_column("email")?,
            is_admin: row.try_get_column("is_admin")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub username: String,
    /// Password hash, produced outside this crate.
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub is_admin: bool,
}

/// A user with the ids of the jobs they applied to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserDetail {
    #[serde(flatten)]
    pub user: User,
    pub jobs: Vec<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub job_id: i32,
    pub state: ApplicationState,
}

impl FromRow for Application {
    fn from_row(row: &Row) -> JoblyResult<Self> {
        let state: String = row.try_get_column("state")?;
        Ok(Self {
            job_id: row.try_get_column("job_id")?,
            state: state
                .parse()
                .map_err(|e: JoblyError| JoblyError::decode("state", e.to_string()))?,
        })
    }
}

impl User {
    /// Insert a user. A taken username is a [`JoblyError::Conflict`].
    pub async fn register(conn: &impl GenericClient, data: NewUser) -> JoblyResult<User> {
        let duplicate = query("SELECT username FROM users WHERE username = $1")
            .tag("users.duplicate_check")
            .bind(data.username.clone())
            .fetch_opt(conn)
            .await?;
        if duplicate.is_some() {
            return Err(JoblyError::conflict(format!(
                "Duplicate username: {}",
                data.username
            )));
        }

        let username = data.username.clone();
        let user: User = query(format!(
            "INSERT INTO users (username, password, first_name, last_name, email, is_admin) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {COLUMNS}"
        ))
        .tag("users.register")
        .bind(data.username)
        .bind(data.password)
        .bind(data.first_name)
        .bind(data.last_name)
        .bind(data.email)
        .bind(data.is_admin)
        .fetch_one_as(conn)
        .await
        .map_err(|e| {
            invalid_on_check(conflict_on_unique(e, || format!("Duplicate username: {username}")))
        })?;

        tracing::info!(target: "jobly.repo", username = %user.username, "user registered");
        Ok(user)
    }

    /// All users, ordered by username.
    pub async fn find_all(conn: &impl GenericClient) -> JoblyResult<Vec<User>> {
        query(format!("SELECT {COLUMNS} FROM users ORDER BY username"))
            .tag("users.find_all")
            .fetch_all_as(conn)
            .await
    }

    /// One user with the job ids they applied to (ordered by id).
    pub async fn get(conn: &impl GenericClient, username: &str) -> JoblyResult<UserDetail> {
        let user = Self::find(conn, username).await?;
        let jobs = query("SELECT job_id FROM applications WHERE username = $1 ORDER BY job_id")
            .tag("users.get.jobs")
            .bind(username.to_string())
            .fetch_all(conn)
            .await?
            .iter()
            .map(|row| row.try_get_column("job_id"))
            .collect::<JoblyResult<Vec<i32>>>()?;

        Ok(UserDetail { user, jobs })
    }

    async fn find(conn: &impl GenericClient, username: &str) -> JoblyResult<User> {
        query(format!("SELECT {COLUMNS} FROM users WHERE username = $1"))
            .tag("users.get")
            .bind(username.to_string())
            .fetch_opt_as(conn)
            .await?
            .ok_or_else(|| JoblyError::not_found(format!("No user: {username}")))
    }

    /// Partial update; only the fields present in `fields` change.
    pub async fn update(
        conn: &impl GenericClient,
        username: &str,
        fields: UpdateFields,
    ) -> JoblyResult<User> {
        check_updatable("user", &fields, USER_UPDATABLE)?;
        let set = build_update(fields, &USER_ALIASES)?;

        let user = query(format!(
            "UPDATE users SET {} WHERE username = ${} RETURNING {COLUMNS}",
            set.join(", "),
            set.next_placeholder()
        ))
        .tag("users.update")
        .bind_all(set.into_values())
        .bind(username.to_string())
        .fetch_opt_as::<User>(conn)
        .await
        .map_err(invalid_on_check)?
        .ok_or_else(|| JoblyError::not_found(format!("No user: {username}")))?;

        tracing::info!(target: "jobly.repo", username, "user updated");
        Ok(user)
    }

    /// Delete a user; their applications go with them.
    pub async fn remove(conn: &impl GenericClient, username: &str) -> JoblyResult<()> {
        let deleted = query("DELETE FROM users WHERE username = $1")
            .tag("users.remove")
            .bind(username.to_string())
            .execute(conn)
            .await?;
        if deleted == 0 {
            return Err(JoblyError::not_found(format!("No user: {username}")));
        }

        tracing::info!(target: "jobly.repo", username, "user removed");
        Ok(())
    }

    /// Apply to a job. `state` defaults to `applied`; applying again updates
    /// the state of the existing application.
    pub async fn apply(
        conn: &impl GenericClient,
        username: &str,
        job_id: i32,
        state: Option<&str>,
    ) -> JoblyResult<ApplicationState> {
        let state = set_application_status(conn, username, job_id, state)
            .await
            .map_err(|e| missing_reference(e, username, job_id))?;

        tracing::info!(target: "jobly.repo", username, job_id, %state, "application recorded");
        Ok(state)
    }

    /// Change the state of an application. Same upsert as [`User::apply`].
    pub async fn update_status(
        conn: &impl GenericClient,
        username: &str,
        job_id: i32,
        state: Option<&str>,
    ) -> JoblyResult<ApplicationState> {
        Self::apply(conn, username, job_id, state).await
    }

    /// A user's applications, ordered by job id.
    pub async fn applications(
        conn: &impl GenericClient,
        username: &str,
    ) -> JoblyResult<Vec<Application>> {
        Self::find(conn, username).await?;
        query("SELECT job_id, state FROM applications WHERE username = $1 ORDER BY job_id")
            .tag("users.applications")
            .bind(username.to_string())
            .fetch_all_as(conn)
            .await
    }
}

/// Map the applications foreign keys onto the entity that is missing.
fn missing_reference(err: JoblyError, username: &str, job_id: i32) -> JoblyError {
    if let JoblyError::ForeignKeyViolation(detail) = &err {
        if detail.starts_with("applications_username_fkey") {
            return JoblyError::not_found(format!("No user: {username}"));
        }
        if detail.starts_with("applications_job_id_fkey") {
            return JoblyError::not_found(format!("No job with id of: {job_id}"));
        }
    }
    err
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn foreign_keys_become_not_found() {
        let err = missing_reference(
            JoblyError::ForeignKeyViolation("applications_username_fkey: violates".into()),
            "nope",
            1,
        );
        assert_eq!(err.to_string(), "Not found: No user: nope");

        let err = missing_reference(
            JoblyError::ForeignKeyViolation("applications_job_id_fkey: violates".into()),
            "u1",
            -1,
        );
        assert_eq!(err.to_string(), "Not found: No job with id of: -1");
    }

    #[test]
    fn other_errors_pass_through() {
        let err = missing_reference(JoblyError::validation("bad state"), "u1", 1);
        assert!(err.is_validation());
    }
}
