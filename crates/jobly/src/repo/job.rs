//! Jobs, keyed by a serial `id` and listed by `title`.

use super::{check_updatable, conflict_on_unique, invalid_on_check};
use crate::client::GenericClient;
use crate::column::ColumnAliases;
use crate::error::{JoblyError, JoblyResult};
use crate::filter::{JobFilter, build_filters};
use crate::query::query;
use crate::row::{FromRow, RowExt};
use crate::update::{UpdateFields, build_update};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;

pub const JOB_ALIASES: ColumnAliases = ColumnAliases::new(&[("companyHandle", "company_handle")]);

/// A job never moves to another company, and its id is fixed.
pub const JOB_UPDATABLE: &[&str] = &["title", "salary", "equity"];

const COLUMNS: &str = "id, title, salary, equity, company_handle";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

impl FromRow for Job {
    fn from_row(row: &Row) -> JoblyResult<Self> {
        Ok(Self {
            id: row.try_get_column("id")?,
            title: row.try_get_column("title")?,
            salary: row.try_get_column("salary")?,
            equity: row.try_get_column("equity")?,
            company_handle: row.try_get_column("company_handle")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewJob {
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

impl Job {
    /// Insert a job. A taken title is a [`JoblyError::Conflict`]; an unknown
    /// company is [`JoblyError::NotFound`].
    pub async fn create(conn: &impl GenericClient, data: NewJob) -> JoblyResult<Job> {
        let duplicate = query("SELECT title FROM jobs WHERE title = $1")
            .tag("jobs.duplicate_check")
            .bind(data.title.clone())
            .fetch_opt(conn)
            .await?;
        if duplicate.is_some() {
            return Err(JoblyError::conflict(format!("Duplicate job: {}", data.title)));
        }

        let title = data.title.clone();
        let company_handle = data.company_handle.clone();
        let job: Job = query(format!(
            "INSERT INTO jobs (title, salary, equity, company_handle) \
             VALUES ($1, $2, $3, $4) RETURNING {COLUMNS}"
        ))
        .tag("jobs.create")
        .bind(data.title)
        .bind(data.salary)
        .bind(data.equity)
        .bind(data.company_handle)
        .fetch_one_as(conn)
        .await
        .map_err(|e| match e {
            JoblyError::ForeignKeyViolation(_) => {
                JoblyError::not_found(format!("No company: {company_handle}"))
            }
            e => invalid_on_check(conflict_on_unique(e, || format!("Duplicate job: {title}"))),
        })?;

        tracing::info!(target: "jobly.repo", id = job.id, title = %job.title, "job created");
        Ok(job)
    }

    /// Jobs matching `filter`, ordered by title.
    pub async fn find_all(conn: &impl GenericClient, filter: &JobFilter) -> JoblyResult<Vec<Job>> {
        let filters = build_filters(filter)?;
        query(format!(
            "SELECT {COLUMNS} FROM jobs{} ORDER BY title",
            filters.where_sql()
        ))
        .tag("jobs.find_all")
        .bind_all(filters.into_values())
        .fetch_all_as(conn)
        .await
    }

    pub async fn get(conn: &impl GenericClient, id: i32) -> JoblyResult<Job> {
        query(format!("SELECT {COLUMNS} FROM jobs WHERE id = $1"))
            .tag("jobs.get")
            .bind(id)
            .fetch_opt_as(conn)
            .await?
            .ok_or_else(|| JoblyError::not_found(format!("No job with id of: {id}")))
    }

    /// Partial update; only the fields present in `fields` change.
    pub async fn update(
        conn: &impl GenericClient,
        id: i32,
        fields: UpdateFields,
    ) -> JoblyResult<Job> {
        check_updatable("job", &fields, JOB_UPDATABLE)?;
        let set = build_update(fields, &JOB_ALIASES)?;

        let job = query(format!(
            "UPDATE jobs SET {} WHERE id = ${} RETURNING {COLUMNS}",
            set.join(", "),
            set.next_placeholder()
        ))
        .tag("jobs.update")
        .bind_all(set.into_values())
        .bind(id)
        .fetch_opt_as::<Job>(conn)
        .await
        .map_err(invalid_on_check)?
        .ok_or_else(|| JoblyError::not_found(format!("No job with id of: {id}")))?;

        tracing::info!(target: "jobly.repo", id, "job updated");
        Ok(job)
    }

    pub async fn remove(conn: &impl GenericClient, id: i32) -> JoblyResult<()> {
        let deleted = query("DELETE FROM jobs WHERE id = $1")
            .tag("jobs.remove")
            .bind(id)
            .execute(conn)
            .await?;
        if deleted == 0 {
            return Err(JoblyError::not_found(format!("No job with id of: {id}")));
        }

        tracing::info!(target: "jobly.repo", id, "job removed");
        Ok(())
    }
}
