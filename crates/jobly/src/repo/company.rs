//! Companies, keyed by `handle` and listed by `name`.

use super::{check_updatable, conflict_on_unique, invalid_on_check};
use crate::client::GenericClient;
use crate::column::ColumnAliases;
use crate::error::{JoblyError, JoblyResult};
use crate::filter::{CompanyFilter, build_filters};
use crate::query::query;
use crate::row::{FromRow, RowExt};
use crate::update::{UpdateFields, build_update};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;

/// External field names that differ from their column.
pub const COMPANY_ALIASES: ColumnAliases =
    ColumnAliases::new(&[("numEmployees", "num_employees"), ("logoUrl", "logo_url")]);

/// Fields a partial update may touch. `handle` is immutable.
pub const COMPANY_UPDATABLE: &[&str] = &["name", "description", "numEmployees", "logoUrl"];

const COLUMNS: &str = "handle, name, description, num_employees, logo_url";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub handle: String,
    pub name: String,
    pub description: String,
    pub num_employees: Option<i32>,
    pub logo_url: Option<String>,
}

impl FromRow for Company {
    fn from_row(row: &Row) -> JoblyResult<Self> {
        Ok(Self {
            handle: row.try_get_column("handle")?,
            name: row.try_get_column("name")?,
            description: row.try_get_column("description")?,
            num_employees: row.try_get_column("num_employees")?,
            logo_url: row.try_get_column("logo_url")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCompany {
    pub handle: String,
    pub name: String,
    pub description: String,
    pub num_employees: Option<i32>,
    pub logo_url: Option<String>,
}

/// A job as listed under its company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompanyJob {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
}

impl FromRow for CompanyJob {
    fn from_row(row: &Row) -> JoblyResult<Self> {
        Ok(Self {
            id: row.try_get_column("id")?,
            title: row.try_get_column("title")?,
            salary: row.try_get_column("salary")?,
            equity: row.try_get_column("equity")?,
        })
    }
}

/// A company together with its jobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompanyDetail {
    #[serde(flatten)]
    pub company: Company,
    pub jobs: Vec<CompanyJob>,
}

impl Company {
    /// Insert a company. A taken handle is a [`JoblyError::Conflict`].
    pub async fn create(conn: &impl GenericClient, data: NewCompany) -> JoblyResult<Company> {
        let duplicate = query("SELECT handle FROM companies WHERE handle = $1")
            .tag("companies.duplicate_check")
            .bind(data.handle.clone())
            .fetch_opt(conn)
            .await?;
        if duplicate.is_some() {
            return Err(JoblyError::conflict(format!(
                "Duplicate company: {}",
                data.handle
            )));
        }

        let handle = data.handle.clone();
        let company: Company = query(format!(
            "INSERT INTO companies (handle, name, description, num_employees, logo_url) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {COLUMNS}"
        ))
        .tag("companies.create")
        .bind(data.handle)
        .bind(data.name)
        .bind(data.description)
        .bind(data.num_employees)
        .bind(data.logo_url)
        .fetch_one_as(conn)
        .await
        .map_err(|e| {
            invalid_on_check(conflict_on_unique(e, || format!("Duplicate company: {handle}")))
        })?;

        tracing::info!(target: "jobly.repo", handle = %company.handle, "company created");
        Ok(company)
    }

    /// Companies matching `filter`, ordered by name.
    pub async fn find_all(
        conn: &impl GenericClient,
        filter: &CompanyFilter,
    ) -> JoblyResult<Vec<Company>> {
        let filters = build_filters(filter)?;
        query(format!(
            "SELECT {COLUMNS} FROM companies{} ORDER BY name",
            filters.where_sql()
        ))
        .tag("companies.find_all")
        .bind_all(filters.into_values())
        .fetch_all_as(conn)
        .await
    }

    /// One company with its jobs (ordered by id).
    pub async fn get(conn: &impl GenericClient, handle: &str) -> JoblyResult<CompanyDetail> {
        let company: Company = query(format!(
            "SELECT {COLUMNS} FROM companies WHERE handle = $1"
        ))
        .tag("companies.get")
        .bind(handle.to_string())
        .fetch_opt_as(conn)
        .await?
        .ok_or_else(|| JoblyError::not_found(format!("No company: {handle}")))?;

        let jobs = query(
            "SELECT id, title, salary, equity FROM jobs WHERE company_handle = $1 ORDER BY id",
        )
        .tag("companies.get.jobs")
        .bind(handle.to_string())
        .fetch_all_as(conn)
        .await?;

        Ok(CompanyDetail { company, jobs })
    }

    /// Partial update; only the fields present in `fields` change.
    pub async fn update(
        conn: &impl GenericClient,
        handle: &str,
        fields: UpdateFields,
    ) -> JoblyResult<Company> {
        check_updatable("company", &fields, COMPANY_UPDATABLE)?;
        let set = build_update(fields, &COMPANY_ALIASES)?;

        let company = query(format!(
            "UPDATE companies SET {} WHERE handle = ${} RETURNING {COLUMNS}",
            set.join(", "),
            set.next_placeholder()
        ))
        .tag("companies.update")
        .bind_all(set.into_values())
        .bind(handle.to_string())
        .fetch_opt_as::<Company>(conn)
        .await
        .map_err(|e| {
            invalid_on_check(conflict_on_unique(e, || "Duplicate company name".to_string()))
        })?
        .ok_or_else(|| JoblyError::not_found(format!("No company: {handle}")))?;

        tracing::info!(target: "jobly.repo", handle, "company updated");
        Ok(company)
    }

    /// Delete a company; its jobs go with it.
    pub async fn remove(conn: &impl GenericClient, handle: &str) -> JoblyResult<()> {
        let deleted = query("DELETE FROM companies WHERE handle = $1")
            .tag("companies.remove")
            .bind(handle.to_string())
            .execute(conn)
            .await?;
        if deleted == 0 {
            return Err(JoblyError::not_found(format!("No company: {handle}")));
        }

        tracing::info!(target: "jobly.repo", handle, "company removed");
        Ok(())
    }
}
