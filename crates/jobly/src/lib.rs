//! # jobly
//!
//! Data layer for the Jobly job board, over PostgreSQL.
//!
//! ## Features
//!
//! - **Partial updates**: a sparse field set becomes a `"col"=$1, "col2"=$2`
//!   SET list plus its ordered values ([`build_update`])
//! - **Search filters**: optional, independent criteria become a `WHERE`
//!   clause plus values ([`build_filters`]); inconsistent bounds are rejected
//!   before any SQL is produced
//! - **Application status**: `applied`, `interested`, `accepted`, `rejected`,
//!   recorded with a single upsert ([`set_application_status`])
//! - **Repositories**: [`Company`], [`Job`] and [`User`] operations that run on
//!   anything implementing [`GenericClient`], including transactions
//!
//! ```ignore
//! use jobly::{Company, CompanyFilter, UpdateFields};
//!
//! let client = pool.get().await?;
//! let companies = Company::find_all(&client, &CompanyFilter::new().min_employees(10)).await?;
//!
//! let fields = UpdateFields::new().set("numEmployees", 12);
//! let updated = Company::update(&client, "c1", fields).await?;
//! ```

pub mod application;
pub mod clause;
pub mod client;
pub mod column;
pub mod error;
pub mod filter;
pub mod query;
pub mod repo;
pub mod row;
pub mod update;
pub mod value;

#[cfg(feature = "migrate")]
pub mod migrate;
#[cfg(feature = "pool")]
pub mod pool;

pub use application::{ApplicationState, set_application_status};
pub use clause::Clause;
pub use client::GenericClient;
pub use column::{ColumnAliases, resolve_column};
pub use error::{JoblyError, JoblyResult};
pub use filter::{CompanyFilter, FilterBuilder, FilterSpec, JobFilter, build_filters};
pub use query::{Query, query};
pub use repo::{
    Application, Company, CompanyDetail, CompanyJob, Job, NewCompany, NewJob, NewUser, User,
    UserDetail,
};
pub use row::{FromRow, RowExt};
pub use update::{UpdateFields, build_update};
pub use value::Value;

#[cfg(feature = "pool")]
pub use pool::{create_pool, create_pool_with_config};
