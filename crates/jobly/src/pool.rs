//! Connection pool helpers

use crate::error::{JoblyError, JoblyResult};
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use tokio_postgres::NoTls;

/// Pool size used by [`create_pool`].
pub const DEFAULT_POOL_SIZE: usize = 16;

/// Create a connection pool from a database URL.
///
/// Uses `NoTls`; connections are checked lazily, so an unreachable database
/// is only reported by the first `pool.get()`.
///
/// # Example
///
/// ```ignore
/// let pool = jobly::create_pool("postgres://localhost/jobly")?;
/// let client = pool.get().await?;
/// let companies = Company::find_all(&client, &CompanyFilter::default()).await?;
/// ```
pub fn create_pool(database_url: &str) -> JoblyResult<Pool> {
    create_pool_with_config(database_url, DEFAULT_POOL_SIZE)
}

/// Create a connection pool holding at most `max_size` connections.
pub fn create_pool_with_config(database_url: &str, max_size: usize) -> JoblyResult<Pool> {
    if max_size == 0 {
        return Err(JoblyError::Connection("pool size must be at least 1".into()));
    }

    let pg_config: tokio_postgres::Config = database_url
        .parse()
        .map_err(|e: tokio_postgres::Error| JoblyError::Connection(e.to_string()))?;

    let mgr = Manager::from_config(
        pg_config,
        NoTls,
        ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        },
    );
    Pool::builder(mgr)
        .max_size(max_size)
        .build()
        .map_err(|e| JoblyError::Pool(e.to_string()))
}
