//! Embedded schema migrations via [`refinery`].
//!
//! The SQL files under `migrations/` are compiled into the crate, so a
//! binary can bring an empty database up to date without shipping them.

use crate::error::JoblyResult;

pub use refinery::Report;

mod embedded {
    refinery::embed_migrations!("./migrations");
}

/// Apply every pending migration on a single connection.
pub async fn run(client: &mut tokio_postgres::Client) -> JoblyResult<Report> {
    let report = embedded::migrations::runner().run_async(client).await?;
    for migration in report.applied_migrations() {
        tracing::info!(
            target: "jobly.migrate",
            version = migration.version(),
            name = migration.name(),
            "migration applied"
        );
    }
    Ok(report)
}

/// Acquire a connection from `pool` and run [`run`] on it.
#[cfg(feature = "pool")]
pub async fn run_pool(pool: &deadpool_postgres::Pool) -> JoblyResult<Report> {
    let mut client = pool.get().await?;
    run(&mut client).await
}
