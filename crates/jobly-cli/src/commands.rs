use crate::cli::{CompaniesArgs, JobsArgs};
use crate::config::Settings;
use anyhow::Context;
use jobly::{Company, CompanyFilter, Job, JobFilter};
use serde::Serialize;

pub async fn migrate(settings: &Settings) -> anyhow::Result<()> {
    let mut client = connect(&settings.database_url).await?;
    let report = jobly::migrate::run(&mut client)
        .await
        .context("failed to apply migrations")?;

    let applied = report.applied_migrations();
    println!("applied {} migration(s)", applied.len());
    for m in applied {
        println!("  {m}");
    }
    Ok(())
}

pub async fn companies(settings: &Settings, args: CompaniesArgs) -> anyhow::Result<()> {
    let filter = CompanyFilter {
        min_employees: args.min_employees,
        max_employees: args.max_employees,
        name: args.name,
    };

    let pool = jobly::create_pool_with_config(&settings.database_url, settings.max_pool_size)?;
    let client = pool.get().await.context("failed to acquire a connection")?;
    let companies = Company::find_all(&client, &filter).await?;
    print_json(&companies)
}

pub async fn jobs(settings: &Settings, args: JobsArgs) -> anyhow::Result<()> {
    let filter = JobFilter {
        min_salary: args.min_salary,
        has_equity: args.has_equity.then_some(true),
        title: args.title,
    };

    let pool = jobly::create_pool_with_config(&settings.database_url, settings.max_pool_size)?;
    let client = pool.get().await.context("failed to acquire a connection")?;
    let jobs = Job::find_all(&client, &filter).await?;
    print_json(&jobs)
}

async fn connect(database_url: &str) -> anyhow::Result<tokio_postgres::Client> {
    let (client, connection) = tokio_postgres::connect(database_url, tokio_postgres::NoTls)
        .await
        .context("failed to connect to database")?;

    tokio::spawn(async move {
        if let Err(err) = connection.await {
            tracing::error!(error = %err, "connection error");
        }
    });

    Ok(client)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
