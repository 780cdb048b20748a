mod cli;
mod commands;
mod config;

use config::{ProjectConfig, Settings};
use tracing_subscriber::EnvFilter;

pub async fn run(args: Vec<String>) -> anyhow::Result<()> {
    let cmd = cli::parse_args(&args)?;
    let global = match &cmd {
        cli::Command::Help(topic) => {
            cli::print_help(*topic);
            return Ok(());
        }
        cli::Command::Migrate(global) => global,
        cli::Command::Companies(args) => &args.global,
        cli::Command::Jobs(args) => &args.global,
    };

    dotenvy::dotenv().ok();
    let config = ProjectConfig::load_optional(&global.config)?;
    let settings = Settings::resolve(
        &global.config,
        config.as_ref(),
        global.database.clone(),
        std::env::var("DATABASE_URL").ok(),
    )?;
    init_logging(settings.log_filter.as_deref())?;
    if let Some(cfg) = &config {
        tracing::debug!(path = %cfg.config_path.display(), "config loaded");
    }

    match cmd {
        cli::Command::Help(_) => Ok(()),
        cli::Command::Migrate(_) => commands::migrate(&settings).await,
        cli::Command::Companies(args) => commands::companies(&settings, args).await,
        cli::Command::Jobs(args) => commands::jobs(&settings, args).await,
    }
}

/// `RUST_LOG` wins over the config file's `log.filter`; the default is `info`.
/// Logs go to stderr so command output stays machine-readable.
fn init_logging(config_filter: Option<&str>) -> anyhow::Result<()> {
    let filter = match std::env::var("RUST_LOG") {
        Ok(var) if !var.trim().is_empty() => EnvFilter::try_new(var)?,
        _ => EnvFilter::try_new(config_filter.unwrap_or("info"))?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install log subscriber: {e}"))
}
