use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use notewatch_core::AppConfig;
use notewatch_storage::Storage;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "notewatch")]
#[command(about = "Watches accounts for new posts, reacts to them and reports to a webhook", long_about = None)]
struct Cli {
    /// JSON configuration file; NOTEWATCH_* environment variables override it
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Monitor every configured subject until Ctrl-C or all subjects stop
    Run,
    /// Seen-item counts per subject
    Status,
    /// Most recently seen items of one subject
    Recent {
        subject: String,
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },
    /// Load and validate the configuration, then print a redacted summary
    CheckConfig,
}

pub(crate) fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    Ok(AppConfig::load(path)?)
}

pub(crate) fn open_storage(config: &AppConfig) -> Result<Storage> {
    let db_path = config.database_path();
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(Storage::new(&db_path, config.db_pool_size())?)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Run => commands::run::run(config).await?,
        Commands::Status => commands::query::run_status(&config)?,
        Commands::Recent { subject, limit } => {
            commands::query::run_recent(&config, &subject, limit)?;
        },
        Commands::CheckConfig => commands::check::run_check_config(&config)?,
    }

    Ok(())
}
