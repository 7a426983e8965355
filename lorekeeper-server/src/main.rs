use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use lorekeeper::transfer::TransferOperation;
use lorekeeper::LorekeeperConfig;
use lorekeeper_server::server;

#[derive(Parser)]
#[clap(author, version, about)]
struct Cli {
    #[clap(short, long, global = true)]
    log_level: Option<String>,
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Serve {
        #[clap(short, long, default_value = "3000")]
        port: u16,
        #[clap(short, long)]
        database: Option<String>,
        #[clap(long)]
        cors_origin: Option<String>,
    },
    /// Export the whole store into a directory
    Export {
        #[clap(long)]
        dir: Option<PathBuf>,
        #[clap(short, long)]
        database: Option<String>,
    },
    /// Import an export directory into the store
    Import {
        #[clap(long)]
        dir: Option<PathBuf>,
        #[clap(short, long)]
        database: Option<String>,
    },
    Db {
        #[clap(subcommand)]
        command: DbCommands,
    },
}

#[derive(Subcommand, Debug)]
enum DbCommands {
    Init {
        #[clap(short, long)]
        database: Option<String>,
    },
    Migrate {
        #[clap(subcommand)]
        direction: server::MigrateDirection,
        #[clap(short, long)]
        database: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    setup_logging(&args.log_level);
    let config = LorekeeperConfig::from_env();

    match args.command {
        Commands::Serve {
            port,
            database,
            cors_origin,
        } => {
            info!("Starting server on port {}", port);
            let database = database.unwrap_or_else(|| config.database.clone());
            server::start_server(port, &database, cors_origin.as_deref(), &config).await?;
        }
        Commands::Export { dir, database } => {
            let dir = dir.unwrap_or_else(|| config.transfer_dir.clone());
            let database = database.unwrap_or_else(|| config.database.clone());
            server::run_transfer(TransferOperation::Export, &database, &dir, &config).await?;
        }
        Commands::Import { dir, database } => {
            let dir = dir.unwrap_or_else(|| config.transfer_dir.clone());
            let database = database.unwrap_or_else(|| config.database.clone());
            server::run_transfer(TransferOperation::Import, &database, &dir, &config).await?;
        }
        Commands::Db { command } => match command {
            DbCommands::Init { database } => {
                let database = database.unwrap_or_else(|| config.database.clone());
                info!("Initializing database: {}", database);
                server::migrate_database(&database, server::MigrateDirection::Up).await?;
            }
            DbCommands::Migrate {
                direction,
                database,
            } => {
                let database = database.unwrap_or_else(|| config.database.clone());
                info!("Running database migration: {:?}", direction);
                server::migrate_database(&database, direction).await?;
            }
        },
    }

    Ok(())
}

fn setup_logging(log_level: &Option<String>) {
    let log_level = match log_level
        .as_ref()
        .unwrap_or(&"info".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(format!("sqlx=warn,{}", log_level)))
        .without_time()
        .init();
}
