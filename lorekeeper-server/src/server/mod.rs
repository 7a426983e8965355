pub mod app;
pub mod handlers;
pub mod websocket;

use std::path::Path;

use anyhow::Result;
use clap::Subcommand;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::{info, warn};

use lorekeeper::database::{connection::*, migrations::Migrator};
use lorekeeper::transfer::{ProgressReporter, TransferOperation, TransferService, TransferSummary};
use lorekeeper::LorekeeperConfig;

#[derive(Subcommand, Debug)]
pub enum MigrateDirection {
    Up,
    Down,
    Fresh,
}

async fn open_database(database_path: &str) -> Result<DatabaseConnection> {
    let database_url = get_database_url(Some(database_path));
    let db = establish_connection(&database_url).await?;
    Migrator::up(&db, None).await?;
    info!("Database migrations completed");
    Ok(db)
}

pub async fn start_server(
    port: u16,
    database_path: &str,
    cors_origin: Option<&str>,
    config: &LorekeeperConfig,
) -> Result<()> {
    let db = open_database(database_path).await?;
    config.storage_layout().ensure_dirs()?;

    let app = app::create_app(db, config, cors_origin).await?;

    log_routes();

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    info!("Server running on http://0.0.0.0:{}", port);

    axum::serve(listener, app).await?;

    Ok(())
}

fn log_routes() {
    info!("API Endpoints:");
    info!("  /health                     - Health check");
    info!("  /ws/transfer                - Export/import progress channel");
    info!("  /static/*                   - Stored avatars and asset payloads");
}

/// Run one export or import without the server, reporting through the log.
pub async fn run_transfer(
    operation: TransferOperation,
    database_path: &str,
    dir: &Path,
    config: &LorekeeperConfig,
) -> Result<TransferSummary> {
    let db = open_database(database_path).await?;
    let service = TransferService::new(db, config.transfer_settings());
    let reporter = ProgressReporter::silent(operation);

    let summary = match operation {
        TransferOperation::Export => service.export(dir, reporter).await?,
        TransferOperation::Import => service.import(dir, reporter).await?,
    };

    if summary.failed() > 0 {
        warn!(
            "{} finished with {} failed record(s)",
            operation,
            summary.failed()
        );
    }
    Ok(summary)
}

pub async fn migrate_database(database_path: &str, direction: MigrateDirection) -> Result<()> {
    let database_url = get_database_url(Some(database_path));
    let db = establish_connection(&database_url).await?;

    match direction {
        MigrateDirection::Up => {
            info!("Running migrations up");
            Migrator::up(&db, None).await?;
        }
        MigrateDirection::Down => {
            info!("Running migrations down");
            Migrator::down(&db, None).await?;
        }
        MigrateDirection::Fresh => {
            info!("Running fresh migrations (down then up)");
            Migrator::down(&db, None).await?;
            Migrator::up(&db, None).await?;
        }
    }

    info!("Database migration completed");
    Ok(())
}
