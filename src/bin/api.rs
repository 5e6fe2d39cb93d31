//! Conveyor API server binary.
//!
//! This binary creates the concrete database implementation and passes it
//! to the API server. The API layer remains agnostic of the storage backend.

use std::net::IpAddr;
use std::path::PathBuf;

use clap::Parser;
use conveyor::api::{self, ApiError, Config};
use conveyor::db::{Database, DbError, SqliteDatabase};
use miette::Diagnostic;
use thiserror::Error;
use tracing::info;

#[derive(Error, Diagnostic, Debug)]
enum BinaryError {
    #[error("Database error: {0}")]
    #[diagnostic(code(conveyor::binary::database))]
    Database(#[from] DbError),

    #[error("Failed to create data directory: {0}")]
    #[diagnostic(code(conveyor::binary::io))]
    Io(#[from] std::io::Error),

    #[error("API server error: {0}")]
    #[diagnostic(code(conveyor::binary::api))]
    Api(#[from] ApiError),
}

#[derive(Parser)]
#[command(name = "conveyor-api")]
#[command(author, version, about = "Conveyor API server", long_about = None)]
struct Cli {
    /// Host address to bind to
    #[arg(long, env = "CONVEYOR_HOST")]
    host: Option<IpAddr>,

    /// Port to listen on
    #[arg(short, long, env = "CONVEYOR_PORT")]
    port: Option<u16>,

    /// Database file path (defaults to XDG data directory: ~/.local/share/conveyor/conveyor.db)
    #[arg(long, env = "CONVEYOR_DB")]
    db: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    run().await?;
    Ok(())
}

async fn run() -> Result<(), BinaryError> {
    let cli = Cli::parse();
    api::init_tracing();

    // Precedence: CLI flag > env var > default
    let mut config = Config::new();
    if let Some(host) = cli.host {
        config = config.with_host(host);
    }
    if let Some(port) = cli.port {
        config = config.with_port(port);
    }
    if let Some(db) = cli.db {
        config = config.with_db_path(db);
    }

    info!(path = ?config.db_path, "Opening database");

    // Ensure parent directory exists
    if let Some(parent) = config.db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db = SqliteDatabase::open(&config.db_path).await?;

    // Run migrations before starting the server
    db.migrate().await?;
    info!("Database migrations complete");

    api::run(config, db).await?;

    Ok(())
}
