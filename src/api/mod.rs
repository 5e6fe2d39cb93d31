//! HTTP API for the content conveyor.

mod auth;
mod envelope;
mod extract;
mod handlers;
pub mod routes;
mod state;
mod v1;


use std::env;
use std::net::IpAddr;
use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::db::Database;
use crate::paths::get_db_path;

pub use auth::{CurrentUser, USER_ID_HEADER};
pub use extract::{ApiJson, ApiQuery};
pub use envelope::{
    ApiFailure, ApiResponse, ApiResult, ErrorResponse, PageParams, PaginatedResponse, Pagination,
};
pub use state::AppState;

const DEFAULT_HOST: [u8; 4] = [0, 0, 0, 0];
const DEFAULT_PORT: u16 = 3000;

/// Errors raised while starting or running the server.
#[derive(Error, Diagnostic, Debug)]
pub enum ApiError {
    #[error("Failed to bind {addr}: {source}")]
    #[diagnostic(
        code(conveyor::api::bind),
        help("Is another process already listening on this port? Set CONVEYOR_PORT to pick another one.")
    )]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    #[diagnostic(code(conveyor::api::serve))]
    Serve(#[source] std::io::Error),
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Host address to bind to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// SQLite database file
    pub db_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: IpAddr::from(DEFAULT_HOST),
            port: DEFAULT_PORT,
            db_path: get_db_path(),
        }
    }
}

impl Config {
    /// Defaults overlaid with `CONVEYOR_HOST`, `CONVEYOR_PORT` and `CONVEYOR_DB`.
    ///
    /// Unparseable values are ignored and the default is kept.
    pub fn new() -> Self {
        let mut config = Self::default();

        if let Ok(host) = env::var("CONVEYOR_HOST")
            && let Ok(host) = host.parse()
        {
            config.host = host;
        }
        if let Ok(port) = env::var("CONVEYOR_PORT")
            && let Ok(port) = port.parse()
        {
            config.port = port;
        }
        if let Ok(db) = env::var("CONVEYOR_DB")
            && !db.is_empty()
        {
            config.db_path = PathBuf::from(db);
        }

        config
    }

    pub fn with_host(mut self, host: IpAddr) -> Self {
        self.host = host;
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_db_path(mut self, db_path: PathBuf) -> Self {
        self.db_path = db_path;
        self
    }
}

/// Initialize tracing subscriber with env filter
pub fn init_tracing() {
    // try_init so a second call (tests, embedding) does not panic
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "conveyor=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

/// Run the API server on an already migrated database.
pub async fn run<D: Database + 'static>(config: Config, db: D) -> Result<(), ApiError> {
    let state = AppState::new(db);
    let app = routes::create_router(state).layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|source| ApiError::Bind {
            addr: addr.clone(),
            source,
        })?;
    info!("API server listening on http://{}", addr);

    axum::serve(listener, app).await.map_err(ApiError::Serve)?;
    Ok(())
}
