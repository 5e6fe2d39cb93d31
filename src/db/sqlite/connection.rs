//! SQLite database connection and migration management.

use std::path::Path;
use std::str::FromStr;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use tracing::{debug, instrument};

use super::{
    SqliteProjectRepository, SqliteProjectStepRepository, SqliteScriptRepository,
    SqliteUserRepository,
};
use crate::db::{Database, DbError, DbResult};

/// SQLite database implementation.
///
/// Owns the connection pool. Repositories borrow it, so one `SqliteDatabase`
/// is the single store handle for the process.
pub struct SqliteDatabase {
    pool: SqlitePool,
}

impl SqliteDatabase {
    /// Open (or create) a database file at the given path.
    pub async fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let url = format!("sqlite://{}", path.as_ref().display());
        let options = SqliteConnectOptions::from_str(&url)
            .map_err(|e| DbError::Connection {
                message: e.to_string(),
            })?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| DbError::Connection {
                message: e.to_string(),
            })?;

        debug!(path = %path.as_ref().display(), "Opened SQLite database");
        Ok(Self { pool })
    }

    /// Create an in-memory database (useful for testing).
    ///
    /// Limited to one connection: every new in-memory connection would see
    /// an empty database.
    pub async fn in_memory() -> DbResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| DbError::Connection {
                message: e.to_string(),
            })?
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| DbError::Connection {
                message: e.to_string(),
            })?;

        Ok(Self { pool })
    }

    /// Access the underlying pool for raw queries (diagnostics, tests).
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close all pooled connections.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

impl Database for SqliteDatabase {
    type Users<'a> = SqliteUserRepository<'a>;
    type Projects<'a> = SqliteProjectRepository<'a>;
    type ProjectSteps<'a> = SqliteProjectStepRepository<'a>;
    type Scripts<'a> = SqliteScriptRepository<'a>;

    #[instrument(skip(self))]
    async fn migrate(&self) -> DbResult<()> {
        sqlx::migrate!("data/sql/sqlite")
            .run(&self.pool)
            .await
            .map_err(|e| DbError::Migration {
                message: e.to_string(),
            })?;
        debug!("Migrations applied");
        Ok(())
    }

    fn users(&self) -> Self::Users<'_> {
        SqliteUserRepository { pool: &self.pool }
    }

    fn projects(&self) -> Self::Projects<'_> {
        SqliteProjectRepository { pool: &self.pool }
    }

    fn project_steps(&self) -> Self::ProjectSteps<'_> {
        SqliteProjectStepRepository { pool: &self.pool }
    }

    fn scripts(&self) -> Self::Scripts<'_> {
        SqliteScriptRepository { pool: &self.pool }
    }
}
