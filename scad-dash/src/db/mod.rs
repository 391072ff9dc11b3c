//! Data store accessor
//!
//! All connections are read-only. Each query opens its own connection and
//! closes it once the query finishes, whether or not it succeeded. No pool
//! is held between queries.

use scad_common::catalog::TITLES_TABLE;
use scad_common::{Error, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqliteRow};
use sqlx::{ConnectOptions, Connection, FromRow, QueryBuilder, Sqlite};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Read-only handle on the catalog database file
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
    options: SqliteConnectOptions,
}

impl Store {
    /// Open the catalog in read-only mode
    ///
    /// Fails when the file is missing, cannot be opened, or has no `titles`
    /// table. Callers treat this as fatal at startup.
    pub async fn open(db_path: &Path) -> Result<Self> {
        if !db_path.exists() {
            return Err(Error::NotFound(format!(
                "Database not found: {}",
                db_path.display()
            )));
        }

        // immutable: SQLite won't write even for internal bookkeeping
        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .read_only(true)
            .immutable(true);

        let store = Self {
            path: db_path.to_path_buf(),
            options,
        };

        let mut conn = store.acquire().await?;
        let table_count: std::result::Result<i64, sqlx::Error> = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?",
        )
        .bind(TITLES_TABLE)
        .fetch_one(&mut conn)
        .await;
        release(conn).await;

        if table_count? == 0 {
            return Err(Error::NotFound(format!(
                "Table '{}' not found in {}",
                TITLES_TABLE,
                db_path.display()
            )));
        }

        Ok(store)
    }

    /// Path of the underlying database file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run a built query and collect every row
    pub async fn fetch_all<T>(&self, mut builder: QueryBuilder<'_, Sqlite>) -> Result<Vec<T>>
    where
        T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        let mut conn = self.acquire().await?;
        let rows = builder.build_query_as::<T>().fetch_all(&mut conn).await;
        release(conn).await;
        Ok(rows?)
    }

    /// Run a built query expected to produce at most one row
    pub async fn fetch_optional<T>(
        &self,
        mut builder: QueryBuilder<'_, Sqlite>,
    ) -> Result<Option<T>>
    where
        T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        let mut conn = self.acquire().await?;
        let row = builder.build_query_as::<T>().fetch_optional(&mut conn).await;
        release(conn).await;
        Ok(row?)
    }

    async fn acquire(&self) -> Result<SqliteConnection> {
        Ok(self.options.connect().await?)
    }
}

/// Close a per-query connection; a failed close is only worth a debug line
async fn release(conn: SqliteConnection) {
    if let Err(e) = conn.close().await {
        debug!("Error closing read-only connection: {}", e);
    }
}
