pub mod operations;
pub mod schema;

mod store;

pub use store::VocabularyStore;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use thiserror::Error;

use crate::config::DatabaseConfig;

/// Open (creating if needed) the SQLite database and bring its schema up to date.
pub async fn connect(config: &DatabaseConfig) -> Result<SqlitePool, DbInitError> {
    if let Some(parent) = config.path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let options = SqliteConnectOptions::new()
        .filename(&config.path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(config.busy_timeout);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await?;

    schema::run_migrations(&pool).await?;

    tracing::info!(path = %config.path.display(), "sqlite database ready");
    Ok(pool)
}

#[derive(Debug, Error)]
pub enum DbInitError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}
