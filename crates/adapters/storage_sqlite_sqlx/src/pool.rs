//! `SQLite` connection pool setup and migration runner.

use std::str::FromStr;
use std::sync::Arc;

use sqlx::SqlitePool;
use sqlx::sqlite::SqliteConnectOptions;

use livefeed_app::arrival_hub::ArrivalHub;

use crate::document_store::DocumentLogStore;
use crate::error::StorageError;

/// Configuration for the `SQLite` storage adapter.
pub struct Config {
    /// `SQLite` connection URL (e.g. `sqlite:livefeed.db` or `sqlite::memory:`).
    pub database_url: String,
}

impl Config {
    /// Build a [`Database`] from this configuration.
    ///
    /// Creates the connection pool, creates the database file if missing,
    /// and runs all pending migrations.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the connection or migrations fail.
    pub async fn build(self) -> Result<Database, StorageError> {
        Database::initialize(&self.database_url).await
    }
}

/// Holds the `SQLite` connection pool and provides access to it.
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    async fn initialize(database_url: &str) -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        let pool = SqlitePool::connect_with(options).await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        let feeds: i64 = sqlx::query_scalar("SELECT COUNT(DISTINCT path) FROM feed_records")
            .fetch_one(&pool)
            .await?;
        tracing::info!(url = database_url, feeds, "feed record store ready");

        Ok(Self { pool })
    }

    /// Document log store over this database, notifying through `hub`.
    #[must_use]
    pub fn log_store(&self, hub: Arc<ArrivalHub>) -> DocumentLogStore {
        DocumentLogStore::new(self.pool.clone(), hub)
    }

    /// Borrow the underlying connection pool.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use livefeed_app::ports::LogStore;
    use livefeed_domain::author::AuthorId;
    use livefeed_domain::path::FeedPath;
    use livefeed_domain::payload::Payload;
    use livefeed_domain::record::NewRecord;

    #[tokio::test]
    async fn should_create_pool_and_run_migrations_when_using_memory_db() {
        let config = Config {
            database_url: "sqlite::memory:".to_string(),
        };
        let db = config.build().await.unwrap();

        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' AND name != '_sqlx_migrations' ORDER BY name",
        )
        .fetch_all(db.pool())
        .await
        .unwrap();

        let names: Vec<&str> = tables.iter().map(|row| row.0.as_str()).collect();
        assert_eq!(names, vec!["feed_records"]);
    }

    #[tokio::test]
    async fn should_share_pool_with_log_store() {
        let db = Config {
            database_url: "sqlite::memory:".to_string(),
        }
        .build()
        .await
        .unwrap();
        let store = db.log_store(Arc::new(ArrivalHub::default()));
        let chat = FeedPath::new("chat").unwrap();
        store
            .append(
                &chat,
                NewRecord::new(Payload::text("gm"), AuthorId::new("u1").unwrap()),
            )
            .await
            .unwrap();

        let stored: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM feed_records WHERE path = 'chat'")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(stored, 1);
    }
}
