//! Storage-specific error type wrapping sqlx errors.

use livefeed_domain::error::LiveFeedError;

/// Errors originating from the `SQLite` storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A query or connection failed.
    #[error("database error")]
    Database(#[from] sqlx::Error),

    /// Failed to serialize or deserialize a stored payload.
    #[error("JSON payload error")]
    Json(#[from] serde_json::Error),

    /// Failed to run migrations.
    #[error("migration error")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A sequence does not fit the column type.
    #[error("sequence {0} out of range")]
    SequenceOutOfRange(i64),
}

impl StorageError {
    /// Report as a failed write.
    pub fn into_write_failed(self) -> LiveFeedError {
        LiveFeedError::write_failed(self)
    }

    /// Report as a failed listener.
    pub fn into_subscription(self) -> LiveFeedError {
        LiveFeedError::subscription(self)
    }
}
