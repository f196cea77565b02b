//! `SQLite` implementation of [`LogStore`]: one document row per record.

use std::sync::Arc;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};
use tokio::sync::Mutex;

use livefeed_app::arrival_hub::ArrivalHub;
use livefeed_app::ports::{Listener, LogStore};
use livefeed_domain::author::AuthorId;
use livefeed_domain::error::LiveFeedError;
use livefeed_domain::id::{RecordId, Sequence};
use livefeed_domain::path::FeedPath;
use livefeed_domain::payload::Payload;
use livefeed_domain::record::{FeedRecord, NewRecord};
use livefeed_domain::time::now;

use crate::error::StorageError;

struct Wrapper(FeedRecord);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: uuid::Uuid = row.try_get("id")?;
        let sequence: i64 = row.try_get("sequence")?;
        let author_id: String = row.try_get("author_id")?;
        let payload_json: String = row.try_get("payload")?;
        let timestamp_str: String = row.try_get("timestamp")?;

        let sequence = u64::try_from(sequence)
            .map_err(|_| sqlx::Error::Decode(Box::new(StorageError::SequenceOutOfRange(sequence))))?;
        let author_id =
            AuthorId::new(author_id).map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let payload: Payload = serde_json::from_str(&payload_json)
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let timestamp = chrono::DateTime::parse_from_rfc3339(&timestamp_str)
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?
            .to_utc();

        Ok(Self(FeedRecord {
            id: RecordId::from_uuid(id),
            sequence: Sequence(sequence),
            payload,
            timestamp,
            author_id,
        }))
    }
}

const SELECT_LAST_SEQUENCE: &str =
    "SELECT COALESCE(MAX(sequence), 0) FROM feed_records WHERE path = ?";

const INSERT: &str = r"
    INSERT INTO feed_records (id, path, sequence, author_id, payload, timestamp)
    VALUES (?, ?, ?, ?, ?, ?)
";

const SELECT_RECENT: &str = r"
    SELECT * FROM (
        SELECT * FROM feed_records WHERE path = ? ORDER BY sequence DESC LIMIT ?
    ) ORDER BY sequence ASC
";

/// Document-collection style store backed by `SQLite`.
///
/// Appends are serialized so that sequence assignment, commit and
/// notification happen in the same order for every record of a feed.
pub struct DocumentLogStore {
    pool: SqlitePool,
    hub: Arc<ArrivalHub>,
    write_lock: Mutex<()>,
}

impl DocumentLogStore {
    /// Create a store using the given connection pool and arrival hub.
    #[must_use]
    pub fn new(pool: SqlitePool, hub: Arc<ArrivalHub>) -> Self {
        Self {
            pool,
            hub,
            write_lock: Mutex::new(()),
        }
    }

    /// Hub the store publishes arrivals to.
    #[must_use]
    pub fn hub(&self) -> &Arc<ArrivalHub> {
        &self.hub
    }

    async fn insert(&self, path: &FeedPath, record: NewRecord) -> Result<FeedRecord, StorageError> {
        let payload_json = serde_json::to_string(&record.payload)?;

        let mut tx = self.pool.begin().await?;
        let last: i64 = sqlx::query_scalar(SELECT_LAST_SEQUENCE)
            .bind(path.as_str())
            .fetch_one(&mut *tx)
            .await?;
        let last = u64::try_from(last).map_err(|_| StorageError::SequenceOutOfRange(last))?;
        let stored = record.into_record(Sequence(last).next(), now());
        let sequence = i64::try_from(stored.sequence.0)
            .map_err(|_| StorageError::SequenceOutOfRange(i64::MAX))?;

        sqlx::query(INSERT)
            .bind(stored.id.as_uuid())
            .bind(path.as_str())
            .bind(sequence)
            .bind(stored.author_id.as_str())
            .bind(&payload_json)
            .bind(stored.timestamp.to_rfc3339())
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(stored)
    }

    async fn select_recent(
        &self,
        path: &FeedPath,
        limit: usize,
    ) -> Result<Vec<FeedRecord>, StorageError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows: Vec<Wrapper> = sqlx::query_as(SELECT_RECENT)
            .bind(path.as_str())
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(|w| w.0).collect())
    }
}

impl LogStore for DocumentLogStore {
    async fn append(&self, path: &FeedPath, record: NewRecord) -> Result<FeedRecord, LiveFeedError> {
        let _guard = self.write_lock.lock().await;
        let stored = self
            .insert(path, record)
            .await
            .map_err(StorageError::into_write_failed)?;

        let reached = self.hub.publish(path, stored.clone());
        tracing::debug!(%path, sequence = %stored.sequence, listeners = reached, "document appended");
        Ok(stored)
    }

    async fn recent(&self, path: &FeedPath, limit: usize) -> Result<Vec<FeedRecord>, LiveFeedError> {
        self.select_recent(path, limit)
            .await
            .map_err(StorageError::into_subscription)
    }

    async fn listen(&self, path: &FeedPath, limit: usize) -> Result<Listener, LiveFeedError> {
        let live = self.hub.subscribe(path);
        let backlog = self
            .select_recent(path, limit)
            .await
            .map_err(StorageError::into_subscription)?;
        tracing::debug!(%path, backlog = backlog.len(), "listener registered");
        Ok(Listener::new(path.clone(), backlog, live))
    }

    fn unlisten(&self, listener: Listener) {
        let path = listener.path().clone();
        tracing::debug!(listener = %listener.id(), %path, "listener released");
        drop(listener);
        self.hub.release(&path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::Config;
    use livefeed_app::identity::StaticIdentity;
    use livefeed_app::services::LiveFeedSync;
    use livefeed_domain::feed::CoinflipResult;
    use livefeed_domain::feed::coinflip::Side;
    use livefeed_domain::mirror::WindowSize;

    async fn setup() -> DocumentLogStore {
        let db = Config {
            database_url: "sqlite::memory:".to_string(),
        }
        .build()
        .await
        .unwrap();
        db.log_store(Arc::new(ArrivalHub::new(64)))
    }

    fn chat() -> FeedPath {
        FeedPath::new("chat").unwrap()
    }

    fn new_record(author: &str, text: &str) -> NewRecord {
        NewRecord::new(Payload::text(text), AuthorId::new(author).unwrap())
    }

    #[tokio::test]
    async fn should_store_and_read_back_record() {
        let store = setup().await;
        let stored = store.append(&chat(), new_record("wallet123", "hello")).await.unwrap();

        let recent = store.recent(&chat(), 10).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].id, stored.id);
        assert_eq!(recent[0].sequence, Sequence(1));
        assert_eq!(recent[0].payload.message(), Some("hello"));
        assert_eq!(recent[0].author_id.as_str(), "wallet123");
        assert_eq!(recent[0].timestamp, stored.timestamp);
    }

    #[tokio::test]
    async fn should_assign_sequences_per_path() {
        let store = setup().await;
        let flips = FeedPath::new("coinflips").unwrap();
        store.append(&chat(), new_record("u1", "a")).await.unwrap();
        let second = store.append(&chat(), new_record("u1", "b")).await.unwrap();
        let first_flip = store
            .append(
                &flips,
                NewRecord::new(
                    CoinflipResult::payload(Side::Heads, 1.0, true, 2.0),
                    AuthorId::new("house").unwrap(),
                ),
            )
            .await
            .unwrap();

        assert_eq!(second.sequence, Sequence(2));
        assert_eq!(first_flip.sequence, Sequence(1));
    }

    #[tokio::test]
    async fn should_return_last_records_oldest_first() {
        let store = setup().await;
        for i in 1..=5 {
            store
                .append(&chat(), new_record(&format!("u{i}"), "gm"))
                .await
                .unwrap();
        }

        let recent = store.recent(&chat(), 2).await.unwrap();
        let authors: Vec<&str> = recent.iter().map(|r| r.author_id.as_str()).collect();
        assert_eq!(authors, vec!["u4", "u5"]);
    }

    #[tokio::test]
    async fn should_preserve_scalar_payload_fields() {
        let store = setup().await;
        let flips = FeedPath::new("coinflips").unwrap();
        store
            .append(
                &flips,
                NewRecord::new(
                    CoinflipResult::payload(Side::Tails, 0.5, false, 0.0),
                    AuthorId::new("house").unwrap(),
                ),
            )
            .await
            .unwrap();

        let recent = store.recent(&flips, 1).await.unwrap();
        let result = CoinflipResult::try_from(&recent[0]).unwrap();
        assert_eq!(result.summary(), "tails - Wager: 0.5 - Lost");
    }

    #[tokio::test]
    async fn should_notify_listener_after_backlog() {
        let store = setup().await;
        store.append(&chat(), new_record("u1", "old")).await.unwrap();

        let mut listener = store.listen(&chat(), 10).await.unwrap();
        store.append(&chat(), new_record("u2", "new")).await.unwrap();

        assert_eq!(listener.recv().await.unwrap().unwrap().author_id.as_str(), "u1");
        assert_eq!(listener.recv().await.unwrap().unwrap().author_id.as_str(), "u2");
    }

    #[tokio::test]
    async fn should_drop_hub_channel_when_last_listener_released() {
        let store = setup().await;
        let listener = store.listen(&chat(), 10).await.unwrap();
        assert_eq!(store.hub().channel_count(), 1);

        store.unlisten(listener);
        assert_eq!(store.hub().channel_count(), 0);
    }

    #[tokio::test]
    async fn should_keep_window_in_subscribed_view() {
        let store = Arc::new(setup().await);
        let mut view = LiveFeedSync::new(
            Arc::clone(&store),
            StaticIdentity::anonymous(),
            chat(),
            WindowSize::new(10).unwrap(),
        );
        view.subscribe().await.unwrap();

        for i in 1..=15 {
            store
                .append(&chat(), new_record(&format!("u{i}"), "gm"))
                .await
                .unwrap();
        }
        view.drain_arrivals().unwrap();

        let authors: Vec<String> = view.records().map(|r| r.author_id.to_string()).collect();
        let expected: Vec<String> = (6..=15).map(|i| format!("u{i}")).collect();
        assert_eq!(authors, expected);
    }

    #[tokio::test]
    async fn should_report_write_failure_when_pool_closed() {
        let store = setup().await;
        store.pool.close().await;

        let result = store.append(&chat(), new_record("u1", "gm")).await;
        assert!(matches!(result, Err(LiveFeedError::WriteFailed(_))));
    }

    #[tokio::test]
    async fn should_report_subscription_failure_when_pool_closed() {
        let store = setup().await;
        store.pool.close().await;

        let result = store.listen(&chat(), 10).await;
        assert!(matches!(result, Err(LiveFeedError::Subscription(_))));
    }
}
