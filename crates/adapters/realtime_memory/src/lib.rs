//! # livefeed-adapter-realtime-memory
//!
//! In-process realtime log store: a tree of feed paths, each holding an
//! append-only list of records keyed by an increasing sequence (the push
//! key). Every append is stamped with the store clock and fanned out to the
//! feed's listeners through an [`ArrivalHub`].
//!
//! Appending, stamping and publishing happen under one lock, so listeners
//! observe records in sequence order.
//!
//! ## Dependency rule
//!
//! Depends on `livefeed-app` (port traits) and `livefeed-domain` only.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use livefeed_app::arrival_hub::ArrivalHub;
use livefeed_app::ports::{Listener, LogStore};
use livefeed_domain::error::LiveFeedError;
use livefeed_domain::id::Sequence;
use livefeed_domain::path::FeedPath;
use livefeed_domain::record::{FeedRecord, NewRecord};
use livefeed_domain::time::now;

#[derive(Default)]
struct Feed {
    records: Vec<FeedRecord>,
    last: Sequence,
}

impl Feed {
    fn tail(&self, limit: usize) -> Vec<FeedRecord> {
        self.records[self.records.len().saturating_sub(limit)..].to_vec()
    }
}

/// Realtime-database style store kept in memory.
pub struct RealtimeLogStore {
    hub: Arc<ArrivalHub>,
    feeds: Mutex<HashMap<FeedPath, Feed>>,
}

impl RealtimeLogStore {
    /// Create an empty store publishing through `hub`.
    #[must_use]
    pub fn new(hub: Arc<ArrivalHub>) -> Self {
        Self {
            hub,
            feeds: Mutex::new(HashMap::new()),
        }
    }

    /// Hub the store publishes arrivals to.
    #[must_use]
    pub fn hub(&self) -> &Arc<ArrivalHub> {
        &self.hub
    }

    /// Number of records ever appended to `path`.
    #[must_use]
    pub fn len(&self, path: &FeedPath) -> usize {
        self.feeds().get(path).map_or(0, |feed| feed.records.len())
    }

    /// Whether `path` holds no record.
    #[must_use]
    pub fn is_empty(&self, path: &FeedPath) -> bool {
        self.len(path) == 0
    }

    fn feeds(&self) -> MutexGuard<'_, HashMap<FeedPath, Feed>> {
        self.feeds.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for RealtimeLogStore {
    fn default() -> Self {
        Self::new(Arc::new(ArrivalHub::default()))
    }
}

impl LogStore for RealtimeLogStore {
    async fn append(&self, path: &FeedPath, record: NewRecord) -> Result<FeedRecord, LiveFeedError> {
        let mut feeds = self.feeds();
        let feed = feeds.entry(path.clone()).or_default();
        feed.last = feed.last.next();
        let stored = record.into_record(feed.last, now());
        feed.records.push(stored.clone());

        let reached = self.hub.publish(path, stored.clone());
        tracing::debug!(%path, sequence = %stored.sequence, listeners = reached, "record appended");
        Ok(stored)
    }

    async fn recent(&self, path: &FeedPath, limit: usize) -> Result<Vec<FeedRecord>, LiveFeedError> {
        Ok(self.feeds().get(path).map(|feed| feed.tail(limit)).unwrap_or_default())
    }

    async fn listen(&self, path: &FeedPath, limit: usize) -> Result<Listener, LiveFeedError> {
        let feeds = self.feeds();
        let live = self.hub.subscribe(path);
        let backlog = feeds.get(path).map(|feed| feed.tail(limit)).unwrap_or_default();
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
