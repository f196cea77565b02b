//! Log store port — the remote append-only feed store.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};

use livefeed_domain::error::LiveFeedError;
use livefeed_domain::id::{ListenerId, Sequence};
use livefeed_domain::path::FeedPath;
use livefeed_domain::record::{FeedRecord, NewRecord};

/// Path-addressed store of append-only ordered feeds.
///
/// Implementations assign the record id, the per-feed [`Sequence`] and the
/// timestamp from their own clock, then notify every listener of the path.
pub trait LogStore {
    /// Append a record to the feed at `path`.
    ///
    /// Transport or store rejections are reported as
    /// [`LiveFeedError::WriteFailed`].
    fn append(
        &self,
        path: &FeedPath,
        record: NewRecord,
    ) -> impl Future<Output = Result<FeedRecord, LiveFeedError>> + Send;

    /// The last `limit` records of the feed, oldest first.
    fn recent(
        &self,
        path: &FeedPath,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<FeedRecord>, LiveFeedError>> + Send;

    /// Start listening: the last `limit` existing records, then every new one.
    ///
    /// Failures are reported as [`LiveFeedError::Subscription`].
    fn listen(
        &self,
        path: &FeedPath,
        limit: usize,
    ) -> impl Future<Output = Result<Listener, LiveFeedError>> + Send;

    /// Release a listener. No record is delivered through it afterwards.
    fn unlisten(&self, listener: Listener) {
        tracing::debug!(listener = %listener.id(), path = %listener.path(), "listener released");
        drop(listener);
    }
}

impl<T: LogStore + Send + Sync> LogStore for Arc<T> {
    fn append(
        &self,
        path: &FeedPath,
        record: NewRecord,
    ) -> impl Future<Output = Result<FeedRecord, LiveFeedError>> + Send {
        (**self).append(path, record)
    }

    fn recent(
        &self,
        path: &FeedPath,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<FeedRecord>, LiveFeedError>> + Send {
        (**self).recent(path, limit)
    }

    fn listen(
        &self,
        path: &FeedPath,
        limit: usize,
    ) -> impl Future<Output = Result<Listener, LiveFeedError>> + Send {
        (**self).listen(path, limit)
    }

    fn unlisten(&self, listener: Listener) {
        (**self).unlisten(listener);
    }
}

/// Failure of an established listener.
#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    /// The listener fell behind and the store dropped notifications.
    #[error("listener lagged behind, {0} records were dropped")]
    Lagged(u64),
    /// The store closed the feed; nothing more will be delivered.
    #[error("feed closed by the store")]
    Closed,
}

/// Store-side registration delivering one notification per record.
///
/// Yields the backlog captured at listen time first, then live arrivals.
/// Live arrivals already covered by the backlog are skipped.
#[derive(Debug)]
pub struct Listener {
    id: ListenerId,
    path: FeedPath,
    backlog: VecDeque<FeedRecord>,
    backlog_tail: Option<Sequence>,
    live: broadcast::Receiver<FeedRecord>,
}

impl Listener {
    /// Build a listener from a backlog and a live receiver.
    ///
    /// The receiver must be subscribed **before** the backlog is read so no
    /// record falls in between.
    #[must_use]
    pub fn new(
        path: FeedPath,
        backlog: Vec<FeedRecord>,
        live: broadcast::Receiver<FeedRecord>,
    ) -> Self {
        let backlog_tail = backlog.iter().map(|r| r.sequence).max();
        Self {
            id: ListenerId::new(),
            path,
            backlog: backlog.into(),
            backlog_tail,
            live,
        }
    }

    #[must_use]
    pub fn id(&self) -> ListenerId {
        self.id
    }

    #[must_use]
    pub fn path(&self) -> &FeedPath {
        &self.path
    }

    fn is_replay(&self, record: &FeedRecord) -> bool {
        self.backlog_tail
            .is_some_and(|tail| record.sequence <= tail)
    }

    /// Wait for the next record.
    ///
    /// Returns `Ok(None)` once the store closed the feed.
    ///
    /// # Errors
    ///
    /// Returns [`ListenerError::Lagged`] when notifications were dropped.
    pub async fn recv(&mut self) -> Result<Option<FeedRecord>, ListenerError> {
        if let Some(record) = self.backlog.pop_front() {
            return Ok(Some(record));
        }
        loop {
            let next = self.live.recv().await;
            match next {
                Ok(record) if self.is_replay(&record) => {}
                Ok(record) => return Ok(Some(record)),
                Err(RecvError::Closed) => return Ok(None),
                Err(RecvError::Lagged(skipped)) => return Err(ListenerError::Lagged(skipped)),
            }
        }
    }

    /// Take the next record if one is already delivered.
    ///
    /// Returns `Ok(None)` when nothing is pending.
    ///
    /// # Errors
    ///
    /// - [`ListenerError::Lagged`] when notifications were dropped.
    /// - [`ListenerError::Closed`] once the store closed the feed and every
    ///   pending record was taken.
    pub fn try_recv(&mut self) -> Result<Option<FeedRecord>, ListenerError> {
        if let Some(record) = self.backlog.pop_front() {
            return Ok(Some(record));
        }
        loop {
            let next = self.live.try_recv();
            match next {
                Ok(record) if self.is_replay(&record) => {}
                Ok(record) => return Ok(Some(record)),
                Err(TryRecvError::Empty) => return Ok(None),
                Err(TryRecvError::Closed) => return Err(ListenerError::Closed),
                Err(TryRecvError::Lagged(skipped)) => return Err(ListenerError::Lagged(skipped)),
            }
        }
    }
}
