//! Live feed sync — keeps a bounded local mirror of one feed current and
//! forwards writes to the store.
//!
//! A view owns exactly one [`LiveFeedSync`]. Every mirror mutation goes
//! through `&mut self`, so a mirror is only ever touched from its owner's
//! scheduling context. Writes take `&self` and never touch the mirror: the
//! record shows up once the store's own notification comes back.

use livefeed_domain::error::LiveFeedError;
use livefeed_domain::id::ListenerId;
use livefeed_domain::mirror::{FeedMirror, WindowSize};
use livefeed_domain::path::FeedPath;
use livefeed_domain::payload::Payload;
use livefeed_domain::record::{FeedRecord, NewRecord};

use crate::ports::{IdentityProvider, Listener, ListenerError, LogStore};

/// Token identifying an active subscription of a [`LiveFeedSync`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle(ListenerId);

impl SubscriptionHandle {
    #[must_use]
    pub fn id(self) -> ListenerId {
        self.0
    }
}

enum SyncState {
    Unsubscribed,
    Subscribed {
        handle: SubscriptionHandle,
        listener: Listener,
    },
}

/// Subscription adapter mirroring a remote append-only feed.
///
/// State machine: `Unsubscribed -> Subscribed -> Unsubscribed`.
/// Dropping the view releases its listener.
pub struct LiveFeedSync<S: LogStore, I> {
    store: S,
    identity: I,
    path: FeedPath,
    mirror: FeedMirror,
    state: SyncState,
}

impl<S: LogStore, I: IdentityProvider> LiveFeedSync<S, I> {
    /// Create an unsubscribed view with an empty mirror.
    pub fn new(store: S, identity: I, path: FeedPath, window: WindowSize) -> Self {
        Self {
            store,
            identity,
            path,
            mirror: FeedMirror::new(window),
            state: SyncState::Unsubscribed,
        }
    }

    #[must_use]
    pub fn path(&self) -> &FeedPath {
        &self.path
    }

    #[must_use]
    pub fn window(&self) -> WindowSize {
        self.mirror.window()
    }

    #[must_use]
    pub fn is_subscribed(&self) -> bool {
        matches!(self.state, SyncState::Subscribed { .. })
    }

    /// Read-only access to the mirror.
    #[must_use]
    pub fn mirror(&self) -> &FeedMirror {
        &self.mirror
    }

    /// Lazy view over the mirrored records, oldest arrival first.
    pub fn records(&self) -> impl Iterator<Item = &FeedRecord> {
        self.mirror.iter()
    }

    /// Register interest in the feed.
    ///
    /// The mirror is reset to empty; the store then delivers the last
    /// `window` existing records followed by every new one.
    ///
    /// # Errors
    ///
    /// - [`LiveFeedError::AlreadySubscribed`] when the view is already subscribed.
    /// - [`LiveFeedError::Subscription`] when the store cannot create the
    ///   listener; the view stays unsubscribed with an empty mirror.
    pub async fn subscribe(&mut self) -> Result<SubscriptionHandle, LiveFeedError> {
        if self.is_subscribed() {
            return Err(LiveFeedError::AlreadySubscribed);
        }
        self.mirror.clear();

        let listener = self
            .store
            .listen(&self.path, self.mirror.window().get())
            .await
            .inspect_err(|err| {
                tracing::warn!(path = %self.path, error = %err, "unable to subscribe to feed");
            })?;

        let handle = SubscriptionHandle(listener.id());
        tracing::debug!(path = %self.path, listener = %handle.id(), window = %self.mirror.window(), "subscribed to feed");
        self.state = SyncState::Subscribed { handle, listener };
        Ok(handle)
    }

    /// Apply one arrival: append to the tail, evict from the head past the window.
    ///
    /// Ignored when the view is not subscribed.
    pub fn on_record_arrived(&mut self, record: FeedRecord) {
        if !self.is_subscribed() {
            tracing::trace!(path = %self.path, record = %record.id, "arrival ignored, view unsubscribed");
            return;
        }
        tracing::debug!(path = %self.path, record = %record.id, sequence = %record.sequence, "record arrived");
        let evicted = self.mirror.push_arrival(record);
        if evicted > 0 {
            tracing::trace!(path = %self.path, evicted, "mirror trimmed to window");
        }
    }

    /// Wait for the next notification and apply it.
    ///
    /// Returns the newly mirrored record, or `None` when the view is not
    /// subscribed or the store closed the feed (the view then becomes
    /// unsubscribed).
    ///
    /// # Errors
    ///
    /// Returns [`LiveFeedError::Subscription`] when the listener broke down.
    /// The mirror is cleared and the view unsubscribed.
    pub async fn next_arrival(&mut self) -> Result<Option<&FeedRecord>, LiveFeedError> {
        let SyncState::Subscribed { listener, .. } = &mut self.state else {
            return Ok(None);
        };
        let next = listener.recv().await;
        match next {
            Ok(Some(record)) => {
                self.on_record_arrived(record);
                Ok(self.mirror.last())
            }
            Ok(None) => {
                tracing::debug!(path = %self.path, "feed closed by the store");
                self.release();
                Ok(None)
            }
            Err(err) => Err(self.degrade(err)),
        }
    }

    /// Apply every notification already delivered, without waiting.
    ///
    /// Returns the number of records applied. When the store closed the
    /// feed the view becomes unsubscribed.
    ///
    /// # Errors
    ///
    /// Returns [`LiveFeedError::Subscription`] when the listener broke down.
    /// The mirror is cleared and the view unsubscribed.
    pub fn drain_arrivals(&mut self) -> Result<usize, LiveFeedError> {
        let mut applied = 0;
        loop {
            let SyncState::Subscribed { listener, .. } = &mut self.state else {
                return Ok(applied);
            };
            let next = listener.try_recv();
            match next {
                Ok(Some(record)) => {
                    self.on_record_arrived(record);
                    applied += 1;
                }
                Ok(None) => return Ok(applied),
                Err(ListenerError::Closed) => {
                    tracing::debug!(path = %self.path, "feed closed by the store");
                    self.release();
                    return Ok(applied);
                }
                Err(err) => return Err(self.degrade(err)),
            }
        }
    }

    /// Validate and forward a write.
    ///
    /// The mirror is **not** updated here; the record is mirrored when the
    /// store's notification arrives. No retry is attempted.
    ///
    /// # Errors
    ///
    /// - [`LiveFeedError::Validation`] when the payload is empty or blank;
    ///   nothing is written.
    /// - [`LiveFeedError::NotAuthorized`] when no identity is available;
    ///   nothing is written.
    /// - [`LiveFeedError::WriteFailed`] when the store rejects the write.
    pub async fn append(&self, payload: impl Into<Payload>) -> Result<FeedRecord, LiveFeedError> {
        let payload = payload.into();
        payload.validate()?;

        let Some(author_id) = self.identity.current() else {
            tracing::debug!(path = %self.path, "append rejected, no identity");
            return Err(LiveFeedError::NotAuthorized);
        };

        let record = self
            .store
            .append(&self.path, NewRecord::new(payload, author_id))
            .await
            .inspect_err(|err| {
                tracing::error!(path = %self.path, error = %err, "feed write failed");
            })?;

        tracing::debug!(path = %self.path, record = %record.id, sequence = %record.sequence, "record written");
        Ok(record)
    }

    /// Release the listener. No mirror mutation happens afterwards.
    ///
    /// Writes already in flight are not cancelled.
    ///
    /// # Errors
    ///
    /// Returns [`LiveFeedError::NotSubscribed`] when `handle` is not the
    /// active subscription.
    pub fn unsubscribe(&mut self, handle: SubscriptionHandle) -> Result<(), LiveFeedError> {
        match &self.state {
            SyncState::Subscribed { handle: active, .. } if *active == handle => {
                self.release();
                tracing::debug!(path = %self.path, listener = %handle.id(), "unsubscribed from feed");
                Ok(())
            }
            _ => Err(LiveFeedError::NotSubscribed),
        }
    }

    fn degrade(&mut self, err: ListenerError) -> LiveFeedError {
        tracing::warn!(path = %self.path, error = %err, "feed listener failed, mirror cleared");
        self.release();
        self.mirror.clear();
        LiveFeedError::subscription(err)
    }
}

impl<S: LogStore, I> LiveFeedSync<S, I> {
    fn release(&mut self) {
        if let SyncState::Subscribed { listener, .. } =
            std::mem::replace(&mut self.state, SyncState::Unsubscribed)
        {
            self.store.unlisten(listener);
        }
    }
}

impl<S: LogStore, I> Drop for LiveFeedSync<S, I> {
    fn drop(&mut self) {
        self.release();
    }
}
