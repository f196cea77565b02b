//! In-process arrival fan-out backed by one tokio broadcast channel per feed.
//!
//! Store adapters publish every appended record here; listeners of a feed
//! subscribe to that feed's channel only, so feeds never share state.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast;

use livefeed_domain::path::FeedPath;
use livefeed_domain::record::FeedRecord;

/// Per-feed broadcast hub.
///
/// Publishing succeeds even when a feed has no listener
/// (the record is simply not delivered).
pub struct ArrivalHub {
    capacity: usize,
    channels: Mutex<HashMap<FeedPath, broadcast::Sender<FeedRecord>>>,
}

impl ArrivalHub {
    /// Create a hub whose per-feed channels buffer `capacity` records.
    ///
    /// A listener that falls more than `capacity` records behind lags.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            channels: Mutex::new(HashMap::new()),
        }
    }

    fn channels(&self) -> MutexGuard<'_, HashMap<FeedPath, broadcast::Sender<FeedRecord>>> {
        self.channels.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Subscribe to the arrivals of one feed.
    ///
    /// The receiver gets every record published *after* this call.
    #[must_use]
    pub fn subscribe(&self, path: &FeedPath) -> broadcast::Receiver<FeedRecord> {
        self.channels()
            .entry(path.clone())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Deliver a record to the current listeners of `path`.
    ///
    /// Returns the number of listeners reached. A channel found without
    /// receivers is dropped.
    pub fn publish(&self, path: &FeedPath, record: FeedRecord) -> usize {
        let mut channels = self.channels();
        let Some(sender) = channels.get(path) else {
            return 0;
        };
        match sender.send(record) {
            Ok(reached) => reached,
            Err(_) => {
                channels.remove(path);
                0
            }
        }
    }

    /// Drop the channel of `path` once its last receiver is gone.
    ///
    /// Returns whether the channel was removed.
    pub fn release(&self, path: &FeedPath) -> bool {
        let mut channels = self.channels();
        let idle = channels
            .get(path)
            .is_some_and(|sender| sender.receiver_count() == 0);
        if idle {
            channels.remove(path);
        }
        idle
    }

    /// Number of feeds with an open channel.
    #[must_use]
    pub fn channel_count(&self) -> usize {
        self.channels().len()
    }

    /// Number of live receivers on `path`.
    #[must_use]
    pub fn listener_count(&self, path: &FeedPath) -> usize {
        self.channels()
            .get(path)
            .map_or(0, broadcast::Sender::receiver_count)
    }

    /// Close a feed: its listeners observe the end of the stream.
    pub fn close(&self, path: &FeedPath) {
        self.channels().remove(path);
    }
}

impl Default for ArrivalHub {
    fn default() -> Self {
        Self::new(256)
    }
}
