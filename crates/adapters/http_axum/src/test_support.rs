//! In-memory log store double shared by the handler tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use livefeed_app::arrival_hub::ArrivalHub;
use livefeed_app::ports::{Listener, LogStore};
use livefeed_domain::error::LiveFeedError;
use livefeed_domain::id::Sequence;
use livefeed_domain::path::FeedPath;
use livefeed_domain::record::{FeedRecord, NewRecord};
use livefeed_domain::time;

use crate::state::{AppState, FeedCatalog};

#[derive(Default)]
pub struct MemoryStore {
    pub hub: Arc<ArrivalHub>,
    pub records: Mutex<HashMap<FeedPath, Vec<FeedRecord>>>,
    pub fail_writes: bool,
}

impl MemoryStore {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            hub: Arc::new(ArrivalHub::new(capacity)),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    fn tail(&self, path: &FeedPath, limit: usize) -> Vec<FeedRecord> {
        let records = self.records.lock().unwrap();
        let all = records.get(path).map_or(&[][..], Vec::as_slice);
        all[all.len().saturating_sub(limit)..].to_vec()
    }
}

impl LogStore for MemoryStore {
    async fn append(&self, path: &FeedPath, record: NewRecord) -> Result<FeedRecord, LiveFeedError> {
        if self.fail_writes {
            return Err(LiveFeedError::write_failed(std::io::Error::other(
                "store unreachable",
            )));
        }
        let mut records = self.records.lock().unwrap();
        let feed = records.entry(path.clone()).or_default();
        let sequence = Sequence(feed.len() as u64 + 1);
        let stored = record.into_record(sequence, time::now());
        feed.push(stored.clone());
        self.hub.publish(path, stored.clone());
        Ok(stored)
    }

    async fn recent(&self, path: &FeedPath, limit: usize) -> Result<Vec<FeedRecord>, LiveFeedError> {
        Ok(self.tail(path, limit))
    }

    async fn listen(&self, path: &FeedPath, limit: usize) -> Result<Listener, LiveFeedError> {
        let live = self.hub.subscribe(path);
        Ok(Listener::new(path.clone(), self.tail(path, limit), live))
    }

    fn unlisten(&self, listener: Listener) {
        let path = listener.path().clone();
        drop(listener);
        self.hub.release(&path);
    }
}

pub fn state(store: MemoryStore) -> (AppState<MemoryStore>, Arc<ArrivalHub>) {
    let hub = Arc::clone(&store.hub);
    (AppState::new(store, FeedCatalog::default()), hub)
}
