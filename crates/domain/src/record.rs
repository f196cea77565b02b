//! Feed record — a timestamped, attributed unit of data appended to a feed.

use serde::{Deserialize, Serialize};

use crate::author::AuthorId;
use crate::id::{RecordId, Sequence};
use crate::payload::Payload;
use crate::time::{self, Timestamp};

/// A write request handed to the store.
///
/// Carries no timestamp: the store stamps the record with its own clock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRecord {
    pub payload: Payload,
    pub author_id: AuthorId,
}

impl NewRecord {
    #[must_use]
    pub fn new(payload: Payload, author_id: AuthorId) -> Self {
        Self { payload, author_id }
    }

    /// Turn the request into a stored record with store-assigned metadata.
    #[must_use]
    pub fn into_record(self, sequence: Sequence, timestamp: Timestamp) -> FeedRecord {
        FeedRecord {
            id: RecordId::new(),
            sequence,
            payload: self.payload,
            timestamp,
            author_id: self.author_id,
        }
    }
}

/// A record as stored and delivered by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedRecord {
    pub id: RecordId,
    pub sequence: Sequence,
    pub payload: Payload,
    #[serde(with = "time::millis")]
    pub timestamp: Timestamp,
    #[serde(rename = "userId")]
    pub author_id: AuthorId,
}
