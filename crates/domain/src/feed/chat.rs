//! Chat room messages.

use serde::Serialize;

use crate::author::AuthorId;
use crate::error::ValidationError;
use crate::payload::{MESSAGE_FIELD, Payload};
use crate::record::FeedRecord;
use crate::time::{self, Timestamp};

/// Path of the chat feed.
pub const PATH: &str = "chat";

/// A chat message as rendered by a chat view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub message: String,
    #[serde(with = "time::millis")]
    pub timestamp: Timestamp,
    pub user_id: AuthorId,
}

impl ChatMessage {
    /// Payload to append for a typed message.
    #[must_use]
    pub fn payload(text: impl Into<String>) -> Payload {
        Payload::text(text)
    }

    /// One rendered row: `abcd...wxyz: text`.
    #[must_use]
    pub fn line(&self) -> String {
        format!("{}: {}", self.user_id.short(), self.message)
    }
}

impl TryFrom<&FeedRecord> for ChatMessage {
    type Error = ValidationError;

    fn try_from(record: &FeedRecord) -> Result<Self, Self::Error> {
        let message = record
            .payload
            .message()
            .ok_or(ValidationError::MissingField {
                field: MESSAGE_FIELD,
            })?;
        Ok(Self {
            message: message.to_string(),
            timestamp: record.timestamp,
            user_id: record.author_id.clone(),
        })
    }
}
