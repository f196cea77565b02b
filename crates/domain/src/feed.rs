//! Feed presets and typed views over records.
//!
//! Two feeds are known out of the box: the chat room (`chat`, last 50
//! messages) and the coinflip scoreboard (`coinflips`, last 10 results).

pub mod chat;
pub mod coinflip;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::mirror::WindowSize;
use crate::path::FeedPath;

pub use chat::ChatMessage;
pub use coinflip::CoinflipResult;

/// Default window of the chat feed.
pub const CHAT_WINDOW: usize = 50;
/// Default window of the coinflip scoreboard.
pub const COINFLIPS_WINDOW: usize = 10;

/// A feed path together with the window its views keep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedSpec {
    pub path: FeedPath,
    pub window: WindowSize,
}

impl FeedSpec {
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when the path is invalid or the window is zero.
    pub fn new(path: impl Into<String>, window: usize) -> Result<Self, ValidationError> {
        Ok(Self {
            path: FeedPath::new(path)?,
            window: WindowSize::new(window)?,
        })
    }

    /// The `chat` feed, 50 most recent messages.
    #[must_use]
    pub fn chat() -> Self {
        Self::preset(chat::PATH, CHAT_WINDOW)
    }

    /// The `coinflips` feed, 10 most recent results.
    #[must_use]
    pub fn coinflips() -> Self {
        Self::preset(coinflip::PATH, COINFLIPS_WINDOW)
    }

    fn preset(path: &'static str, window: usize) -> Self {
        match Self::new(path, window) {
            Ok(spec) => spec,
            Err(err) => unreachable!("preset feed {path} is invalid: {err}"),
        }
    }
}
