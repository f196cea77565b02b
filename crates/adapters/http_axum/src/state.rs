//! Shared application state for axum handlers.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;

use livefeed_app::ports::{IdentityProvider, LogStore};
use livefeed_app::services::LiveFeedSync;
use livefeed_domain::feed::FeedSpec;
use livefeed_domain::mirror::WindowSize;
use livefeed_domain::path::FeedPath;

/// Window of every configured feed, with a fallback for the others.
#[derive(Debug, Clone)]
pub struct FeedCatalog {
    windows: HashMap<FeedPath, WindowSize>,
    fallback: WindowSize,
}

impl FeedCatalog {
    /// Build a catalog from feed specs; unknown feeds use `fallback`.
    pub fn new(feeds: impl IntoIterator<Item = FeedSpec>, fallback: WindowSize) -> Self {
        Self {
            windows: feeds
                .into_iter()
                .map(|spec| (spec.path, spec.window))
                .collect(),
            fallback,
        }
    }

    #[must_use]
    pub fn window_for(&self, path: &FeedPath) -> WindowSize {
        self.windows.get(path).copied().unwrap_or(self.fallback)
    }
}

impl Default for FeedCatalog {
    fn default() -> Self {
        let fallback = FeedSpec::chat().window;
        Self::new([FeedSpec::chat(), FeedSpec::coinflips()], fallback)
    }
}

/// What an append without an `x-author-id` header turns into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnonymousWriters {
    /// Refuse the write with `401`.
    #[default]
    Reject,
    /// Author the write with a fresh `user_…` session id, returned in the
    /// `x-author-id` response header for the client to reuse.
    Session,
}

/// Application state shared across all axum handlers.
///
/// Generic over the log store to avoid dynamic dispatch.
/// `Clone` is implemented manually so the store itself does not need to be
/// `Clone` — only the `Arc` wrappers are cloned.
pub struct AppState<S> {
    /// Store every view reads from and writes to.
    pub store: Arc<S>,
    /// Per-feed window sizes.
    pub feeds: Arc<FeedCatalog>,
    /// Policy for writers without an identity header.
    pub anonymous: AnonymousWriters,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            feeds: Arc::clone(&self.feeds),
            anonymous: self.anonymous,
        }
    }
}

impl<S> AppState<S>
where
    S: LogStore + Send + Sync + 'static,
{
    /// Create a new application state.
    pub fn new(store: S, feeds: FeedCatalog) -> Self {
        Self::from_arcs(Arc::new(store), Arc::new(feeds))
    }

    /// Create a new application state from pre-wrapped `Arc`s.
    ///
    /// Use this when the store is shared with other tasks.
    pub fn from_arcs(store: Arc<S>, feeds: Arc<FeedCatalog>) -> Self {
        Self {
            store,
            feeds,
            anonymous: AnonymousWriters::default(),
        }
    }

    /// Set the policy for writers without an identity header.
    #[must_use]
    pub fn with_anonymous_writers(mut self, anonymous: AnonymousWriters) -> Self {
        self.anonymous = anonymous;
        self
    }

    /// Open a view of `path` on behalf of `identity`.
    pub fn view<I: IdentityProvider>(&self, path: FeedPath, identity: I) -> LiveFeedSync<Arc<S>, I> {
        let window = self.feeds.window_for(&path);
        LiveFeedSync::new(Arc::clone(&self.store), identity, path, window)
    }
}
