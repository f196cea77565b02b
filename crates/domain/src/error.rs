//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`LiveFeedError`] via `#[from]` or an explicit `From` impl.
//! Transport failures keep their source error boxed instead of
//! flattening it into a string.

/// Boxed source error coming from an adapter (database, network, …).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Top-level error for every feed operation.
///
/// All variants are scoped to a single feed/view; none of them is fatal to
/// the process.
#[derive(Debug, thiserror::Error)]
pub enum LiveFeedError {
    /// Input rejected before any write was attempted.
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// No caller identity is available (e.g. no connected wallet).
    #[error("no identity available to author the record")]
    NotAuthorized,

    /// The store rejected the write or the transport failed.
    #[error("write failed")]
    WriteFailed(#[source] BoxError),

    /// The store-side listener could not be created or broke down.
    #[error("subscription failed")]
    Subscription(#[source] BoxError),

    /// `subscribe` was called on a view that is already subscribed.
    #[error("feed view is already subscribed")]
    AlreadySubscribed,

    /// `unsubscribe` was called with a handle that is not the active one.
    #[error("feed view is not subscribed with this handle")]
    NotSubscribed,
}

impl LiveFeedError {
    /// Wrap a transport error raised while writing.
    pub fn write_failed(err: impl Into<BoxError>) -> Self {
        Self::WriteFailed(err.into())
    }

    /// Wrap a listener error.
    pub fn subscription(err: impl Into<BoxError>) -> Self {
        Self::Subscription(err.into())
    }
}

/// Domain invariant violations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("payload is empty")]
    EmptyPayload,

    #[error("field `{0}` is blank")]
    BlankField(String),

    #[error("invalid feed path `{0}`")]
    InvalidPath(String),

    #[error("window size must be greater than zero")]
    ZeroWindow,

    #[error("author id is empty")]
    EmptyAuthor,

    #[error("field `{field}` is missing or has the wrong type")]
    MissingField { field: &'static str },

    #[error("field `{field}` has unexpected value `{value}`")]
    InvalidField { field: &'static str, value: String },
}
