//! JSON REST API and SSE handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod records;
#[allow(clippy::missing_errors_doc)]
pub mod stream;
#[allow(clippy::missing_errors_doc)]
pub mod views;

use axum::Router;
use axum::http::HeaderMap;
use axum::routing::get;

use livefeed_app::ports::LogStore;
use livefeed_domain::author::AuthorId;
use livefeed_domain::error::ValidationError;
use livefeed_domain::path::FeedPath;

use crate::state::AppState;

/// Header carrying the writer identity.
pub const AUTHOR_HEADER: &str = "x-author-id";

/// Build the `/api` sub-router.
pub fn routes<S>() -> Router<AppState<S>>
where
    S: LogStore + Send + Sync + 'static,
{
    Router::new()
        .route(
            "/feeds/{feed}/records",
            get(records::list::<S>).post(records::append::<S>),
        )
        .route("/feeds/{feed}/stream", get(stream::stream::<S>))
        .route("/feeds/{feed}/messages", get(views::messages::<S>))
        .route("/feeds/{feed}/results", get(views::results::<S>))
}

/// Feed path from its URL segment, where `.` stands for `/`.
pub(crate) fn feed_path(segment: &str) -> Result<FeedPath, ValidationError> {
    FeedPath::new(segment.replace('.', "/"))
}

/// Writer identity from the [`AUTHOR_HEADER`], if any.
pub(crate) fn author(headers: &HeaderMap) -> Option<AuthorId> {
    let value = headers.get(AUTHOR_HEADER)?.to_str().ok()?;
    AuthorId::new(value).ok()
}
