//! JSON REST handlers for raw feed records.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use livefeed_app::identity::{SessionIdentity, StaticIdentity};
use livefeed_app::ports::LogStore;
use livefeed_domain::payload::Payload;
use livefeed_domain::record::FeedRecord;

use crate::error::ApiError;
use crate::state::{AnonymousWriters, AppState};

/// Query string of the list endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Number of records; defaults to the window of the feed.
    pub limit: Option<usize>,
}

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<FeedRecord>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the append endpoint.
pub enum AppendResponse {
    Created(Json<FeedRecord>),
}

impl IntoResponse for AppendResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => {
                let author = HeaderValue::from_str(json.0.author_id.as_str());
                let mut response = (StatusCode::CREATED, json).into_response();
                if let Ok(author) = author {
                    response.headers_mut().insert(super::AUTHOR_HEADER, author);
                }
                response
            }
        }
    }
}

/// `GET /api/feeds/{feed}/records` — last records of a feed, oldest first.
pub async fn list<S>(
    State(state): State<AppState<S>>,
    Path(feed): Path<String>,
    Query(query): Query<ListQuery>,
) -> Result<ListResponse, ApiError>
where
    S: LogStore + Send + Sync + 'static,
{
    let path = super::feed_path(&feed)?;
    let limit = query
        .limit
        .unwrap_or_else(|| state.feeds.window_for(&path).get());
    let records = state.store.recent(&path, limit).await?;
    Ok(ListResponse::Ok(Json(records)))
}

/// `POST /api/feeds/{feed}/records` — append a payload as the caller.
///
/// The caller is identified by the `x-author-id` header. Without it the
/// write is refused, or authored by a new session id when
/// [`AnonymousWriters::Session`] is configured. The store assigns the id,
/// sequence and timestamp of the returned record; its author is echoed in
/// the `x-author-id` response header.
pub async fn append<S>(
    State(state): State<AppState<S>>,
    Path(feed): Path<String>,
    headers: HeaderMap,
    Json(payload): Json<Payload>,
) -> Result<AppendResponse, ApiError>
where
    S: LogStore + Send + Sync + 'static,
{
    let path = super::feed_path(&feed)?;
    let record = match (super::author(&headers), state.anonymous) {
        (Some(author), _) => {
            let view = state.view(path, StaticIdentity::connected(author));
            view.append(payload).await?
        }
        (None, AnonymousWriters::Session) => {
            let view = state.view(path, SessionIdentity::new());
            view.append(payload).await?
        }
        (None, AnonymousWriters::Reject) => {
            let view = state.view(path, StaticIdentity::anonymous());
            view.append(payload).await?
        }
    };
    Ok(AppendResponse::Created(Json(record)))
}
