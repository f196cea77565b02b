//! Typed projections of the recent window: chat lines and scoreboard rows.

use axum::Json;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use livefeed_app::ports::LogStore;
use livefeed_domain::feed::chat::ChatMessage;
use livefeed_domain::feed::coinflip::CoinflipResult;
use livefeed_domain::record::FeedRecord;

use crate::error::ApiError;
use crate::state::AppState;

/// A chat message with its rendered line.
#[derive(Debug, Serialize)]
pub struct ChatLine {
    #[serde(flatten)]
    pub message: ChatMessage,
    pub line: String,
}

/// A settled flip with its scoreboard summary.
#[derive(Debug, Serialize)]
pub struct ScoreLine {
    #[serde(flatten)]
    pub result: CoinflipResult,
    pub summary: String,
}

/// Possible responses from the chat endpoint.
pub enum MessagesResponse {
    Ok(Json<Vec<ChatLine>>),
}

impl IntoResponse for MessagesResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the scoreboard endpoint.
pub enum ResultsResponse {
    Ok(Json<Vec<ScoreLine>>),
}

impl IntoResponse for ResultsResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Recent window of a feed, each record converted with `T::try_from`.
///
/// Records of another shape are skipped.
async fn project<S, T>(state: &AppState<S>, feed: &str) -> Result<Vec<T>, ApiError>
where
    S: LogStore + Send + Sync + 'static,
    T: for<'a> TryFrom<&'a FeedRecord>,
{
    let path = super::feed_path(feed)?;
    let window = state.feeds.window_for(&path);
    let records = state.store.recent(&path, window.get()).await?;
    Ok(records
        .iter()
        .filter_map(|record| {
            T::try_from(record)
                .inspect_err(|_| {
                    tracing::debug!(%path, record = %record.id, "record skipped, unexpected shape");
                })
                .ok()
        })
        .collect())
}

/// `GET /api/feeds/{feed}/messages` — chat view of the feed.
pub async fn messages<S>(
    State(state): State<AppState<S>>,
    Path(feed): Path<String>,
) -> Result<MessagesResponse, ApiError>
where
    S: LogStore + Send + Sync + 'static,
{
    let lines = project::<S, ChatMessage>(&state, &feed)
        .await?
        .into_iter()
        .map(|message| ChatLine {
            line: message.line(),
            message,
        })
        .collect();
    Ok(MessagesResponse::Ok(Json(lines)))
}

/// `GET /api/feeds/{feed}/results` — scoreboard view of the feed.
pub async fn results<S>(
    State(state): State<AppState<S>>,
    Path(feed): Path<String>,
) -> Result<ResultsResponse, ApiError>
where
    S: LogStore + Send + Sync + 'static,
{
    let lines = project::<S, CoinflipResult>(&state, &feed)
        .await?
        .into_iter()
        .map(|result| ScoreLine {
            summary: result.summary(),
            result,
        })
        .collect();
    Ok(ResultsResponse::Ok(Json(lines)))
}
