//! Server-Sent Events (SSE) live view of a feed.

use std::convert::Infallible;

use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::ReceiverStream;

use livefeed_app::identity::StaticIdentity;
use livefeed_app::ports::LogStore;
use livefeed_app::services::LiveFeedSync;
use livefeed_domain::record::FeedRecord;

use crate::error::ApiError;
use crate::state::AppState;

/// SSE event name of a mirrored record.
pub const RECORD_EVENT: &str = "record";
/// SSE event name sent once when the view lost its listener.
pub const DEGRADED_EVENT: &str = "degraded";

/// `GET /api/feeds/{feed}/stream` — SSE stream of one live view.
///
/// The connection owns a [`LiveFeedSync`] subscribed with the window of the
/// feed: the backlog is replayed first, then each arrival is sent as a
/// `record` event. When the client disconnects the view is dropped, which
/// releases its listener.
pub async fn stream<S>(
    State(state): State<AppState<S>>,
    Path(feed): Path<String>,
) -> Result<Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>>, ApiError>
where
    S: LogStore + Send + Sync + 'static,
{
    let path = super::feed_path(&feed)?;
    let mut view = state.view(path, StaticIdentity::anonymous());
    view.subscribe().await?;

    let (tx, rx) = mpsc::channel(view.window().get());
    tokio::spawn(pump(view, tx));

    let events = ReceiverStream::new(rx).map(Ok);
    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

/// Forward every arrival of `view` to `tx` until either side goes away.
async fn pump<S>(mut view: LiveFeedSync<S, StaticIdentity>, tx: mpsc::Sender<Event>)
where
    S: LogStore,
{
    let path = view.path().clone();
    loop {
        let event = tokio::select! {
            () = tx.closed() => {
                tracing::debug!(%path, "SSE client disconnected");
                break;
            }
            arrival = view.next_arrival() => match arrival {
                Ok(Some(record)) => match record_event(record) {
                    Some(event) => event,
                    None => continue,
                },
                Ok(None) => {
                    tracing::debug!(%path, "feed closed, ending SSE stream");
                    break;
                }
                Err(err) => {
                    let event = Event::default().event(DEGRADED_EVENT).data(err.to_string());
                    let _ = tx.send(event).await;
                    break;
                }
            },
        };
        if tx.send(event).await.is_err() {
            break;
        }
    }
}

fn record_event(record: &FeedRecord) -> Option<Event> {
    match Event::default()
        .event(RECORD_EVENT)
        .id(record.sequence.to_string())
        .json_data(record)
    {
        Ok(event) => Some(event),
        Err(err) => {
            tracing::warn!(%err, record = %record.id, "failed to serialize record for SSE stream");
            None
        }
    }
}
