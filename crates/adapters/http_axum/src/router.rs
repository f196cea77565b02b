//! Axum router assembly.

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use livefeed_app::ports::LogStore;

use crate::state::AppState;

/// Build the top-level axum [`Router`].
///
/// Nests the feed API under `/api` and logs each HTTP request/response at
/// the `DEBUG` level through a [`TraceLayer`].
pub fn build<S>(state: AppState<S>) -> Router
where
    S: LogStore + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", crate::api::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AnonymousWriters;
    use crate::test_support::{MemoryStore, state};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use livefeed_domain::path::FeedPath;
    use tower::ServiceExt;

    fn post(uri: &str, author: Option<&str>, body: &str) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(author) = author {
            builder = builder.header(crate::api::AUTHOR_HEADER, author);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    #[tokio::test]
    async fn should_return_ok_when_health_check_called() {
        let (state, _hub) = state(MemoryStore::default());
        let app = build(state);

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn should_return_created_when_append_succeeds() {
        let (state, _hub) = state(MemoryStore::default());
        let store = std::sync::Arc::clone(&state.store);
        let app = build(state);

        let response = app
            .oneshot(post(
                "/api/feeds/chat/records",
                Some("wallet123"),
                r#"{"message":"hello"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let chat = FeedPath::new("chat").unwrap();
        assert_eq!(store.records.lock().unwrap()[&chat].len(), 1);
    }

    #[tokio::test]
    async fn should_return_bad_request_when_message_blank() {
        let (state, _hub) = state(MemoryStore::default());
        let app = build(state);

        let response = app
            .oneshot(post("/api/feeds/chat/records", Some("wallet123"), r#"{"message":"   "}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn should_return_unauthorized_when_author_header_missing() {
        let (state, _hub) = state(MemoryStore::default());
        let app = build(state);

        let response = app
            .oneshot(post("/api/feeds/chat/records", None, r#"{"message":"hello"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn should_echo_author_header_when_append_succeeds() {
        let (state, _hub) = state(MemoryStore::default());
        let app = build(state);

        let response = app
            .oneshot(post("/api/feeds/chat/records", Some("wallet123"), r#"{"message":"hello"}"#))
            .await
            .unwrap();

        assert_eq!(response.headers()[crate::api::AUTHOR_HEADER], "wallet123");
    }

    #[tokio::test]
    async fn should_author_with_session_id_when_anonymous_writers_allowed() {
        let (state, _hub) = state(MemoryStore::default());
        let store = std::sync::Arc::clone(&state.store);
        let app = build(state.with_anonymous_writers(AnonymousWriters::Session));

        let response = app
            .oneshot(post("/api/feeds/chat/records", None, r#"{"message":"hello"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let issued = response.headers()[crate::api::AUTHOR_HEADER].to_str().unwrap();
        assert!(issued.starts_with("user_"));
        let chat = FeedPath::new("chat").unwrap();
        assert_eq!(store.records.lock().unwrap()[&chat][0].author_id.as_str(), issued);
    }

    #[tokio::test]
    async fn should_prefer_author_header_over_session_id() {
        let (state, _hub) = state(MemoryStore::default());
        let app = build(state.with_anonymous_writers(AnonymousWriters::Session));

        let response = app
            .oneshot(post("/api/feeds/chat/records", Some("wallet123"), r#"{"message":"hello"}"#))
            .await
            .unwrap();

        assert_eq!(response.headers()[crate::api::AUTHOR_HEADER], "wallet123");
    }

    #[tokio::test]
    async fn should_return_bad_gateway_when_store_rejects_write() {
        let (state, _hub) = state(MemoryStore::failing());
        let app = build(state);

        let response = app
            .oneshot(post("/api/feeds/chat/records", Some("wallet123"), r#"{"message":"hello"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn should_return_bad_request_when_feed_name_invalid() {
        let (state, _hub) = state(MemoryStore::default());
        let app = build(state);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/feeds/games..dice/records")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
