//! # livefeedd — live feed daemon
//!
//! Composition root that wires the feed store and the HTTP server together.
//!
//! ## Responsibilities
//! - Load configuration (`livefeed.toml`, env vars)
//! - Initialise `tracing` with the configured filter
//! - Build the arrival hub and the selected log store
//!   (in-memory realtime tree or `SQLite` document collection)
//! - Apply the anonymous writer policy
//! - Build the axum router and serve it
//! - Shut down gracefully on Ctrl-C
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use livefeed_adapter_http_axum::router;
use livefeed_adapter_http_axum::state::{AppState, FeedCatalog};
use livefeed_adapter_realtime_memory::RealtimeLogStore;
use livefeed_app::arrival_hub::ArrivalHub;
use livefeed_domain::feed::CHAT_WINDOW;
use livefeed_domain::mirror::WindowSize;

use crate::config::{Config, StoreBackend};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    let feeds = FeedCatalog::new(config.feed_specs()?, WindowSize::new(CHAT_WINDOW)?);
    let hub = Arc::new(ArrivalHub::new(config.store.hub_capacity));

    let anonymous = config.identity.anonymous;

    let app = match config.store.backend {
        StoreBackend::Realtime => router::build(
            AppState::new(RealtimeLogStore::new(hub), feeds).with_anonymous_writers(anonymous),
        ),
        StoreBackend::Document => {
            let db = livefeed_adapter_storage_sqlite_sqlx::Config {
                database_url: config.store.url.clone(),
            }
            .build()
            .await?;
            router::build(AppState::new(db.log_store(hub), feeds).with_anonymous_writers(anonymous))
        }
    };

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(address = %bind_addr, backend = %config.store.backend, "livefeedd listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("livefeedd stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("received interrupt, shutting down"),
        Err(err) => tracing::warn!(%err, "unable to listen for interrupt, shutting down"),
    }
}
