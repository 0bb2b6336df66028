//! Idea Board API Server
//!
//! A single-page board where visitors post short ideas, watch a live feed and
//! vote on entries. Ideas live in an external realtime database; this process
//! renders the board and relays reads, writes and subscriptions.
//! Uses hexagonal (ports & adapters) architecture for clean separation of concerns.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_governor::governor::GovernorConfigBuilder;
use tower_governor::key_extractor::PeerIpKeyExtractor;
use tower_governor::GovernorLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod adapters;
mod app;
mod config;
mod domain;
mod error;
mod feed;
mod handlers;

#[cfg(test)]
mod test_utils;

#[cfg(test)]
mod integration_tests;

use adapters::{FirebaseRecordStore, InMemoryRecordStore};
use app::{FeedService, IdeaService, PresenceService, SWEEP_INTERVAL};
use config::{Config, StoreBackend};
use domain::ports::RecordStore;
use feed::RelativeTimeFormatter;

/// Application state shared across all handlers
pub struct AppState<S>
where
    S: RecordStore,
{
    pub feed_service: Arc<FeedService<S>>,
    pub idea_service: Arc<IdeaService<S>>,
    pub presence_service: Arc<PresenceService>,
}

impl<S> Clone for AppState<S>
where
    S: RecordStore,
{
    fn clone(&self) -> Self {
        Self {
            feed_service: self.feed_service.clone(),
            idea_service: self.idea_service.clone(),
            presence_service: self.presence_service.clone(),
        }
    }
}

impl<S> AppState<S>
where
    S: RecordStore,
{
    pub fn new(store: Arc<S>, config: &Config) -> Self {
        Self {
            feed_service: Arc::new(FeedService::new(
                store.clone(),
                RelativeTimeFormatter::new(config.date_locale),
            )),
            idea_service: Arc::new(IdeaService::new(store, config.submission.clone())),
            presence_service: Arc::new(PresenceService::default()),
        }
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Build the router for a given store
pub fn build_router<S>(state: AppState<S>, rate_limit: bool) -> anyhow::Result<Router>
where
    S: RecordStore + 'static,
{
    // Writes: submissions, votes and heartbeats
    let mut write_routes = Router::new()
        .route("/ideas", post(handlers::submit_idea::<S>))
        .route("/ideas/:id/:vote", post(handlers::vote_idea::<S>))
        .route("/presence", post(handlers::heartbeat::<S>));

    if rate_limit {
        // 5 req/sec sustained, burst of 10
        let governor_config = Arc::new(
            GovernorConfigBuilder::default()
                .key_extractor(PeerIpKeyExtractor)
                .per_second(5)
                .burst_size(10)
                .finish()
                .context("Failed to build governor config")?,
        );
        write_routes = write_routes.layer(GovernorLayer {
            config: governor_config,
        });
    }

    let app = Router::new()
        .route("/health", get(health))
        .route("/", get(handlers::index::<S>))
        .route("/ideas", get(handlers::list_ideas::<S>))
        .route("/ideas/stream", get(handlers::stream_feed::<S>))
        .route("/presence", get(handlers::get_presence::<S>))
        .merge(write_routes)
        // Middleware
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

async fn serve<S>(store: Arc<S>, config: Config) -> anyhow::Result<()>
where
    S: RecordStore + 'static,
{
    let state = AppState::new(store, &config);

    // Initial load, so the first page render is not empty while the
    // subscription connects
    if let Err(e) = state.feed_service.refresh().await {
        tracing::warn!("Initial snapshot failed: {}", e);
    }
    tokio::spawn(state.feed_service.clone().run());
    let _sweeper = state
        .presence_service
        .clone()
        .spawn_sweeper(SWEEP_INTERVAL);

    let app = build_router(state, config.rate_limit_enabled)?;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("Server error")?;

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,ideaboard_api=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Idea Board API...");

    // Load configuration
    let config = Config::from_env()?;

    match config.store_backend {
        StoreBackend::Memory => {
            tracing::info!("Using in-memory record store");
            serve(Arc::new(InMemoryRecordStore::new()), config).await
        }
        StoreBackend::Firebase => {
            let url = config
                .firebase_url
                .clone()
                .context("FIREBASE_DATABASE_URL must be set")?;
            tracing::info!("Using Firebase record store at {}", url);
            let store = FirebaseRecordStore::new(
                url,
                config.ideas_path.clone(),
                config.firebase_auth.clone(),
            );
            serve(Arc::new(store), config).await
        }
    }
}
