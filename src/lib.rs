pub mod auth;
pub mod clients;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::{routing::get, Router};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::clients::{
    DatastoreClient, MemoryQueue, PubSubClient, SqliteStore, TokenSource, VisitPublisher, VisitStore,
};
use crate::config::{Config, Endpoint, QueueBackend, StoreBackend};

/// Shared, read-only handles used by every request.
#[derive(Clone)]
pub struct AppState {
    pub publisher: Arc<dyn VisitPublisher>,
    pub store: Arc<dyn VisitStore>,
    pub topic: Arc<str>,
    pub namespace: Arc<str>,
    pub call_timeout: Duration,
}

impl AppState {
    /// Construct the queue and store clients selected by `config`, once,
    /// for the lifetime of the process.
    pub async fn connect(config: &Config) -> Result<Self, anyhow::Error> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        let tokens = Arc::new(TokenSource::metadata(http.clone(), &config.metadata_host));
        let tokens_for = |endpoint: &Endpoint| endpoint.authenticated.then(|| tokens.clone());

        let publisher: Arc<dyn VisitPublisher> = match config.queue {
            QueueBackend::PubSub => {
                tracing::info!("Publishing to Pub/Sub at {}", config.pubsub.base);
                Arc::new(PubSubClient::new(
                    http.clone(),
                    config.pubsub.base.clone(),
                    config.project_id.clone(),
                    tokens_for(&config.pubsub),
                ))
            }
            QueueBackend::Memory => {
                tracing::warn!("Using in-memory queue; published visits are not delivered");
                Arc::new(MemoryQueue::new())
            }
        };

        let store: Arc<dyn VisitStore> = match config.store {
            StoreBackend::Datastore => {
                tracing::info!("Saving to Datastore at {}", config.datastore.base);
                Arc::new(DatastoreClient::new(
                    http.clone(),
                    config.datastore.base.clone(),
                    config.project_id.clone(),
                    tokens_for(&config.datastore),
                ))
            }
            StoreBackend::Sqlite => {
                tracing::info!("Saving to SQLite at {}", config.database_url);
                Arc::new(SqliteStore::new(db::init_pool(&config.database_url).await?))
            }
        };

        Ok(Self {
            publisher,
            store,
            topic: config.topic_id.as_str().into(),
            namespace: config.namespace.as_str().into(),
            call_timeout: config.request_timeout,
        })
    }
}

async fn health() -> &'static str {
    "ok"
}

/// Build the full Axum application router.
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(routes::submit::router())
        .merge(routes::push::router())
        .layer(
            TraceLayer::new_for_http()
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}
