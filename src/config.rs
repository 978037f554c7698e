use std::{fmt::Display, str::FromStr, time::Duration};

use thiserror::Error;
use tracing::info;
use url::Url;

const PUBSUB_ENDPOINT: &str = "https://pubsub.googleapis.com/";
const DATASTORE_ENDPOINT: &str = "https://datastore.googleapis.com/";
const METADATA_HOST: &str = "metadata.google.internal";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueBackend {
    PubSub,
    Memory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Datastore,
    Sqlite,
}

/// Where a Google API lives and whether it needs an access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub base: Url,
    pub authenticated: bool,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub project_id: String,
    pub topic_id: String,
    pub port: u16,
    pub namespace: String,
    pub request_timeout: Duration,
    pub queue: QueueBackend,
    pub store: StoreBackend,
    pub database_url: String,
    pub pubsub: Endpoint,
    pub datastore: Endpoint,
    pub metadata_host: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let queue = match var("QUEUE_BACKEND").as_deref() {
            None | Some("pubsub") => QueueBackend::PubSub,
            Some("memory") => QueueBackend::Memory,
            Some(other) => return Err(invalid("QUEUE_BACKEND", format!("unknown backend {other:?}"))),
        };
        let store = match var("STORE_BACKEND").as_deref() {
            None | Some("datastore") => StoreBackend::Datastore,
            Some("sqlite") => StoreBackend::Sqlite,
            Some(other) => return Err(invalid("STORE_BACKEND", format!("unknown backend {other:?}"))),
        };
        let needs_project = queue == QueueBackend::PubSub || store == StoreBackend::Datastore;

        let project_id = match var("GOOGLE_PROJECT") {
            Some(project) => project,
            None if needs_project => return Err(ConfigError::Missing("GOOGLE_PROJECT")),
            None => "local".to_string(),
        };
        let topic_id = match var("TOPIC") {
            Some(topic) => topic,
            None if queue == QueueBackend::PubSub => return Err(ConfigError::Missing("TOPIC")),
            None => "visits".to_string(),
        };

        let port = parse_or("PORT", var("PORT"), 8080u16)?;
        let timeout_secs = parse_or("REQUEST_TIMEOUT_SECS", var("REQUEST_TIMEOUT_SECS"), 10u64)?;
        if timeout_secs == 0 {
            return Err(invalid("REQUEST_TIMEOUT_SECS", "must be at least 1".into()));
        }

        Ok(Self {
            project_id,
            topic_id,
            port,
            namespace: var("VISIT_NAMESPACE").unwrap_or_else(|| "vpcsc-demo".to_string()),
            request_timeout: Duration::from_secs(timeout_secs),
            queue,
            store,
            database_url: var("DATABASE_URL").unwrap_or_else(|| "sqlite:data/visits.db".to_string()),
            pubsub: endpoint("PUBSUB_EMULATOR_HOST", var("PUBSUB_EMULATOR_HOST"), PUBSUB_ENDPOINT)?,
            datastore: endpoint(
                "DATASTORE_EMULATOR_HOST",
                var("DATASTORE_EMULATOR_HOST"),
                DATASTORE_ENDPOINT,
            )?,
            metadata_host: var("GCE_METADATA_HOST").unwrap_or_else(|| METADATA_HOST.to_string()),
        })
    }
}

fn invalid(key: &'static str, reason: String) -> ConfigError {
    ConfigError::Invalid { key, reason }
}

fn parse_or<T>(key: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr + Display,
    T::Err: Display,
{
    match value {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| invalid(key, e.to_string())),
        None => {
            info!("Defaulting {key} to {default}");
            Ok(default)
        }
    }
}

fn endpoint(key: &'static str, emulator: Option<String>, default: &str) -> Result<Endpoint, ConfigError> {
    let (raw, authenticated) = match emulator {
        Some(host) => (format!("http://{}/", host.trim()), false),
        None => (default.to_string(), true),
    };
    let base = Url::parse(&raw).map_err(|e| invalid(key, e.to_string()))?;
    Ok(Endpoint { base, authenticated })
}
