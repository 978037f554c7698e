//! External collaborators: the message queue that carries visits and the
//! document store that keeps the latest visit per identity.

pub mod gcp;
pub mod memory;
pub mod sqlite;

use async_trait::async_trait;

use crate::error::ServiceError;
use crate::models::Visit;

pub use gcp::{DatastoreClient, PubSubClient, TokenSource};
pub use memory::MemoryQueue;
pub use sqlite::SqliteStore;

#[async_trait]
pub trait VisitPublisher: Send + Sync {
    /// Publish `data` to `topic` and wait for the service to accept it.
    /// Returns the delivery id assigned by the queue.
    async fn publish(&self, topic: &str, data: Vec<u8>) -> Result<String, ServiceError>;
}

#[async_trait]
pub trait VisitStore: Send + Sync {
    /// Write `visit` under `(namespace, key)`, replacing any earlier record.
    async fn put(&self, namespace: &str, key: &str, visit: &Visit) -> Result<(), ServiceError>;
}
