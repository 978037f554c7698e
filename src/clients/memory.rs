use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use super::VisitPublisher;
use crate::error::ServiceError;

const DEFAULT_RETAINED: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedMessage {
    pub id: String,
    pub topic: String,
    pub data: Vec<u8>,
}

/// Queue that keeps the most recent published messages in process.
/// Nothing is delivered anywhere; used for local runs and tests.
#[derive(Debug)]
pub struct MemoryQueue {
    retained: usize,
    messages: Mutex<VecDeque<PublishedMessage>>,
}

impl Default for MemoryQueue {
    fn default() -> Self {
        Self::with_limit(DEFAULT_RETAINED)
    }
}

impl MemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep at most `retained` messages, dropping the oldest first.
    pub fn with_limit(retained: usize) -> Self {
        Self {
            retained: retained.max(1),
            messages: Mutex::new(VecDeque::new()),
        }
    }

    pub fn published(&self) -> Vec<PublishedMessage> {
        self.log().iter().cloned().collect()
    }

    // A push never leaves the log half-written, so a poisoned lock still
    // guards consistent data.
    fn log(&self) -> MutexGuard<'_, VecDeque<PublishedMessage>> {
        self.messages.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl VisitPublisher for MemoryQueue {
    async fn publish(&self, topic: &str, data: Vec<u8>) -> Result<String, ServiceError> {
        let id = Uuid::new_v4().to_string();
        debug!(topic, id = %id, size_bytes = data.len(), "Queued message in memory");

        let mut log = self.log();
        if log.len() == self.retained {
            log.pop_front();
        }
        log.push_back(PublishedMessage {
            id: id.clone(),
            topic: topic.to_string(),
            data,
        });

        Ok(id)
    }
}
