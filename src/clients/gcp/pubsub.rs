use std::sync::Arc;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use url::Url;

use super::{send_json, TokenSource};
use crate::clients::VisitPublisher;
use crate::error::ServiceError;

#[derive(Serialize)]
struct PublishRequest {
    messages: Vec<OutgoingMessage>,
}

#[derive(Serialize)]
struct OutgoingMessage {
    data: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PublishResponse {
    #[serde(default)]
    message_ids: Vec<String>,
}

/// Publishes to a Pub/Sub topic through `topics.publish`.
pub struct PubSubClient {
    http: reqwest::Client,
    endpoint: Url,
    project_id: String,
    tokens: Option<Arc<TokenSource>>,
}

impl PubSubClient {
    pub fn new(
        http: reqwest::Client,
        endpoint: Url,
        project_id: String,
        tokens: Option<Arc<TokenSource>>,
    ) -> Self {
        Self {
            http,
            endpoint,
            project_id,
            tokens,
        }
    }

    fn publish_url(&self, topic: &str) -> Result<Url, ServiceError> {
        Ok(self
            .endpoint
            .join(&format!("v1/projects/{}/topics/{}:publish", self.project_id, topic))?)
    }
}

fn publish_request(data: &[u8]) -> PublishRequest {
    PublishRequest {
        messages: vec![OutgoingMessage {
            data: STANDARD.encode(data),
        }],
    }
}

#[async_trait]
impl VisitPublisher for PubSubClient {
    async fn publish(&self, topic: &str, data: Vec<u8>) -> Result<String, ServiceError> {
        let request = self
            .http
            .post(self.publish_url(topic)?)
            .json(&publish_request(&data));

        let reply: PublishResponse = send_json(request, self.tokens.as_ref()).await?;
        reply
            .message_ids
            .into_iter()
            .next()
            .ok_or_else(|| ServiceError::InvalidResponse("publish returned no message id".into()))
    }
}
