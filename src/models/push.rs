use base64::{engine::general_purpose::STANDARD, Engine};
use serde::Deserialize;

use super::Visit;
use crate::error::AppError;

/// Body of a push delivery from the queue service.
#[derive(Debug, Deserialize)]
pub struct PushEnvelope {
    pub message: PushMessage,
    #[serde(default)]
    pub subscription: String,
}

#[derive(Debug, Deserialize)]
pub struct PushMessage {
    /// Standard base64 of the published bytes.
    #[serde(default)]
    pub data: String,
    #[serde(default)]
    pub id: String,
    #[serde(default, rename = "messageId")]
    pub message_id: Option<String>,
    #[serde(default, rename = "publishTime")]
    pub publish_time: Option<String>,
}

impl PushEnvelope {
    pub fn from_slice(body: &[u8]) -> Result<Self, AppError> {
        Ok(serde_json::from_slice(body)?)
    }

    /// Decode the visit carried in `message.data`.
    pub fn visit(&self) -> Result<Visit, AppError> {
        let bytes = STANDARD.decode(self.message.data.as_bytes())?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub fn delivery_id(&self) -> &str {
        match &self.message.message_id {
            Some(id) if self.message.id.is_empty() => id.as_str(),
            _ => self.message.id.as_str(),
        }
    }
}
