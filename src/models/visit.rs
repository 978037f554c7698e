use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One observed visit. Serialized as `{"Timestamp","UserIP","UserEmail"}`
/// both on the queue and in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visit {
    #[serde(rename = "Timestamp")]
    timestamp: DateTime<Utc>,
    #[serde(rename = "UserIP")]
    user_ip: String,
    #[serde(rename = "UserEmail")]
    user_email: String,
}

impl Visit {
    pub fn new(user_email: String, user_ip: String) -> Self {
        Self::at(Utc::now(), user_email, user_ip)
    }

    pub fn at(timestamp: DateTime<Utc>, user_email: String, user_ip: String) -> Self {
        Self {
            timestamp,
            user_ip,
            user_email,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn user_ip(&self) -> &str {
        &self.user_ip
    }

    /// Unique key of the record in the store.
    pub fn user_email(&self) -> &str {
        &self.user_email
    }

    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}
