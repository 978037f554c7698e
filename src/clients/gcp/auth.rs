use std::time::Duration;

use serde::Deserialize;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

use crate::error::ServiceError;

const TOKEN_PATH: &str = "/computeMetadata/v1/instance/service-accounts/default/token";
const REFRESH_MARGIN: Duration = Duration::from_secs(60);

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: Instant,
}

impl CachedToken {
    fn is_fresh(&self, now: Instant) -> bool {
        now + REFRESH_MARGIN < self.expires_at
    }
}

/// OAuth access tokens for the default service account, fetched from the
/// metadata server and reused until shortly before they expire.
pub struct TokenSource {
    http: reqwest::Client,
    url: String,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenSource {
    pub fn metadata(http: reqwest::Client, host: &str) -> Self {
        Self {
            http,
            url: format!("http://{host}{TOKEN_PATH}"),
            cached: Mutex::new(None),
        }
    }

    pub async fn token(&self) -> Result<String, ServiceError> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = &*cached {
            if token.is_fresh(Instant::now()) {
                return Ok(token.value.clone());
            }
        }

        let resp = self
            .http
            .get(&self.url)
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .map_err(|e| ServiceError::Auth(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ServiceError::Auth(format!("metadata server responded with {status}")));
        }

        let body: TokenResponse = resp
            .json()
            .await
            .map_err(|e| ServiceError::Auth(e.to_string()))?;
        debug!(expires_in = body.expires_in, "Refreshed access token");

        let expires_at = Instant::now()
            .checked_add(Duration::from_secs(body.expires_in))
            .ok_or_else(|| ServiceError::Auth(format!("token lifetime {}s out of range", body.expires_in)))?;
        let token = CachedToken {
            value: body.access_token,
            expires_at,
        };
        let value = token.value.clone();
        *cached = Some(token);
        Ok(value)
    }
}
