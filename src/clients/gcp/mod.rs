//! REST clients for Google Cloud Pub/Sub and Datastore.

mod auth;
mod datastore;
mod pubsub;
#[cfg(test)]
mod stub;

use std::sync::Arc;

use serde::de::DeserializeOwned;

pub use auth::TokenSource;
pub use datastore::DatastoreClient;
pub use pubsub::PubSubClient;

use crate::error::ServiceError;

/// Send a JSON request, attaching an access token when `tokens` is set,
/// and decode the JSON reply of a 2xx response.
async fn send_json<T: DeserializeOwned>(
    request: reqwest::RequestBuilder,
    tokens: Option<&Arc<TokenSource>>,
) -> Result<T, ServiceError> {
    let request = match tokens {
        Some(tokens) => request.bearer_auth(tokens.token().await?),
        None => request,
    };

    let resp = request.send().await?;
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ServiceError::Status {
            status: status.as_u16(),
            body,
        });
    }

    resp.json()
        .await
        .map_err(|e| ServiceError::InvalidResponse(e.to_string()))
}
