use std::sync::Arc;

use async_trait::async_trait;
use chrono::SecondsFormat;
use serde_json::{json, Value};
use url::Url;

use super::{send_json, TokenSource};
use crate::clients::VisitStore;
use crate::error::ServiceError;
use crate::models::Visit;

/// Writes visits as Datastore entities of kind `namespace`, named by email.
pub struct DatastoreClient {
    http: reqwest::Client,
    endpoint: Url,
    project_id: String,
    tokens: Option<Arc<TokenSource>>,
}

impl DatastoreClient {
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

    fn commit_url(&self) -> Result<Url, ServiceError> {
        Ok(self.endpoint.join(&format!("v1/projects/{}:commit", self.project_id))?)
    }
}

fn upsert_body(project_id: &str, kind: &str, name: &str, visit: &Visit) -> Value {
    json!({
        "mode": "NON_TRANSACTIONAL",
        "mutations": [{
            "upsert": {
                "key": {
                    "partitionId": { "projectId": project_id },
                    "path": [{ "kind": kind, "name": name }]
                },
                "properties": {
                    "Timestamp": {
                        "timestampValue": visit.timestamp().to_rfc3339_opts(SecondsFormat::AutoSi, true)
                    },
                    "UserIP": { "stringValue": visit.user_ip() },
                    "UserEmail": { "stringValue": visit.user_email() }
                }
            }
        }]
    })
}

#[async_trait]
impl VisitStore for DatastoreClient {
    async fn put(&self, namespace: &str, key: &str, visit: &Visit) -> Result<(), ServiceError> {
        let request = self
            .http
            .post(self.commit_url()?)
            .json(&upsert_body(&self.project_id, namespace, key, visit));

        let _: Value = send_json(request, self.tokens.as_ref()).await?;
        Ok(())
    }
}
