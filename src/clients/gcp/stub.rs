//! Local HTTP server standing in for Google endpoints in tests.

use std::sync::{Arc, Mutex};

use axum::{
    body::Bytes,
    http::{header, HeaderMap, StatusCode, Uri},
    Router,
};
use tokio::net::TcpListener;
use url::Url;

#[derive(Debug, Clone)]
pub struct Recorded {
    pub path: String,
    pub authorization: Option<String>,
    pub metadata_flavor: Option<String>,
    pub body: Vec<u8>,
}

impl Recorded {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

pub struct StubServer {
    pub base: Url,
    pub host: String,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl StubServer {
    /// Serve every request with `respond(path)` on an ephemeral local port.
    pub async fn start<F>(respond: F) -> Self
    where
        F: Fn(&str) -> (StatusCode, String) + Send + Sync + 'static,
    {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let respond = Arc::new(respond);
        let log = requests.clone();

        let app = Router::new().fallback(move |uri: Uri, headers: HeaderMap, body: Bytes| {
            let log = log.clone();
            let respond = respond.clone();
            async move {
                let header_value = |name: &str| {
                    headers
                        .get(name)
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string)
                };
                log.lock().unwrap().push(Recorded {
                    path: uri.path().to_string(),
                    authorization: header_value("authorization"),
                    metadata_flavor: header_value("metadata-flavor"),
                    body: body.to_vec(),
                });
                let (status, reply) = respond(uri.path());
                (status, [(header::CONTENT_TYPE, "application/json")], reply)
            }
        });

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base: Url::parse(&format!("http://{addr}/")).unwrap(),
            host: addr.to_string(),
            requests,
        }
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }
}
