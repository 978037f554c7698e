#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use axum::Router;
use base64::{engine::general_purpose::STANDARD, engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use http_body_util::BodyExt;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;
use visit_relay::clients::{MemoryQueue, SqliteStore, VisitPublisher, VisitStore};
use visit_relay::error::ServiceError;
use visit_relay::models::Visit;
use visit_relay::{build_app, AppState};

pub const TOPIC: &str = "visits";
pub const NAMESPACE: &str = "vpcsc-demo";

pub struct TestApp {
    pub router: Router,
    pub queue: Arc<MemoryQueue>,
    pub store: SqliteStore,
}

impl TestApp {
    pub async fn new() -> Self {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .unwrap()
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .expect("Failed to create in-memory SQLite pool");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");

        let queue = Arc::new(MemoryQueue::new());
        let store = SqliteStore::new(pool);
        let router = build_app(state(queue.clone(), Arc::new(store.clone()), Duration::from_secs(5)));

        Self { router, queue, store }
    }

    /// Send a request through the app and return the response.
    pub async fn request(&self, req: Request<Body>) -> Response {
        send(&self.router, req).await
    }

    pub async fn submit(&self, authorization: Option<&str>, forwarded_for: Option<&str>) -> Response {
        self.request(submit_request(authorization, forwarded_for)).await
    }

    pub async fn push(&self, body: &str) -> Response {
        self.request(push_request(body)).await
    }

    pub async fn stored(&self, email: &str) -> Option<Visit> {
        self.store.get(NAMESPACE, email).await.unwrap()
    }
}

pub fn state(
    publisher: Arc<dyn VisitPublisher>,
    store: Arc<dyn VisitStore>,
    call_timeout: Duration,
) -> AppState {
    AppState {
        publisher,
        store,
        topic: TOPIC.into(),
        namespace: NAMESPACE.into(),
        call_timeout,
    }
}

pub async fn send(router: &Router, req: Request<Body>) -> Response {
    tower::ServiceExt::oneshot(router.clone(), req).await.unwrap()
}

pub fn submit_request(authorization: Option<&str>, forwarded_for: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri("/submit").method("POST");
    if let Some(authorization) = authorization {
        builder = builder.header("authorization", authorization);
    }
    if let Some(ip) = forwarded_for {
        builder = builder.header("x-forwarded-for", ip);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn push_request(body: &str) -> Request<Body> {
    Request::builder()
        .uri("/push")
        .method("POST")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// `bearer` header for an unsigned token carrying `{"email": email}`.
pub fn bearer_for(email: &str) -> String {
    let claims = serde_json::json!({ "email": email, "sub": "1234" }).to_string();
    format!("bearer aaa.{}.sig", URL_SAFE_NO_PAD.encode(claims))
}

/// Push delivery body wrapping `data` the way the queue service does.
pub fn push_body(data: &[u8], id: &str) -> String {
    serde_json::json!({
        "message": { "data": STANDARD.encode(data), "id": id },
        "subscription": "projects/demo/subscriptions/visits-push"
    })
    .to_string()
}

/// Read the full response body as a String.
pub async fn body_string(resp: Response) -> String {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Publisher or store whose service is down.
pub struct Unavailable;

#[async_trait]
impl VisitPublisher for Unavailable {
    async fn publish(&self, _topic: &str, _data: Vec<u8>) -> Result<String, ServiceError> {
        Err(ServiceError::Status {
            status: 503,
            body: "backend unavailable".into(),
        })
    }
}

#[async_trait]
impl VisitStore for Unavailable {
    async fn put(&self, _namespace: &str, _key: &str, _visit: &Visit) -> Result<(), ServiceError> {
        Err(ServiceError::Status {
            status: 503,
            body: "backend unavailable".into(),
        })
    }
}

/// Publisher or store that never answers in time.
pub struct Stalled;

#[async_trait]
impl VisitPublisher for Stalled {
    async fn publish(&self, _topic: &str, _data: Vec<u8>) -> Result<String, ServiceError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok("late".into())
    }
}

#[async_trait]
impl VisitStore for Stalled {
    async fn put(&self, _namespace: &str, _key: &str, _visit: &Visit) -> Result<(), ServiceError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(())
    }
}
