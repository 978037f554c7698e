use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;

use super::within_deadline;
use crate::auth::BearerIdentity;
use crate::error::AppError;
use crate::models::Visit;
use crate::AppState;

const FORWARDED_FOR: &str = "x-forwarded-for";

#[derive(Serialize)]
struct Published {
    id: String,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/submit", get(submit).post(submit))
}

async fn submit(
    State(state): State<AppState>,
    BearerIdentity(email): BearerIdentity,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let ip = headers
        .get(FORWARDED_FOR)
        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
        .unwrap_or_default();
    tracing::info!("Get query from {ip}");

    let visit = Visit::new(email, ip);
    let data = visit.to_json()?;

    let id = within_deadline(state.call_timeout, state.publisher.publish(&state.topic, data))
        .await
        .map_err(AppError::queue)?;
    tracing::info!(topic = %state.topic, "Published message; msg ID: {id}");

    Ok((StatusCode::OK, Json(Published { id })))
}
