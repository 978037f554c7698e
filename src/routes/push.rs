use axum::{body::Bytes, extract::State, http::StatusCode, routing::post, Router};

use super::within_deadline;
use crate::error::AppError;
use crate::models::PushEnvelope;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/push", post(push))
}

/// Any non-2xx reply makes the queue redeliver the message later.
async fn push(State(state): State<AppState>, body: Bytes) -> Result<StatusCode, AppError> {
    let envelope = PushEnvelope::from_slice(&body)?;
    let visit = envelope.visit()?;
    tracing::info!(delivery_id = envelope.delivery_id(), "Received {visit:?}");

    within_deadline(
        state.call_timeout,
        state.store.put(&state.namespace, visit.user_email(), &visit),
    )
    .await
    .map_err(AppError::store)?;
    tracing::info!("Saved {visit:?}");

    Ok(StatusCode::OK)
}
