use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Failure talking to the queue or the document store.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("service responded with {status}: {body}")]
    Status { status: u16, body: String },

    #[error("deadline of {0:?} exceeded")]
    Timeout(std::time::Duration),

    #[error("could not obtain access token: {0}")]
    Auth(String),

    #[error("invalid endpoint: {0}")]
    Endpoint(#[from] url::ParseError),

    #[error("unexpected response: {0}")]
    InvalidResponse(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("malformed credential: {0}")]
    MalformedCredential(&'static str),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("credential has no email claim")]
    MissingClaim,

    #[error("{service} unavailable: {source}")]
    ExternalService {
        service: &'static str,
        #[source]
        source: ServiceError,
    },
}

impl AppError {
    pub fn queue(source: ServiceError) -> Self {
        AppError::ExternalService { service: "queue", source }
    }

    pub fn store(source: ServiceError) -> Self {
        AppError::ExternalService { service: "store", source }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MalformedCredential(_) | AppError::Decode(_) | AppError::MissingClaim => {
                StatusCode::BAD_REQUEST
            }
            AppError::ExternalService {
                source: ServiceError::Timeout(_),
                ..
            } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::ExternalService { .. } => StatusCode::BAD_GATEWAY,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Decode(e.to_string())
    }
}

impl From<base64::DecodeError> for AppError {
    fn from(e: base64::DecodeError) -> Self {
        AppError::Decode(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            AppError::ExternalService { service, .. } => {
                tracing::error!("{self}");
                (status, format!("{service} unavailable")).into_response()
            }
            _ => {
                tracing::warn!("rejected request: {self}");
                (status, self.to_string()).into_response()
            }
        }
    }
}
