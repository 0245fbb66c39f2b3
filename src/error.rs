use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::provider::weatherapi::ProviderError;

/// Client-facing failures. Every message is a short, displayable string;
/// nothing upstream-internal leaks past this boundary except the provider's
/// own human-readable message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("query parameter is required")]
    MissingInput,
    #[error("weather service API key is not configured")]
    MissingCredential,
    #[error("{0}")]
    UpstreamRejected(String),
    #[error("unable to reach weather service")]
    UpstreamUnreachable,
    #[error("too many requests")]
    RateLimited(u64),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl From<ProviderError> for ApiError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::MissingKey => ApiError::MissingCredential,
            ProviderError::Rejected(message) => ApiError::UpstreamRejected(message),
            ProviderError::Unreachable => ApiError::UpstreamUnreachable,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::MissingInput => StatusCode::BAD_REQUEST,
            ApiError::MissingCredential => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::UpstreamRejected(_) | ApiError::UpstreamUnreachable => {
                StatusCode::BAD_GATEWAY
            }
            ApiError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
        };
        let body = Json(ErrorBody {
            error: self.to_string(),
        });
        match self {
            ApiError::RateLimited(retry_after_secs) => (
                status,
                [(header::RETRY_AFTER, retry_after_secs.to_string())],
                body,
            )
                .into_response(),
            _ => (status, body).into_response(),
        }
    }
}
