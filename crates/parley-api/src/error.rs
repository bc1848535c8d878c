use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use parley_llm::UpstreamError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Message is required and must be a string")]
    InvalidMessage,

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Request body too large")]
    PayloadTooLarge,

    #[error("Endpoint not found")]
    NotFound,

    #[error("Request timeout. Please try again.")]
    Timeout,

    #[error("Upstream completion error: {0}")]
    Upstream(#[from] UpstreamError),

    #[error("Something went wrong!")]
    Internal,
}

impl ApiError {
    /// Status and client-facing text. Upstream failures are checked in
    /// precedence order: 401, 429, timeout, everything else.
    fn parts(&self) -> (StatusCode, String) {
        match self {
            ApiError::InvalidMessage | ApiError::BadRequest(_) => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            ApiError::PayloadTooLarge => (StatusCode::PAYLOAD_TOO_LARGE, self.to_string()),
            ApiError::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            ApiError::Upstream(UpstreamError::Unauthorized { .. }) => (
                StatusCode::UNAUTHORIZED,
                "Invalid API key or unauthorized access".to_string(),
            ),
            ApiError::Upstream(UpstreamError::RateLimited { .. }) => (
                StatusCode::TOO_MANY_REQUESTS,
                "Rate limit exceeded. Please try again later.".to_string(),
            ),
            ApiError::Upstream(UpstreamError::Timeout(_)) => (
                StatusCode::REQUEST_TIMEOUT,
                "Request timeout. Please try again.".to_string(),
            ),
            ApiError::Upstream(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error. Please try again later.".to_string(),
            ),
            ApiError::Timeout => (StatusCode::REQUEST_TIMEOUT, self.to_string()),
            ApiError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        self.parts().0
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.parts();

        match &self {
            ApiError::Upstream(e) => {
                tracing::error!(status = %status, "Error calling completion endpoint: {}", e);
            }
            ApiError::Internal => {
                tracing::error!("Internal error: {}", self);
            }
            _ => {
                tracing::debug!(status = %status, "Rejected request: {}", self);
            }
        }

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
