use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures visible to API clients. The messages are deliberately generic; the cause is only
/// logged.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Failed to fetch entries")]
    FetchEntries,
    #[error("Failed to create entry")]
    CreateEntry,
    #[error("Failed to reach generation service")]
    GenerationUnavailable,
}

/// Body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::FetchEntries | ApiError::CreateEntry => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::GenerationUnavailable => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status(),
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
