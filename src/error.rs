// PromptReel Error Taxonomy
// Copyright (c) 2026 Xing_The_Creator | PromptReel

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Convenience result type used across the library.
pub type GenResult<T> = Result<T, GenError>;

/// Everything that can go wrong between a prompt and a stored video.
#[derive(thiserror::Error, Debug)]
pub enum GenError {
    /// The prompt or a request parameter was rejected.
    #[error("validation error: {0}")]
    Validation(String),

    #[error("config error: {0}")]
    Config(String),

    /// A hosted image API failed, timed out or returned garbage.
    #[error("provider error: {0}")]
    Provider(String),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("encode error: {0}")]
    Encode(String),

    #[error("audio error: {0}")]
    Audio(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl GenError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn provider(msg: impl Into<String>) -> Self {
        Self::Provider(msg.into())
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    pub fn audio(msg: impl Into<String>) -> Self {
        Self::Audio(msg.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// JSON body returned by the `/api` routes on failure.
#[derive(Debug, Clone, Serialize)]
pub struct ApiErrorResponse {
    pub error: String,
    pub message: String,
    pub code: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("[SERVER] {}", self);
        }
        let body = ApiErrorResponse {
            error: status
                .canonical_reason()
                .unwrap_or("Error")
                .to_string(),
            message: self.to_string(),
            code: self.code().to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(GenError::validation("x")
            .to_string()
            .contains("validation error:"));
        assert!(GenError::provider("x").to_string().contains("provider error:"));
        assert!(GenError::encode("x").to_string().contains("encode error:"));
    }

    #[test]
    fn api_errors_map_to_status_and_code() {
        let api = ApiError::Forbidden("path traversal".into());
        assert_eq!(api.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(api.code(), "FORBIDDEN");

        let api: ApiError = sqlx::Error::PoolClosed.into();
        assert_eq!(api.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn other_preserves_source() {
        let err = GenError::Other(anyhow::anyhow!("boom"));
        assert!(err.to_string().contains("boom"));
    }
}
