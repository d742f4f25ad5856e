use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Trakt API error: {status}")]
    Upstream { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("User \"{0}\" not found on Trakt")]
    UserNotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::Upstream { status, body } => (
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
                json!({
                    "error": self.to_string(),
                    "details": body,
                }),
            ),
            AppError::UserNotFound(_) => (
                StatusCode::NOT_FOUND,
                json!({
                    "error": self.to_string(),
                }),
            ),
            AppError::HttpClient(_)
            | AppError::Config(_)
            | AppError::Io(_)
            | AppError::Serialization(_)
            | AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({
                    "error": "Failed to fetch Trakt data",
                    "message": self.to_string(),
                }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
