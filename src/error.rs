use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

/// Errors surfaced by the board. The first four are user-facing validation
/// outcomes; their `Display` text is shown to the user as-is.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    MissingField(String),

    #[error("{0}")]
    InvalidFormat(String),

    #[error("Incorrect password.")]
    AuthFailure,

    #[error("{0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::MissingField(_) | AppError::InvalidFormat(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::AuthFailure => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Storage(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// True for errors caused by user input rather than the server.
    pub fn is_user_error(&self) -> bool {
        !matches!(self, AppError::Storage(_) | AppError::Internal(_))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_message = match self {
            AppError::Storage(ref msg) => {
                tracing::error!("Storage error: {}", msg);
                "Storage error occurred".to_string()
            }
            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal server error".to_string()
            }
            ref other => other.to_string(),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}
