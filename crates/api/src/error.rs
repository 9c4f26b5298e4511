use axum::{http::StatusCode, response::IntoResponse};

/// Failures surfaced to the webhook caller.
///
/// The platform only looks at the status code, so bodies are plain text and
/// mostly empty.
#[derive(Debug)]
pub enum AppError {
    /// Request body could not be decoded; the decoder message is returned.
    Decode(String),
    BadRequest(String),
    NotFound,
    /// An outbound call failed before a response was received.
    Upstream,
    Internal,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match self {
            AppError::Decode(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound => (StatusCode::NOT_FOUND, String::new()),
            AppError::Upstream | AppError::Internal => {
                (StatusCode::INTERNAL_SERVER_ERROR, String::new())
            }
        };

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
