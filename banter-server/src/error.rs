//! Error types for banter-server
//!
//! `Error` is the library error used by the audio, export and TTS modules.
//! `ApiError` is what HTTP handlers return; it maps onto status codes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Main error type for banter-server
#[derive(Error, Debug)]
pub enum Error {
    /// Audio decoding errors
    #[error("Audio decode error: {0}")]
    Decode(String),

    /// Sample rate conversion errors
    #[error("Resample error: {0}")]
    Resample(String),

    /// MP3 encoding errors
    #[error("Audio encode error: {0}")]
    Encode(String),

    /// Speech synthesis provider errors
    #[error("Speech synthesis error: {0}")]
    Synthesis(String),

    /// Invalid caller-supplied argument
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Sample data does not match the format it is being combined with
    #[error("Audio format error: {0}")]
    Format(String),
}

/// Convenience Result type using banter-server Error
pub type Result<T> = std::result::Result<T, Error>;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("{0}")]
    BadRequest(String),

    /// Internal server error (500)
    #[error("{0}")]
    Internal(String),
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg),
        };

        // `detail` is the key the editor reads error text from
        let body = Json(json!({
            "detail": message,
            "code": error_code,
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_maps_to_bad_request() {
        let api: ApiError = Error::InvalidInput("bad".to_string()).into();
        assert!(matches!(api, ApiError::BadRequest(ref m) if m == "bad"));
    }

    #[test]
    fn test_io_maps_to_internal() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let api: ApiError = Error::Io(io).into();
        match api {
            ApiError::Internal(msg) => assert!(msg.contains("denied")),
            other => panic!("unexpected mapping: {:?}", other),
        }
    }

    #[test]
    fn test_status_codes() {
        let resp = ApiError::BadRequest("x".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = ApiError::Internal("x".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
