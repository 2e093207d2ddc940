//! Error handling for the catalog HTTP layer

use std::time::Duration;

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;
use uuid::Uuid;

/// Header carrying the id under which an error was logged.
pub const ERROR_ID_HEADER: &str = "x-error-id";

/// Application error types that map to plain-text HTTP responses.
///
/// The `message` of every variant is sent to the client verbatim, so callers
/// must escape any untrusted text before building one.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("not found: {message}")]
    NotFound { message: String },

    #[error("bad request: {message}")]
    BadRequest { message: String },

    #[error("payload too large: {message}")]
    PayloadTooLarge { message: String },

    #[error("too many requests: {message}")]
    TooManyRequests {
        message: String,
        retry_after: Duration,
    },

    #[error("internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl AppError {
    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Create a payload too large error
    pub fn payload_too_large(message: impl Into<String>) -> Self {
        Self::PayloadTooLarge {
            message: message.into(),
        }
    }

    /// Create a rate limit rejection
    pub fn too_many_requests(message: impl Into<String>, retry_after: Duration) -> Self {
        Self::TooManyRequests {
            message: message.into(),
            retry_after,
        }
    }

    /// Create an internal error. `message` goes to the client, `source` only to the log.
    pub fn internal(message: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self::Internal {
            message: message.into(),
            source: source.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::TooManyRequests { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let error_id = Uuid::new_v4();
        let status = self.status();

        let (message, retry_after) = match self {
            AppError::Internal { message, source } => {
                tracing::error!(
                    error_id = %error_id,
                    status_code = %status.as_u16(),
                    error = %format!("{source:#}"),
                    "request failed"
                );
                (message, None)
            }
            AppError::TooManyRequests {
                message,
                retry_after,
            } => {
                tracing::warn!(error_id = %error_id, status_code = %status.as_u16(), "request rate limited");
                (message, Some(retry_after))
            }
            AppError::NotFound { message }
            | AppError::BadRequest { message }
            | AppError::PayloadTooLarge { message } => {
                tracing::info!(error_id = %error_id, status_code = %status.as_u16(), "request rejected");
                (message, None)
            }
        };

        let mut response = (status, message).into_response();
        let headers = response.headers_mut();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        if let Ok(value) = HeaderValue::from_str(&error_id.to_string()) {
            headers.insert(ERROR_ID_HEADER, value);
        }
        if let Some(retry_after) = retry_after {
            // Round up so clients never retry inside the window.
            let seconds = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
            headers.insert(header::RETRY_AFTER, HeaderValue::from(seconds));
        }

        response
    }
}
