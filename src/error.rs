use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::page_range::SelectionError;

/// Error type for every document operation and HTTP handler
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("{0}")]
    Selection(#[from] SelectionError),

    #[error("Invalid range. Document has {page_count} pages.")]
    InvalidRange { page_count: u32 },

    #[error("{message}")]
    InvalidRequest { message: String },

    #[error("Upload too large: {message}")]
    PayloadTooLarge { message: String },

    #[error("Incorrect password")]
    IncorrectPassword,

    #[error("Could not read PDF: {0}")]
    UnreadablePdf(#[source] lopdf::Error),

    #[error("PDF operation failed: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("Text extraction failed: {message}")]
    TextExtraction { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl ServiceError {
    pub fn invalid_request(message: impl Into<String>) -> Self {
        ServiceError::InvalidRequest {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ServiceError::Internal {
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Selection(_)
            | ServiceError::InvalidRange { .. }
            | ServiceError::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
            ServiceError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ServiceError::IncorrectPassword => StatusCode::FORBIDDEN,
            ServiceError::UnreadablePdf(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServiceError::Pdf(_)
            | ServiceError::TextExtraction { .. }
            | ServiceError::Io(_)
            | ServiceError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            ServiceError::Selection(SelectionError::OutOfRange { .. })
            | ServiceError::Selection(SelectionError::NoPages) => "invalid_selection",
            ServiceError::Selection(_) => "invalid_page_expression",
            ServiceError::InvalidRange { .. } => "invalid_range",
            ServiceError::InvalidRequest { .. } => "invalid_request",
            ServiceError::PayloadTooLarge { .. } => "payload_too_large",
            ServiceError::IncorrectPassword => "incorrect_password",
            ServiceError::UnreadablePdf(_) => "unreadable_pdf",
            ServiceError::Pdf(_) => "pdf_error",
            ServiceError::TextExtraction { .. } => "text_extraction_error",
            ServiceError::Io(_) => "io_error",
            ServiceError::Internal { .. } => "internal_error",
        }
    }
}

/// Error body; `detail` keeps the shape existing web clients already read.
#[derive(Serialize)]
pub struct ErrorResponse {
    pub detail: String,
    pub code: &'static str,
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }

        let response = ErrorResponse {
            detail: self.to_string(),
            code: self.error_code(),
        };

        (status, Json(response)).into_response()
    }
}

/// Result type alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_are_4xx() {
        let err = ServiceError::from(SelectionError::InvalidToken {
            token: "abc".to_string(),
        });
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), "invalid_page_expression");

        let err = ServiceError::InvalidRange { page_count: 5 };
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Invalid range. Document has 5 pages.");
    }

    #[test]
    fn test_internal_errors_are_5xx() {
        let err = ServiceError::internal("worker panicked");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
