//! Application error types with HTTP status conversion.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// Application-level errors for billgraph.
#[derive(Error, Debug)]
pub enum AppError {
    // Source errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Unsupported record source '{path}': {reason}")]
    UnsupportedSource { path: String, reason: String },

    #[error("Record source not configured. Pass --source or set source.path.")]
    SourceNotConfigured,

    // Graph document errors
    #[error("Invalid node-link document: {0}")]
    InvalidDocument(String),

    // Query errors
    #[error("Bill not found: {0}")]
    BillNotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    // Config errors
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

impl AppError {
    /// Stable machine-readable code for API clients.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Io(_) => "IO_ERROR",
            AppError::Json(_) => "JSON_ERROR",
            AppError::Csv(_) => "CSV_ERROR",
            AppError::UnsupportedSource { .. } => "UNSUPPORTED_SOURCE",
            AppError::SourceNotConfigured => "SOURCE_NOT_CONFIGURED",
            AppError::InvalidDocument(_) => "INVALID_DOCUMENT",
            AppError::BillNotFound(_) => "BILL_NOT_FOUND",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Config(_) => "CONFIG_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BillNotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }
        let body = serde_json::json!({
            "error": self.code(),
            "message": self.to_string(),
        });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_404() {
        let err = AppError::BillNotFound("99".to_string());
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.code(), "BILL_NOT_FOUND");
        assert_eq!(err.to_string(), "Bill not found: 99");
    }

    #[test]
    fn test_source_errors_are_internal() {
        let err = AppError::SourceNotConfigured;
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
