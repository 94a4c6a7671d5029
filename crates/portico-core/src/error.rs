//! Error types for Portico.
//!
//! [`PorticoError`] covers the failure kinds this layer produces:
//! client-caused input validation failures (HTTP 400), server-authoring
//! response validation failures (HTTP 500), and internal faults such as a
//! chain composed without a terminal stage. Every error is converted to an
//! HTTP response inside the stage that detects it; nothing propagates to the
//! routing engine uncaught.

use crate::schema::SchemaIssues;
use crate::types::{Response, ResponseExt};
use http::StatusCode;
use thiserror::Error;

/// Standard error type for the route chain.
#[derive(Error, Debug)]
pub enum PorticoError {
    /// An input target failed validation. Client-caused, maps to 400.
    #[error("Validation error on {target}: {issues}")]
    Validation {
        /// Which input target failed.
        target: &'static str,
        /// The structured issues from the schema contract.
        #[source]
        issues: SchemaIssues,
    },

    /// The handler's response violated its declared schema. Server-authoring
    /// bug, maps to 500 with a fixed message; the cause stays internal.
    #[error("Response validation failed!")]
    ResponseValidation {
        /// The underlying validation failure, kept for diagnostics only.
        #[source]
        cause: Box<dyn std::error::Error + Send + Sync>,
    },

    /// An unexpected internal error.
    #[error("Internal error: {message}")]
    Internal {
        /// Human-readable error message.
        message: String,
    },
}

impl PorticoError {
    /// Creates an input validation error for a target.
    #[must_use]
    pub fn validation(target: &'static str, issues: SchemaIssues) -> Self {
        Self::Validation { target, issues }
    }

    /// Creates a response validation error wrapping its cause.
    #[must_use]
    pub fn response_validation(
        cause: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::ResponseValidation {
            cause: cause.into(),
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::ResponseValidation { .. } | Self::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Returns the machine-readable error code for the envelope.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::ResponseValidation { .. } => "RESPONSE_VALIDATION",
            Self::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    /// Converts this error into its HTTP response.
    ///
    /// Validation errors carry their issue list in the envelope; response
    /// validation errors expose only the fixed message, never the cause.
    #[must_use]
    pub fn into_response(self) -> Response {
        match &self {
            Self::Validation { target, issues } => {
                let body = serde_json::json!({
                    "error": {
                        "code": self.code(),
                        "message": format!("Request validation failed for {target}"),
                        "issues": issues.issues(),
                    }
                });
                http::Response::builder()
                    .status(self.status_code())
                    .header(http::header::CONTENT_TYPE, "application/json")
                    .body(bytes::Bytes::from(body.to_string()))
                    .expect("failed to build validation error response")
            }
            _ => Response::json_error(self.status_code(), self.code(), &self.to_string()),
        }
    }
}
