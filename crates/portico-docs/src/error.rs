//! Error types for the documentation crate.

use thiserror::Error;

/// Errors that can occur during documentation generation.
#[derive(Debug, Error)]
pub enum DocsError {
    /// Failed to serialize the OpenAPI document to JSON.
    #[error("Failed to serialize OpenAPI document: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A registered route carries an HTTP method the document cannot express.
    #[error("Unsupported HTTP method '{method}' for path '{path}'")]
    UnsupportedMethod {
        /// The offending method.
        method: String,
        /// The route path.
        path: String,
    },
}

/// Result type for documentation operations.
pub type DocsResult<T> = Result<T, DocsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialization_error() {
        let err: DocsError = serde_json::from_str::<String>("invalid")
            .unwrap_err()
            .into();
        assert!(matches!(err, DocsError::Serialization(_)));
        assert!(err.to_string().contains("serialize"));
    }

    #[test]
    fn test_unsupported_method_error() {
        let err = DocsError::UnsupportedMethod {
            method: "BREW".to_string(),
            path: "/coffee".to_string(),
        };
        assert!(err.to_string().contains("BREW"));
        assert!(err.to_string().contains("/coffee"));
    }
}
