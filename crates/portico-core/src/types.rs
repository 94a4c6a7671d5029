//! Common HTTP types used throughout the route chain.
//!
//! Bodies are fully buffered [`Bytes`]. Post-handler stages inspect response
//! bodies, and a `Bytes` body can be duplicated without consuming the copy
//! that is ultimately sent to the client.

use bytes::Bytes;

/// The HTTP request type flowing through the route chain.
pub type Request = http::Request<Bytes>;

/// The HTTP response type flowing through the route chain.
pub type Response = http::Response<Bytes>;

/// Extension trait for building error responses.
pub trait ResponseExt {
    /// Creates a plain-text error response with the given status code.
    fn error(status: http::StatusCode, message: &str) -> Response;

    /// Creates a JSON error response using the standard envelope.
    fn json_error(status: http::StatusCode, code: &str, message: &str) -> Response;
}

impl ResponseExt for Response {
    fn error(status: http::StatusCode, message: &str) -> Response {
        http::Response::builder()
            .status(status)
            .header(http::header::CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(Bytes::from(message.to_string()))
            .expect("failed to build error response")
    }

    fn json_error(status: http::StatusCode, code: &str, message: &str) -> Response {
        let body = serde_json::json!({
            "error": {
                "code": code,
                "message": message
            }
        });

        http::Response::builder()
            .status(status)
            .header(http::header::CONTENT_TYPE, "application/json")
            .body(Bytes::from(body.to_string()))
            .expect("failed to build JSON error response")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;

    #[test]
    fn test_error_response() {
        let response = Response::error(StatusCode::BAD_REQUEST, "Invalid input");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers().get(http::header::CONTENT_TYPE).unwrap(),
            "text/plain; charset=utf-8"
        );
        assert_eq!(response.body().as_ref(), b"Invalid input");
    }

    #[test]
    fn test_json_error_response() {
        let response = Response::json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "RESPONSE_VALIDATION",
            "Response validation failed!",
        );
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.headers().get(http::header::CONTENT_TYPE).unwrap(),
            "application/json"
        );

        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["error"]["message"], "Response validation failed!");
    }

    #[test]
    fn test_response_body_is_cheaply_cloneable() {
        let response = Response::error(StatusCode::OK, "hello");
        let duplicate = response.body().clone();
        assert_eq!(duplicate, response.body().clone());
    }
}
