//! Response validation stage.
//!
//! Runs after the handler has produced a response. If the route declares an
//! enforced schema for the response's status and content type, the body is
//! decoded and checked against it. A conforming body passes through
//! unchanged; a non-conforming one is replaced wholesale with an HTTP 500
//! whose message never exposes the underlying cause.

use crate::route_spec::ResponseSpec;
use portico_core::middleware::{BoxFuture, Middleware, Next};
use portico_core::{PorticoError, Request, Response, RouteContext};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Validates handler responses against declared response schemas.
pub struct ResponseValidationStage {
    responses: Arc<BTreeMap<u16, ResponseSpec>>,
}

impl ResponseValidationStage {
    /// Creates a stage enforcing the given status-keyed response specs.
    #[must_use]
    pub fn new(responses: Arc<BTreeMap<u16, ResponseSpec>>) -> Self {
        Self { responses }
    }

    async fn check(&self, response: Response) -> Response {
        let status = response.status().as_u16();
        let Some(spec) = self.responses.get(&status) else {
            tracing::debug!(status, "no response spec declared, passing through");
            return response;
        };

        let Some(essence) = content_essence(&response) else {
            tracing::debug!(status, "unrecognized content type, passing through");
            return response;
        };

        let Some(schema) = spec
            .content
            .get(essence.as_str())
            .and_then(|media| media.v_schema.clone())
        else {
            tracing::debug!(
                status,
                content_type = %essence,
                "no enforced schema for content type, passing through"
            );
            return response;
        };

        let value = match decode_body(&essence, response.body()) {
            Ok(Some(value)) => value,
            Ok(None) => {
                tracing::error!(
                    status,
                    content_type = %essence,
                    "response validation failed: no data to validate"
                );
                return PorticoError::response_validation("no data to validate").into_response();
            }
            Err(message) => {
                tracing::error!(status, content_type = %essence, %message, "response validation failed");
                return PorticoError::response_validation(message).into_response();
            }
        };

        match schema.parse_value(value).await {
            Ok(_) => response,
            Err(issues) => {
                tracing::error!(status, content_type = %essence, %issues, "response validation failed");
                PorticoError::response_validation(issues.to_string()).into_response()
            }
        }
    }
}

impl std::fmt::Debug for ResponseValidationStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseValidationStage")
            .field("statuses", &self.responses.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Middleware for ResponseValidationStage {
    fn name(&self) -> &'static str {
        "validate_response"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut RouteContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            let response = next.run(ctx, request).await;
            self.check(response).await
        })
    }
}

/// Returns the `type/subtype` essence of the response content type, if any.
fn content_essence(response: &Response) -> Option<String> {
    let header = response.headers().get(http::header::CONTENT_TYPE)?;
    let parsed: mime::Mime = header.to_str().ok()?.parse().ok()?;
    Some(parsed.essence_str().to_string())
}

/// Decodes the body for validation based on content type.
///
/// JSON bodies are parsed, plain text becomes a JSON string, and any other
/// content type yields `None` because there is nothing a schema can check.
fn decode_body(essence: &str, body: &bytes::Bytes) -> Result<Option<Value>, String> {
    match essence {
        "application/json" => serde_json::from_slice(body)
            .map(Some)
            .map_err(|e| format!("response body is not valid JSON: {e}")),
        "text/plain" => String::from_utf8(body.to_vec())
            .map(|s| Some(Value::String(s)))
            .map_err(|_| "response body is not valid UTF-8".to_string()),
        _ => Ok(None),
    }
}
