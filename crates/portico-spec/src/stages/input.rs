//! Input validation stages.
//!
//! One [`InputValidationStage`] is composed per declared target. The stage
//! extracts the raw value for its target from the request, runs the schema
//! contract against it, and either deposits the coerced output in the
//! context or short-circuits the chain with HTTP 400. Later stages and the
//! handler never run after a failure.

use portico_core::middleware::{BoxFuture, Middleware, Next};
use portico_core::schema::{SchemaIssue, SchemaIssues, ValidateSchema, ValidationTarget};
use portico_core::{PorticoError, Request, Response, RouteContext};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Validates one input target against its declared schema.
pub struct InputValidationStage {
    target: ValidationTarget,
    schema: Arc<dyn ValidateSchema>,
}

impl InputValidationStage {
    /// Creates a validation stage for `target`.
    #[must_use]
    pub fn new(target: ValidationTarget, schema: Arc<dyn ValidateSchema>) -> Self {
        Self { target, schema }
    }

    /// Returns the target this stage validates.
    #[must_use]
    pub fn target(&self) -> ValidationTarget {
        self.target
    }
}

impl std::fmt::Debug for InputValidationStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputValidationStage")
            .field("target", &self.target)
            .finish()
    }
}

impl Middleware for InputValidationStage {
    fn name(&self) -> &'static str {
        match self.target {
            ValidationTarget::Body => "validate_body",
            ValidationTarget::Form => "validate_form",
            ValidationTarget::Query => "validate_query",
            ValidationTarget::Params => "validate_params",
            ValidationTarget::Headers => "validate_headers",
            ValidationTarget::Cookies => "validate_cookies",
        }
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut RouteContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            let raw = match raw_value(self.target, ctx, &request) {
                Ok(raw) => raw,
                Err(issues) => {
                    tracing::debug!(input = %self.target, %issues, "input could not be read");
                    return PorticoError::validation(self.target.name(), issues).into_response();
                }
            };

            match self.schema.parse_value(raw).await {
                Ok(valid) => {
                    ctx.set_valid(self.target, valid);
                    next.run(ctx, request).await
                }
                Err(issues) => {
                    tracing::debug!(input = %self.target, %issues, "input validation failed");
                    PorticoError::validation(self.target.name(), issues).into_response()
                }
            }
        })
    }
}

/// Extracts the raw value for a target from the incoming request.
fn raw_value(
    target: ValidationTarget,
    ctx: &RouteContext,
    request: &Request,
) -> Result<Value, SchemaIssues> {
    match target {
        ValidationTarget::Body => {
            if request.body().is_empty() {
                return Ok(Value::Null);
            }
            serde_json::from_slice(request.body()).map_err(|e| {
                SchemaIssues::single(SchemaIssue::root(format!("invalid JSON body: {e}")))
            })
        }
        ValidationTarget::Form => pairs_to_object(
            serde_urlencoded::from_bytes::<Vec<(String, String)>>(request.body()).map_err(|e| {
                SchemaIssues::single(SchemaIssue::root(format!("invalid form body: {e}")))
            })?,
        ),
        ValidationTarget::Query => pairs_to_object(
            serde_urlencoded::from_str::<Vec<(String, String)>>(
                request.uri().query().unwrap_or(""),
            )
            .map_err(|e| {
                SchemaIssues::single(SchemaIssue::root(format!("invalid query string: {e}")))
            })?,
        ),
        ValidationTarget::Params => {
            let mut map = Map::new();
            for (name, value) in ctx.path_params().iter() {
                map.insert(name.to_string(), Value::from(value));
            }
            Ok(Value::Object(map))
        }
        ValidationTarget::Headers => {
            let mut map = Map::new();
            for (name, value) in request.headers() {
                let text = value.to_str().map_err(|_| {
                    SchemaIssues::single(SchemaIssue::at(
                        name.as_str(),
                        "header value is not valid UTF-8",
                    ))
                })?;
                map.insert(name.as_str().to_string(), Value::from(text));
            }
            Ok(Value::Object(map))
        }
        ValidationTarget::Cookies => {
            let mut map = Map::new();
            if let Some(header) = request.headers().get(http::header::COOKIE) {
                let text = header.to_str().map_err(|_| {
                    SchemaIssues::single(SchemaIssue::root("cookie header is not valid UTF-8"))
                })?;
                for pair in text.split(';') {
                    if let Some((name, value)) = pair.trim().split_once('=') {
                        map.insert(name.to_string(), Value::from(value));
                    }
                }
            }
            Ok(Value::Object(map))
        }
    }
}

/// Collects urlencoded pairs into a JSON object; later duplicates win.
fn pairs_to_object(pairs: Vec<(String, String)>) -> Result<Value, SchemaIssues> {
    let mut map = Map::new();
    for (name, value) in pairs {
        map.insert(name, Value::from(value));
    }
    Ok(Value::Object(map))
}
