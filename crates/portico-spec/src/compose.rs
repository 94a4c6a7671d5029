//! Composition of a route spec into an ordered middleware chain.

use crate::route_spec::RouteSpec;
use crate::stages::{
    DescribeRouteStage, Handler, HandlerStage, InputValidationStage, ResponseValidationStage,
};
use http::Method;
use portico_core::middleware::BoxedMiddleware;
use portico_docs::DocsRegistry;
use std::sync::Arc;

/// Composes a [`RouteSpec`] and a handler into an ordered middleware chain.
///
/// The chain runs, in order:
///
/// 1. documentation registration (a pass-through at request time; the
///    registry write happens here, during composition),
/// 2. one input validation stage per declared target, in the fixed order
///    body, form, query, params, headers, cookies,
/// 3. response validation for the declared response statuses,
/// 4. the handler.
///
/// The returned stages are ready to mount on a router; each request walks
/// them front to back via [`run_chain`](portico_core::middleware::run_chain).
///
/// # Example
///
/// ```
/// use portico_core::middleware::BoxFuture;
/// use portico_core::schema::{FieldRule, FieldSchema};
/// use portico_core::{Request, Response, ResponseExt, RouteContext};
/// use portico_docs::DocsRegistry;
/// use portico_spec::{with_route_spec, MediaSpec, ResponseSpec, RouteSpec};
/// use std::sync::Arc;
///
/// let registry = Arc::new(DocsRegistry::new());
/// let spec = RouteSpec::builder()
///     .summary("List products")
///     .query(
///         FieldSchema::builder()
///             .required("count", FieldRule::integer_min(1))
///             .build(),
///     )
///     .response(200, ResponseSpec::new("Success").json(MediaSpec::documented(
///         serde_json::json!({"type": "object"}),
///     )))
///     .build();
///
/// let chain = with_route_spec(
///     &registry,
///     http::Method::GET,
///     "/products",
///     spec,
///     |_ctx: &mut RouteContext, _request: Request| -> BoxFuture<'static, Response> {
///         Box::pin(async { Response::error(http::StatusCode::OK, "OK") })
///     },
/// );
///
/// assert_eq!(chain.len(), 4);
/// assert_eq!(registry.len(), 1);
/// ```
pub fn with_route_spec<H: Handler>(
    registry: &Arc<DocsRegistry>,
    method: Method,
    path: &str,
    spec: RouteSpec,
    handler: H,
) -> Vec<BoxedMiddleware> {
    let mut stages: Vec<BoxedMiddleware> = Vec::new();

    stages.push(Arc::new(DescribeRouteStage::new(
        registry,
        method.clone(),
        path,
        &spec,
    )));

    for (target, schema) in spec.inputs() {
        stages.push(Arc::new(InputValidationStage::new(target, schema)));
    }

    stages.push(Arc::new(ResponseValidationStage::new(Arc::new(
        spec.into_responses(),
    ))));

    stages.push(Arc::new(HandlerStage::new(handler)));

    tracing::debug!(method = %method, path, stages = stages.len(), "composed route chain");
    stages
}
