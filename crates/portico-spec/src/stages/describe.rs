//! Documentation registration stage.
//!
//! Writes the route's documentation record into the shared [`DocsRegistry`]
//! when the stage is constructed, which happens during route registration,
//! before traffic is served. At request time the stage never touches the
//! request or response; it delegates immediately.

use crate::route_spec::RouteSpec;
use http::Method;
use portico_core::middleware::{BoxFuture, Middleware, Next};
use portico_core::{Request, Response, RouteContext};
use portico_docs::DocsRegistry;
use std::sync::Arc;

/// Pass-through stage that registered the route's documentation at
/// construction.
#[derive(Debug)]
pub struct DescribeRouteStage {
    method: Method,
    path: String,
}

impl DescribeRouteStage {
    /// Registers `spec`'s documentation for `method path` and returns the
    /// pass-through stage.
    #[must_use]
    pub fn new(registry: &Arc<DocsRegistry>, method: Method, path: &str, spec: &RouteSpec) -> Self {
        registry.register(spec.route_doc(method.clone(), path));
        tracing::debug!(method = %method, path, "registered route documentation");
        Self {
            method,
            path: path.to_string(),
        }
    }

    /// Returns the route method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the route path template.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl Middleware for DescribeRouteStage {
    fn name(&self) -> &'static str {
        "describe_route"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut RouteContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move { next.run(ctx, request).await })
    }
}
