//! Terminal handler stage.
//!
//! The user handler runs last in the composed chain. It receives the mutable
//! context, with validated inputs already deposited by the earlier stages,
//! and produces the response that the response validation stage will check.

use portico_core::middleware::{BoxFuture, Middleware, Next};
use portico_core::{Request, Response, RouteContext};

/// A route handler produces the response for a request.
///
/// Implemented for any `Fn(&mut RouteContext, Request) -> BoxFuture` closure,
/// so plain async blocks work:
///
/// ```
/// use portico_core::{Request, Response, ResponseExt, RouteContext};
/// use portico_core::middleware::BoxFuture;
///
/// fn handler(_ctx: &mut RouteContext, _request: Request) -> BoxFuture<'static, Response> {
///     Box::pin(async { Response::error(http::StatusCode::OK, "OK") })
/// }
/// ```
pub trait Handler: Send + Sync + 'static {
    /// Produces the response for a request.
    fn call(&self, ctx: &mut RouteContext, request: Request) -> BoxFuture<'static, Response>;
}

impl<F> Handler for F
where
    F: Fn(&mut RouteContext, Request) -> BoxFuture<'static, Response> + Send + Sync + 'static,
{
    fn call(&self, ctx: &mut RouteContext, request: Request) -> BoxFuture<'static, Response> {
        self(ctx, request)
    }
}

/// Wraps a [`Handler`] as the terminal stage of a chain.
///
/// Anything after this stage is unreachable; the wrapped handler always
/// produces the response.
pub struct HandlerStage<H> {
    handler: H,
}

impl<H: Handler> HandlerStage<H> {
    /// Wraps a handler.
    pub fn new(handler: H) -> Self {
        Self { handler }
    }
}

impl<H> std::fmt::Debug for HandlerStage<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerStage").finish()
    }
}

impl<H: Handler> Middleware for HandlerStage<H> {
    fn name(&self) -> &'static str {
        "handler"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut RouteContext,
        request: Request,
        _next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        self.handler.call(ctx, request)
    }
}
