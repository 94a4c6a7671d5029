//! Core middleware trait and chain types.
//!
//! A route is an ordered sequence of [`Middleware`] stages. Each stage
//! receives the mutable [`RouteContext`], the incoming request, and a
//! [`Next`] continuation for the remainder of the chain. A stage may produce
//! a response directly (short-circuiting everything after it) or delegate to
//! `next` and observe the eventual response on the way back out.
//!
//! # Invariants
//!
//! - A stage calls `next.run()` at most once (`Next` is consumed by `run`)
//! - Stages execute strictly sequentially within a request
//! - No error crosses the chain boundary uncaught; failures become responses

use crate::context::RouteContext;
use crate::types::{Request, Response};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// A boxed future, as returned by middleware stages.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A type-erased middleware stage that can be stored in a chain.
pub type BoxedMiddleware = Arc<dyn Middleware>;

/// A processing stage in a route chain.
pub trait Middleware: Send + Sync + 'static {
    /// Returns the unique name of this stage, used for logging and debugging.
    fn name(&self) -> &'static str;

    /// Processes the request through this stage.
    ///
    /// Returns the response, either produced here or obtained from the rest
    /// of the chain via `next`.
    fn process<'a>(
        &'a self,
        ctx: &'a mut RouteContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response>;
}

/// Continuation for the remainder of a route chain.
///
/// Consumed by [`Next::run`] so it can only be invoked once. A stage that
/// never runs its continuation short-circuits the chain.
pub struct Next<'a> {
    inner: NextInner<'a>,
}

enum NextInner<'a> {
    /// More stages to process.
    Chain {
        middleware: &'a dyn Middleware,
        next: Box<Next<'a>>,
    },
    /// End of chain: a fallback invoked when no stage produced a response.
    Fallback(Box<dyn FnOnce(&mut RouteContext, Request) -> BoxFuture<'static, Response> + Send + 'a>),
}

impl<'a> Next<'a> {
    /// Creates a `Next` that will invoke the given stage, then `next`.
    pub fn new(middleware: &'a dyn Middleware, next: Next<'a>) -> Self {
        Self {
            inner: NextInner::Chain {
                middleware,
                next: Box::new(next),
            },
        }
    }

    /// Creates a terminal `Next` invoking the given fallback.
    pub fn fallback<F>(f: F) -> Self
    where
        F: FnOnce(&mut RouteContext, Request) -> BoxFuture<'static, Response> + Send + 'a,
    {
        Self {
            inner: NextInner::Fallback(Box::new(f)),
        }
    }

    /// Invokes the next stage (or the fallback) in the chain.
    pub async fn run(self, ctx: &mut RouteContext, request: Request) -> Response {
        match self.inner {
            NextInner::Chain { middleware, next } => middleware.process(ctx, request, *next).await,
            NextInner::Fallback(f) => f(ctx, request).await,
        }
    }
}

/// Executes an ordered stage sequence against a request.
///
/// This plays the role of the routing engine's per-request invocation loop:
/// it links the stages into a [`Next`] chain, front stage outermost, and runs
/// it. The terminal fallback fires only if every stage delegated without
/// producing a response, which indicates a chain composed without a handler.
pub async fn run_chain(
    stages: &[BoxedMiddleware],
    ctx: &mut RouteContext,
    request: Request,
) -> Response {
    let mut next = Next::fallback(|_ctx, _req| {
        Box::pin(async {
            tracing::error!("route chain exhausted without producing a response");
            crate::error::PorticoError::internal("route chain has no terminal stage")
                .into_response()
        })
    });

    for middleware in stages.iter().rev() {
        next = Next::new(middleware.as_ref(), next);
    }

    next.run(ctx, request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ResponseExt;
    use bytes::Bytes;
    use http::{Request as HttpRequest, StatusCode};

    struct TagMiddleware {
        name: &'static str,
    }

    impl Middleware for TagMiddleware {
        fn name(&self) -> &'static str {
            self.name
        }

        fn process<'a>(
            &'a self,
            ctx: &'a mut RouteContext,
            request: Request,
            next: Next<'a>,
        ) -> BoxFuture<'a, Response> {
            Box::pin(async move {
                ctx.set_extension(format!("visited:{}", self.name));
                next.run(ctx, request).await
            })
        }
    }

    fn make_request() -> Request {
        HttpRequest::builder()
            .uri("/test")
            .body(Bytes::new())
            .unwrap()
    }

    struct Terminal;

    impl Middleware for Terminal {
        fn name(&self) -> &'static str {
            "handler"
        }

        fn process<'a>(
            &'a self,
            _ctx: &'a mut RouteContext,
            _request: Request,
            _next: Next<'a>,
        ) -> BoxFuture<'a, Response> {
            Box::pin(async { Response::error(StatusCode::OK, "OK") })
        }
    }

    fn terminal_ok() -> BoxedMiddleware {
        Arc::new(Terminal)
    }

    #[tokio::test]
    async fn test_chain_reaches_terminal_stage() {
        let stages: Vec<BoxedMiddleware> = vec![
            Arc::new(TagMiddleware { name: "first" }),
            Arc::new(TagMiddleware { name: "second" }),
            terminal_ok(),
        ];

        let mut ctx = RouteContext::new();
        let response = run_chain(&stages, &mut ctx, make_request()).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(ctx.get_extension::<String>(), Some(&"visited:second".to_string()));
    }

    #[tokio::test]
    async fn test_empty_chain_is_an_internal_error() {
        let stages: Vec<BoxedMiddleware> = vec![];
        let mut ctx = RouteContext::new();
        let response = run_chain(&stages, &mut ctx, make_request()).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["error"]["code"], "INTERNAL_ERROR");
    }

    #[tokio::test]
    async fn test_short_circuit_skips_later_stages() {
        struct Reject;

        impl Middleware for Reject {
            fn name(&self) -> &'static str {
                "reject"
            }

            fn process<'a>(
                &'a self,
                _ctx: &'a mut RouteContext,
                _request: Request,
                _next: Next<'a>,
            ) -> BoxFuture<'a, Response> {
                Box::pin(async { Response::error(StatusCode::BAD_REQUEST, "rejected") })
            }
        }

        let stages: Vec<BoxedMiddleware> = vec![
            Arc::new(Reject),
            Arc::new(TagMiddleware { name: "after" }),
            terminal_ok(),
        ];

        let mut ctx = RouteContext::new();
        let response = run_chain(&stages, &mut ctx, make_request()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(ctx.get_extension::<String>().is_none());
    }

    #[test]
    fn test_middleware_name() {
        let mw = TagMiddleware { name: "tagged" };
        assert_eq!(mw.name(), "tagged");
    }
}
