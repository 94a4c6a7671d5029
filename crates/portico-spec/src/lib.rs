//! Route-spec composition for portico services.
//!
//! A [`RouteSpec`] declares everything about a route in one place: its
//! documentation fields, the schemas its inputs must satisfy, and the
//! schemas its responses must satisfy. [`with_route_spec`] turns that
//! declaration plus a handler into an ordered middleware chain in which
//! documentation is registered once at startup, inputs are validated in a
//! fixed order before the handler runs, and responses are checked after it.
//!
//! ```
//! use portico_core::middleware::{run_chain, BoxFuture};
//! use portico_core::schema::{FieldRule, FieldSchema, ValidationTarget};
//! use portico_core::{Request, Response, ResponseExt, RouteContext};
//! use portico_docs::DocsRegistry;
//! use portico_spec::{with_route_spec, RouteSpec};
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let registry = Arc::new(DocsRegistry::new());
//! let chain = with_route_spec(
//!     &registry,
//!     http::Method::GET,
//!     "/items",
//!     RouteSpec::builder()
//!         .query(
//!             FieldSchema::builder()
//!                 .required("count", FieldRule::integer_min(1))
//!                 .build(),
//!         )
//!         .build(),
//!     |ctx: &mut RouteContext, _request: Request| -> BoxFuture<'static, Response> {
//!         let count = ctx
//!             .valid(ValidationTarget::Query)
//!             .and_then(|v| v["count"].as_i64())
//!             .unwrap_or(0);
//!         Box::pin(async move {
//!             Response::error(http::StatusCode::OK, &format!("count={count}"))
//!         })
//!     },
//! );
//!
//! let request = http::Request::builder()
//!     .uri("/items?count=2")
//!     .body(bytes::Bytes::new())
//!     .unwrap();
//! let mut ctx = RouteContext::new();
//! let response = run_chain(&chain, &mut ctx, request).await;
//! assert_eq!(response.status(), http::StatusCode::OK);
//! # }
//! ```

#![doc(html_root_url = "https://docs.rs/portico-spec/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod compose;
mod route_spec;
pub mod stages;

pub use compose::with_route_spec;
pub use route_spec::{MediaSpec, ResponseSpec, RouteSpec, RouteSpecBuilder};
pub use stages::{Handler, HandlerStage};
