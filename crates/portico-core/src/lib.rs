//! # Portico Core
//!
//! Core types for the Portico route-spec layer:
//!
//! - [`Middleware`] / [`Next`] - the processing-stage chain
//! - [`RouteContext`] - per-request context with validated inputs
//! - [`ValidateSchema`] - the schema validation contract
//! - [`FieldSchema`] - the reference schema implementation
//! - [`PorticoError`] - standard error types

#![doc(html_root_url = "https://docs.rs/portico-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod context;
pub mod error;
pub mod middleware;
pub mod schema;
pub mod types;

pub use context::{Params, RequestId, RouteContext};
pub use error::PorticoError;
pub use middleware::{run_chain, BoxFuture, BoxedMiddleware, Middleware, Next};
pub use schema::{
    AdditionalFields, FieldRule, FieldSchema, SchemaIssue, SchemaIssues, ValidateSchema,
    ValidationTarget,
};
pub use types::{Request, Response, ResponseExt};
