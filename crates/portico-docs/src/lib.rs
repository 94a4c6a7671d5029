//! # Portico Docs
//!
//! Route metadata collection and OpenAPI document generation.
//!
//! The documentation stage of each route chain writes a [`RouteDoc`] into the
//! shared [`DocsRegistry`] at registration time; [`OpenApiGenerator`] renders
//! the registry into an OpenAPI 3.1 document on demand.
//!
//! ```
//! use portico_docs::{DocsRegistry, OpenApiGenerator, RouteDoc};
//! use std::collections::BTreeMap;
//!
//! let registry = DocsRegistry::new();
//! registry.register(RouteDoc {
//!     method: http::Method::GET,
//!     path: "/health".to_string(),
//!     summary: Some("Health check".to_string()),
//!     description: None,
//!     tags: vec![],
//!     deprecated: false,
//!     responses: BTreeMap::new(),
//! });
//!
//! let document = OpenApiGenerator::new()
//!     .title("Service")
//!     .version("1.0.0")
//!     .generate(&registry)
//!     .unwrap();
//! assert!(document.paths.contains_key("/health"));
//! ```

#![doc(html_root_url = "https://docs.rs/portico-docs/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod openapi;
mod registry;

pub use error::{DocsError, DocsResult};
pub use openapi::{
    Info, MediaType, OpenApi, OpenApiGenerator, Operation, Parameter, ParameterIn, PathItem,
    Response, Tag,
};
pub use registry::{DocsRegistry, MediaDoc, ResponseDoc, RouteDoc};
