//! Process-wide route metadata registry.
//!
//! Route registration is sequential and happens before traffic is served, so
//! the registry is effectively write-once: the documentation stage writes one
//! entry per route at startup and the OpenAPI generator reads them afterward.

use http::Method;
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// Documented media content for one MIME type of a response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaDoc {
    /// JSON Schema describing the body, if declared.
    pub schema: Option<serde_json::Value>,
    /// Example value.
    pub example: Option<serde_json::Value>,
}

/// Documentation for one response status of a route.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseDoc {
    /// Human-readable description.
    pub description: String,
    /// Content by MIME type.
    pub content: IndexMap<String, MediaDoc>,
}

impl ResponseDoc {
    /// Creates a response doc with no content entries.
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            content: IndexMap::new(),
        }
    }
}

/// The metadata record registered for one route.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteDoc {
    /// HTTP method.
    pub method: Method,
    /// Route path template, e.g. `/items/{id}`.
    pub path: String,
    /// Short summary.
    pub summary: Option<String>,
    /// Full description.
    pub description: Option<String>,
    /// Grouping tags.
    pub tags: Vec<String>,
    /// Whether the route is deprecated.
    pub deprecated: bool,
    /// Response documentation keyed by status code.
    pub responses: BTreeMap<u16, ResponseDoc>,
}

/// Write-once registry of route documentation.
///
/// Populated during route registration, read by the OpenAPI generator.
/// No per-request mutation happens after startup.
#[derive(Debug, Default)]
pub struct DocsRegistry {
    routes: RwLock<Vec<RouteDoc>>,
}

impl DocsRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a route's documentation.
    ///
    /// Registering the same method+path twice replaces the earlier entry and
    /// logs a warning; it signals an authoring mistake, not a runtime fault.
    pub fn register(&self, doc: RouteDoc) {
        let mut routes = self.routes.write();
        if let Some(existing) = routes
            .iter_mut()
            .find(|r| r.method == doc.method && r.path == doc.path)
        {
            tracing::warn!(
                method = %doc.method,
                path = %doc.path,
                "route documentation registered twice, replacing earlier entry"
            );
            *existing = doc;
        } else {
            routes.push(doc);
        }
    }

    /// Returns a snapshot of all registered routes, in registration order.
    #[must_use]
    pub fn routes(&self) -> Vec<RouteDoc> {
        self.routes.read().clone()
    }

    /// Returns the number of registered routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.read().len()
    }

    /// Returns true if nothing has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.read().is_empty()
    }

    /// Looks up the registered documentation for one route.
    #[must_use]
    pub fn get(&self, method: &Method, path: &str) -> Option<RouteDoc> {
        self.routes
            .read()
            .iter()
            .find(|r| &r.method == method && r.path == path)
            .cloned()
    }
}
