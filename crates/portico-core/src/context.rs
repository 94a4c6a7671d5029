//! Per-request context types.
//!
//! The [`RouteContext`] carries state through a route chain: a request id,
//! path parameters supplied by the routing engine, typed extensions, and the
//! validated outputs produced by input-validation stages.

use crate::schema::ValidationTarget;
use serde::{Deserialize, Serialize};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::time::Instant;
use uuid::Uuid;

/// A unique identifier for each request, using UUID v7.
///
/// UUID v7 is time-ordered, which makes it suitable for request tracking
/// and log correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new unique request ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Creates a `RequestId` from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Path parameters extracted by the routing engine for a matched route.
///
/// Stored as (name, value) pairs; routes rarely carry more than a handful.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Params {
    inner: Vec<(String, String)>,
}

impl Params {
    /// Creates a new empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parameter to the set.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.inner.push((name.into(), value.into()));
    }

    /// Returns the value for a parameter by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns true if there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns the number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns an iterator over the parameters.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

/// Context that flows through a route chain.
///
/// Mutable during chain processing: input-validation stages deposit their
/// coerced outputs here, where later stages and the handler can read them.
/// Nothing in the context is shared between concurrent requests.
#[derive(Debug)]
pub struct RouteContext {
    /// Unique identifier for this request.
    request_id: RequestId,

    /// When the request started processing.
    started_at: Instant,

    /// Path parameters from the route match.
    path_params: Params,

    /// Validated and coerced input values, keyed by target.
    validated: HashMap<ValidationTarget, serde_json::Value>,

    /// Type-erased extension data.
    extensions: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl RouteContext {
    /// Creates a new context with a fresh request ID.
    #[must_use]
    pub fn new() -> Self {
        Self {
            request_id: RequestId::new(),
            started_at: Instant::now(),
            path_params: Params::new(),
            validated: HashMap::new(),
            extensions: HashMap::new(),
        }
    }

    /// Creates a context carrying path parameters from a route match.
    #[must_use]
    pub fn with_path_params(path_params: Params) -> Self {
        Self {
            path_params,
            ..Self::new()
        }
    }

    /// Returns the request ID.
    #[must_use]
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Returns when the request started processing.
    #[must_use]
    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    /// Returns the elapsed time since the request started.
    #[must_use]
    pub fn elapsed(&self) -> std::time::Duration {
        self.started_at.elapsed()
    }

    /// Returns the path parameters for the matched route.
    #[must_use]
    pub fn path_params(&self) -> &Params {
        &self.path_params
    }

    /// Returns a mutable reference to path parameters.
    ///
    /// Populated by the routing engine before the chain runs.
    pub fn path_params_mut(&mut self) -> &mut Params {
        &mut self.path_params
    }

    /// Stores the validated output for an input target.
    ///
    /// Called by input-validation stages after a successful parse.
    pub fn set_valid(&mut self, target: ValidationTarget, value: serde_json::Value) {
        self.validated.insert(target, value);
    }

    /// Returns the validated output for an input target, if present.
    #[must_use]
    pub fn valid(&self, target: ValidationTarget) -> Option<&serde_json::Value> {
        self.validated.get(&target)
    }

    /// Stores a typed extension value.
    pub fn set_extension<T: Send + Sync + 'static>(&mut self, value: T) {
        self.extensions.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Retrieves a typed extension value.
    #[must_use]
    pub fn get_extension<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.extensions
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref())
    }

    /// Removes and returns a typed extension value.
    pub fn remove_extension<T: Send + Sync + 'static>(&mut self) -> Option<T> {
        self.extensions
            .remove(&TypeId::of::<T>())
            .and_then(|v| v.downcast().ok())
            .map(|b| *b)
    }

    /// Checks if an extension of the given type exists.
    #[must_use]
    pub fn has_extension<T: Send + Sync + 'static>(&self) -> bool {
        self.extensions.contains_key(&TypeId::of::<T>())
    }
}

impl Default for RouteContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_id_is_unique() {
        let a = RequestId::new();
        let b = RequestId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_params_lookup() {
        let mut params = Params::new();
        params.push("id", "42");
        params.push("action", "view");

        assert_eq!(params.get("id"), Some("42"));
        assert_eq!(params.get("action"), Some("view"));
        assert_eq!(params.get("missing"), None);
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_validated_outputs() {
        let mut ctx = RouteContext::new();
        assert!(ctx.valid(ValidationTarget::Query).is_none());

        ctx.set_valid(ValidationTarget::Query, json!({"count": 2}));
        assert_eq!(
            ctx.valid(ValidationTarget::Query),
            Some(&json!({"count": 2}))
        );
        assert!(ctx.valid(ValidationTarget::Body).is_none());
    }

    #[test]
    fn test_with_path_params() {
        let mut params = Params::new();
        params.push("id", "7");

        let ctx = RouteContext::with_path_params(params);
        assert_eq!(ctx.path_params().get("id"), Some("7"));
    }

    #[test]
    fn test_extensions() {
        #[derive(Debug, Clone, PartialEq)]
        struct Flag(bool);

        let mut ctx = RouteContext::new();
        assert!(!ctx.has_extension::<Flag>());

        ctx.set_extension(Flag(true));
        assert_eq!(ctx.get_extension::<Flag>(), Some(&Flag(true)));

        let removed = ctx.remove_extension::<Flag>();
        assert_eq!(removed, Some(Flag(true)));
        assert!(!ctx.has_extension::<Flag>());
    }
}
