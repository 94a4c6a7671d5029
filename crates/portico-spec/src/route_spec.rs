//! Declarative route schema descriptors.
//!
//! A [`RouteSpec`] declares, for one route: optional input schemas per
//! validation target, documentation fields, and a mapping from response
//! status code to a [`ResponseSpec`]. Specs are built once at route
//! registration, are immutable afterward, and are shared across all requests
//! to the route.

use indexmap::IndexMap;
use portico_core::schema::{ValidateSchema, ValidationTarget};
use portico_core::FieldSchema;
use portico_docs::{MediaDoc, ResponseDoc, RouteDoc};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Media content declared for one MIME type of a response.
///
/// `schema`/`example` feed documentation only. `v_schema` is what activates
/// response validation for the status + content-type pair; without it the
/// entry is documented but unchecked.
#[derive(Clone, Default)]
pub struct MediaSpec {
    /// Documentation JSON Schema for the body.
    pub schema: Option<serde_json::Value>,
    /// Documentation example value.
    pub example: Option<serde_json::Value>,
    /// Validation contract the response body must satisfy.
    pub v_schema: Option<Arc<dyn ValidateSchema>>,
}

impl MediaSpec {
    /// A media entry that documents a body schema without enforcing it.
    #[must_use]
    pub fn documented(schema: serde_json::Value) -> Self {
        Self {
            schema: Some(schema),
            ..Self::default()
        }
    }

    /// A media entry enforced by the given validation contract.
    #[must_use]
    pub fn validated(schema: impl ValidateSchema) -> Self {
        Self {
            v_schema: Some(Arc::new(schema)),
            ..Self::default()
        }
    }

    /// A media entry enforced by a [`FieldSchema`], which also documents
    /// itself as JSON Schema.
    #[must_use]
    pub fn validated_fields(schema: FieldSchema) -> Self {
        Self {
            schema: Some(schema.json_schema()),
            example: None,
            v_schema: Some(Arc::new(schema)),
        }
    }

    /// Attaches a documentation example.
    #[must_use]
    pub fn example(mut self, example: serde_json::Value) -> Self {
        self.example = Some(example);
        self
    }
}

impl std::fmt::Debug for MediaSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaSpec")
            .field("schema", &self.schema)
            .field("example", &self.example)
            .field("v_schema", &self.v_schema.as_ref().map(|_| "<schema>"))
            .finish()
    }
}

/// Declared documentation and validation for one response status.
#[derive(Debug, Clone)]
pub struct ResponseSpec {
    /// Human-readable description, required for documentation.
    pub description: String,
    /// Content entries keyed by MIME type.
    pub content: IndexMap<String, MediaSpec>,
}

impl ResponseSpec {
    /// Creates a response spec with no content entries.
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            content: IndexMap::new(),
        }
    }

    /// Adds a content entry for a MIME type.
    #[must_use]
    pub fn media(mut self, mime: impl Into<String>, media: MediaSpec) -> Self {
        self.content.insert(mime.into(), media);
        self
    }

    /// Adds an `application/json` content entry.
    #[must_use]
    pub fn json(self, media: MediaSpec) -> Self {
        self.media("application/json", media)
    }

    /// Adds a `text/plain` content entry.
    #[must_use]
    pub fn text(self, media: MediaSpec) -> Self {
        self.media("text/plain", media)
    }
}

/// The declarative schema for one route.
#[derive(Clone, Default)]
pub struct RouteSpec {
    summary: Option<String>,
    description: Option<String>,
    tags: Vec<String>,
    deprecated: bool,
    body: Option<Arc<dyn ValidateSchema>>,
    form: Option<Arc<dyn ValidateSchema>>,
    query: Option<Arc<dyn ValidateSchema>>,
    params: Option<Arc<dyn ValidateSchema>>,
    headers: Option<Arc<dyn ValidateSchema>>,
    cookies: Option<Arc<dyn ValidateSchema>>,
    responses: BTreeMap<u16, ResponseSpec>,
}

impl RouteSpec {
    /// Creates a new spec builder.
    #[must_use]
    pub fn builder() -> RouteSpecBuilder {
        RouteSpecBuilder::default()
    }

    /// Returns the declared input schema for a target, if any.
    #[must_use]
    pub fn input(&self, target: ValidationTarget) -> Option<&Arc<dyn ValidateSchema>> {
        match target {
            ValidationTarget::Body => self.body.as_ref(),
            ValidationTarget::Form => self.form.as_ref(),
            ValidationTarget::Query => self.query.as_ref(),
            ValidationTarget::Params => self.params.as_ref(),
            ValidationTarget::Headers => self.headers.as_ref(),
            ValidationTarget::Cookies => self.cookies.as_ref(),
        }
    }

    /// Returns declared input targets and their schemas in evaluation order.
    pub fn inputs(&self) -> impl Iterator<Item = (ValidationTarget, Arc<dyn ValidateSchema>)> + '_ {
        ValidationTarget::all()
            .into_iter()
            .filter_map(|target| self.input(target).map(|schema| (target, schema.clone())))
    }

    /// Returns the declared response map.
    #[must_use]
    pub fn responses(&self) -> &BTreeMap<u16, ResponseSpec> {
        &self.responses
    }

    /// Consumes the spec, returning the response map.
    #[must_use]
    pub fn into_responses(self) -> BTreeMap<u16, ResponseSpec> {
        self.responses
    }

    /// Renders this spec as the documentation record for one route.
    #[must_use]
    pub fn route_doc(&self, method: http::Method, path: &str) -> RouteDoc {
        let responses = self
            .responses
            .iter()
            .map(|(status, spec)| {
                let content = spec
                    .content
                    .iter()
                    .map(|(mime, media)| {
                        (
                            mime.clone(),
                            MediaDoc {
                                schema: media.schema.clone(),
                                example: media.example.clone(),
                            },
                        )
                    })
                    .collect();
                (
                    *status,
                    ResponseDoc {
                        description: spec.description.clone(),
                        content,
                    },
                )
            })
            .collect();

        RouteDoc {
            method,
            path: path.to_string(),
            summary: self.summary.clone(),
            description: self.description.clone(),
            tags: self.tags.clone(),
            deprecated: self.deprecated,
            responses,
        }
    }
}

impl std::fmt::Debug for RouteSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let declared: Vec<&'static str> = ValidationTarget::all()
            .into_iter()
            .filter(|t| self.input(*t).is_some())
            .map(ValidationTarget::name)
            .collect();
        f.debug_struct("RouteSpec")
            .field("summary", &self.summary)
            .field("tags", &self.tags)
            .field("deprecated", &self.deprecated)
            .field("inputs", &declared)
            .field("responses", &self.responses.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Builder for [`RouteSpec`].
#[derive(Default)]
pub struct RouteSpecBuilder {
    spec: RouteSpec,
}

impl RouteSpecBuilder {
    /// Sets the route summary.
    #[must_use]
    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.spec.summary = Some(summary.into());
        self
    }

    /// Sets the route description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.spec.description = Some(description.into());
        self
    }

    /// Adds a grouping tag.
    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.spec.tags.push(tag.into());
        self
    }

    /// Marks the route deprecated.
    #[must_use]
    pub fn deprecated(mut self, deprecated: bool) -> Self {
        self.spec.deprecated = deprecated;
        self
    }

    /// Declares a JSON body schema.
    #[must_use]
    pub fn body(mut self, schema: impl ValidateSchema) -> Self {
        self.spec.body = Some(Arc::new(schema));
        self
    }

    /// Declares a form body schema.
    #[must_use]
    pub fn form(mut self, schema: impl ValidateSchema) -> Self {
        self.spec.form = Some(Arc::new(schema));
        self
    }

    /// Declares a query string schema.
    #[must_use]
    pub fn query(mut self, schema: impl ValidateSchema) -> Self {
        self.spec.query = Some(Arc::new(schema));
        self
    }

    /// Declares a path parameter schema.
    #[must_use]
    pub fn params(mut self, schema: impl ValidateSchema) -> Self {
        self.spec.params = Some(Arc::new(schema));
        self
    }

    /// Declares a header schema.
    #[must_use]
    pub fn headers(mut self, schema: impl ValidateSchema) -> Self {
        self.spec.headers = Some(Arc::new(schema));
        self
    }

    /// Declares a cookie schema.
    #[must_use]
    pub fn cookies(mut self, schema: impl ValidateSchema) -> Self {
        self.spec.cookies = Some(Arc::new(schema));
        self
    }

    /// Declares a response for a status code.
    #[must_use]
    pub fn response(mut self, status: u16, response: ResponseSpec) -> Self {
        self.spec.responses.insert(status, response);
        self
    }

    /// Builds the spec.
    #[must_use]
    pub fn build(self) -> RouteSpec {
        self.spec
    }
}
