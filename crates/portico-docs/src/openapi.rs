//! OpenAPI document types and generation.
//!
//! The types here follow the OpenAPI 3.1 specification
//! (<https://spec.openapis.org/oas/v3.1.0>), reduced to the fields the route
//! registry can populate. Body schemas are carried as raw JSON Schema values
//! since they arrive pre-rendered from the validation layer.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{DocsError, DocsResult};
use crate::registry::{DocsRegistry, RouteDoc};

/// OpenAPI document root object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenApi {
    /// OpenAPI version (always "3.1.0").
    pub openapi: String,
    /// API metadata.
    pub info: Info,
    /// API paths and operations.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub paths: IndexMap<String, PathItem>,
    /// Tags for API grouping.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
}

/// API metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Info {
    /// API title.
    pub title: String,
    /// API version.
    pub version: String,
    /// API description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A path item containing operations for a single path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathItem {
    /// GET operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    /// PUT operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    /// POST operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    /// DELETE operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
    /// OPTIONS operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Operation>,
    /// HEAD operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head: Option<Operation>,
    /// PATCH operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
}

/// An API operation (one method on one path).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operation {
    /// Short summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Full description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Tags for grouping.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Whether deprecated.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub deprecated: bool,
    /// Parameters (path parameters lifted from the template).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    /// Responses keyed by status code.
    pub responses: IndexMap<String, Response>,
}

/// Parameter location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterIn {
    /// Query string parameter.
    Query,
    /// URL path parameter.
    Path,
    /// HTTP header.
    Header,
    /// Cookie.
    Cookie,
}

/// An operation parameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name.
    pub name: String,
    /// Parameter location.
    #[serde(rename = "in")]
    pub location: ParameterIn,
    /// Whether required.
    #[serde(default)]
    pub required: bool,
    /// Parameter schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<serde_json::Value>,
}

/// Response definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    /// Description (required).
    pub description: String,
    /// Response content by media type.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub content: IndexMap<String, MediaType>,
}

/// Media type content.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MediaType {
    /// JSON Schema for this media type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<serde_json::Value>,
    /// Example value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<serde_json::Value>,
}

/// API tag for grouping operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    /// Tag name.
    pub name: String,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Generator rendering a [`DocsRegistry`] into an OpenAPI document.
#[derive(Debug, Clone, Default)]
pub struct OpenApiGenerator {
    title: Option<String>,
    version: Option<String>,
    description: Option<String>,
}

impl OpenApiGenerator {
    /// Creates a new generator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the API version.
    #[must_use]
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Sets the API description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Renders the registry into an OpenAPI document.
    pub fn generate(&self, registry: &DocsRegistry) -> DocsResult<OpenApi> {
        let info = Info {
            title: self.title.clone().unwrap_or_else(|| "API".to_string()),
            version: self.version.clone().unwrap_or_else(|| "0.0.0".to_string()),
            description: self.description.clone(),
        };

        let mut paths: IndexMap<String, PathItem> = IndexMap::new();
        let mut tag_names: Vec<String> = Vec::new();

        for route in registry.routes() {
            for tag in &route.tags {
                if !tag_names.contains(tag) {
                    tag_names.push(tag.clone());
                }
            }

            let operation = convert_route(&route);
            let path_item = paths.entry(route.path.clone()).or_default();

            match route.method.as_str() {
                "GET" => path_item.get = Some(operation),
                "PUT" => path_item.put = Some(operation),
                "POST" => path_item.post = Some(operation),
                "DELETE" => path_item.delete = Some(operation),
                "OPTIONS" => path_item.options = Some(operation),
                "HEAD" => path_item.head = Some(operation),
                "PATCH" => path_item.patch = Some(operation),
                other => {
                    return Err(DocsError::UnsupportedMethod {
                        method: other.to_string(),
                        path: route.path.clone(),
                    });
                }
            }
        }

        let tags = tag_names
            .into_iter()
            .map(|name| Tag {
                name,
                description: None,
            })
            .collect();

        Ok(OpenApi {
            openapi: "3.1.0".to_string(),
            info,
            paths,
            tags,
        })
    }

    /// Renders the registry as pretty-printed JSON.
    pub fn generate_json(&self, registry: &DocsRegistry) -> DocsResult<String> {
        let document = self.generate(registry)?;
        serde_json::to_string_pretty(&document).map_err(DocsError::from)
    }
}

fn convert_route(route: &RouteDoc) -> Operation {
    let mut responses: IndexMap<String, Response> = IndexMap::new();
    for (status, doc) in &route.responses {
        let content = doc
            .content
            .iter()
            .map(|(mime, media)| {
                (
                    mime.clone(),
                    MediaType {
                        schema: media.schema.clone(),
                        example: media.example.clone(),
                    },
                )
            })
            .collect();

        responses.insert(
            status.to_string(),
            Response {
                description: doc.description.clone(),
                content,
            },
        );
    }

    Operation {
        summary: route.summary.clone(),
        description: route.description.clone(),
        tags: route.tags.clone(),
        deprecated: route.deprecated,
        parameters: extract_path_parameters(&route.path),
        responses,
    }
}

/// Extracts path parameters from a template like `/items/{id}`.
fn extract_path_parameters(path: &str) -> Vec<Parameter> {
    static PARAM_REGEX: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
    let param_regex =
        PARAM_REGEX.get_or_init(|| regex::Regex::new(r"\{([^}]+)\}").expect("valid regex"));

    let mut params = Vec::new();
    for cap in param_regex.captures_iter(path) {
        if let Some(name) = cap.get(1) {
            params.push(Parameter {
                name: name.as_str().to_string(),
                location: ParameterIn::Path,
                // Path parameters are always required
                required: true,
                schema: Some(serde_json::json!({"type": "string"})),
            });
        }
    }

    params
}
