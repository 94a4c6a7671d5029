//! Schema validation contract and the reference field validator.
//!
//! The route chain depends only on [`ValidateSchema`]: given a raw value,
//! asynchronously produce a validated/coerced value or a structured issue
//! list. Any schema library can satisfy it. [`FieldSchema`] is the
//! batteries-included implementation used by tests and small services.

use crate::middleware::BoxFuture;
use serde_json::{Map, Value};
use thiserror::Error;

/// The input targets a route can declare schemas for.
///
/// The ordinal order is the fixed evaluation order of input-validation
/// stages within a route chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ValidationTarget {
    /// JSON request body.
    Body,
    /// URL-encoded form body.
    Form,
    /// URL query string.
    Query,
    /// Path parameters from the route match.
    Params,
    /// Request headers.
    Headers,
    /// Request cookies.
    Cookies,
}

impl ValidationTarget {
    /// Returns the target name used in logs and error envelopes.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Body => "body",
            Self::Form => "form",
            Self::Query => "query",
            Self::Params => "params",
            Self::Headers => "headers",
            Self::Cookies => "cookies",
        }
    }

    /// Returns all targets in evaluation order.
    #[must_use]
    pub const fn all() -> [Self; 6] {
        [
            Self::Body,
            Self::Form,
            Self::Query,
            Self::Params,
            Self::Headers,
            Self::Cookies,
        ]
    }
}

impl std::fmt::Display for ValidationTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A single validation issue.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SchemaIssue {
    /// Path to the offending value, outermost segment first.
    pub path: Vec<String>,
    /// Human-readable message.
    pub message: String,
}

impl SchemaIssue {
    /// Creates an issue at the given field path.
    #[must_use]
    pub fn at(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: vec![path.into()],
            message: message.into(),
        }
    }

    /// Creates an issue with no path (the value as a whole).
    #[must_use]
    pub fn root(message: impl Into<String>) -> Self {
        Self {
            path: Vec::new(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for SchemaIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.path.is_empty() {
            f.write_str(&self.message)
        } else {
            write!(f, "{}: {}", self.path.join("."), self.message)
        }
    }
}

/// A structured validation failure: one or more issues.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize)]
#[error("schema validation failed: {}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))]
pub struct SchemaIssues(pub Vec<SchemaIssue>);

impl SchemaIssues {
    /// Creates a failure from a single issue.
    #[must_use]
    pub fn single(issue: SchemaIssue) -> Self {
        Self(vec![issue])
    }

    /// Returns the issues.
    #[must_use]
    pub fn issues(&self) -> &[SchemaIssue] {
        &self.0
    }
}

/// The validation contract consumed by the route chain.
///
/// Implementations receive a raw [`Value`] and either return a validated
/// (possibly coerced) value or reject with a structured issue list. The
/// operation is async so contracts backed by remote validators can suspend.
pub trait ValidateSchema: Send + Sync + 'static {
    /// Validates `raw`, returning the coerced output value.
    fn parse_value<'a>(&'a self, raw: Value) -> BoxFuture<'a, Result<Value, SchemaIssues>>;
}

/// Per-field validation rule for [`FieldSchema`].
#[derive(Debug, Clone, PartialEq)]
pub enum FieldRule {
    /// String, optionally required to be non-empty.
    String {
        /// Reject empty strings when set.
        non_empty: bool,
    },
    /// Integer, optionally with an inclusive minimum.
    Integer {
        /// Inclusive lower bound.
        min: Option<i64>,
    },
    /// Any JSON number.
    Number,
    /// Boolean, optionally pinned to a literal value.
    Boolean {
        /// Required literal value when set.
        literal: Option<bool>,
    },
    /// JSON array.
    Array,
    /// JSON object.
    Object,
    /// No constraint.
    Any,
}

impl FieldRule {
    /// Any string.
    #[must_use]
    pub const fn string() -> Self {
        Self::String { non_empty: false }
    }

    /// A non-empty string.
    #[must_use]
    pub const fn non_empty_string() -> Self {
        Self::String { non_empty: true }
    }

    /// Any integer.
    #[must_use]
    pub const fn integer() -> Self {
        Self::Integer { min: None }
    }

    /// An integer with an inclusive minimum.
    #[must_use]
    pub const fn integer_min(min: i64) -> Self {
        Self::Integer { min: Some(min) }
    }

    /// Any number.
    #[must_use]
    pub const fn number() -> Self {
        Self::Number
    }

    /// Any boolean.
    #[must_use]
    pub const fn boolean() -> Self {
        Self::Boolean { literal: None }
    }

    /// A boolean pinned to a literal value.
    #[must_use]
    pub const fn boolean_literal(literal: bool) -> Self {
        Self::Boolean {
            literal: Some(literal),
        }
    }

    /// Any array.
    #[must_use]
    pub const fn array() -> Self {
        Self::Array
    }

    /// Any object.
    #[must_use]
    pub const fn object() -> Self {
        Self::Object
    }

    /// No constraint.
    #[must_use]
    pub const fn any() -> Self {
        Self::Any
    }

    /// Checks `value` against this rule, coercing string scalars where the
    /// rule expects a typed scalar (query strings and path parameters arrive
    /// as strings).
    fn coerce(&self, value: &Value) -> Result<Value, String> {
        match self {
            Self::String { non_empty } => match value {
                Value::String(s) => {
                    if *non_empty && s.is_empty() {
                        Err("must be a non-empty string".to_string())
                    } else {
                        Ok(value.clone())
                    }
                }
                _ => Err("expected a string".to_string()),
            },
            Self::Integer { min } => {
                if let Some(n) = match value {
                    Value::Number(n) => n.as_i64(),
                    Value::String(s) => s.parse::<i64>().ok(),
                    _ => None,
                } {
                    if let Some(min) = min {
                        if n < *min {
                            return Err(format!("must be >= {min}"));
                        }
                    }
                    return Ok(Value::from(n));
                }
                // Integers above i64::MAX: any i64 minimum already holds.
                let big = match value {
                    Value::Number(n) => n.as_u64(),
                    Value::String(s) => s.parse::<u64>().ok(),
                    _ => None,
                };
                big.map(Value::from)
                    .ok_or_else(|| "expected an integer".to_string())
            }
            Self::Number => match value {
                // Already a number: keep the original representation.
                Value::Number(_) => Ok(value.clone()),
                Value::String(s) => s
                    .parse::<f64>()
                    .ok()
                    .and_then(serde_json::Number::from_f64)
                    .map(Value::Number)
                    .ok_or_else(|| "expected a number".to_string()),
                _ => Err("expected a number".to_string()),
            },
            Self::Boolean { literal } => {
                let b = match value {
                    Value::Bool(b) => Some(*b),
                    Value::String(s) => match s.as_str() {
                        "true" => Some(true),
                        "false" => Some(false),
                        _ => None,
                    },
                    _ => None,
                };
                match b {
                    Some(b) => {
                        if let Some(expected) = literal {
                            if b != *expected {
                                return Err(format!("must be {expected}"));
                            }
                        }
                        Ok(Value::Bool(b))
                    }
                    None => Err("expected a boolean".to_string()),
                }
            }
            Self::Array => {
                if value.is_array() {
                    Ok(value.clone())
                } else {
                    Err("expected an array".to_string())
                }
            }
            Self::Object => {
                if value.is_object() {
                    Ok(value.clone())
                } else {
                    Err("expected an object".to_string())
                }
            }
            Self::Any => Ok(value.clone()),
        }
    }

    /// Renders this rule as a JSON Schema fragment.
    fn json_schema(&self) -> Value {
        match self {
            Self::String { non_empty } => {
                let mut schema = serde_json::json!({"type": "string"});
                if *non_empty {
                    schema["minLength"] = Value::from(1);
                }
                schema
            }
            Self::Integer { min } => {
                let mut schema = serde_json::json!({"type": "integer"});
                if let Some(min) = min {
                    schema["minimum"] = Value::from(*min);
                }
                schema
            }
            Self::Number => serde_json::json!({"type": "number"}),
            Self::Boolean { literal } => {
                let mut schema = serde_json::json!({"type": "boolean"});
                if let Some(literal) = literal {
                    schema["const"] = Value::Bool(*literal);
                }
                schema
            }
            Self::Array => serde_json::json!({"type": "array"}),
            Self::Object => serde_json::json!({"type": "object"}),
            Self::Any => serde_json::json!({}),
        }
    }
}

/// A declared field in a [`FieldSchema`].
#[derive(Debug, Clone)]
struct Field {
    name: String,
    rule: FieldRule,
    required: bool,
}

/// How a [`FieldSchema`] treats fields it does not declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdditionalFields {
    /// Drop undeclared fields from the output. The default: inputs such as
    /// headers and cookies routinely carry fields a route never declared.
    #[default]
    Strip,
    /// Copy undeclared fields into the output unchanged.
    Passthrough,
    /// Reject the input when an undeclared field is present.
    Deny,
}

/// An object schema of named fields with per-field rules.
///
/// Validates that the input is a JSON object, checks required fields, applies
/// each field's rule (coercing string scalars), and optionally rejects
/// undeclared fields. Implements [`ValidateSchema`], and can render itself as
/// a JSON Schema for documentation.
///
/// # Example
///
/// ```
/// use portico_core::schema::{FieldRule, FieldSchema};
///
/// let schema = FieldSchema::builder()
///     .required("count", FieldRule::integer_min(1))
///     .optional("note", FieldRule::string())
///     .build();
///
/// let out = schema.check(serde_json::json!({"count": "2"})).unwrap();
/// assert_eq!(out["count"], 2);
/// ```
#[derive(Debug, Clone)]
pub struct FieldSchema {
    fields: Vec<Field>,
    additional: AdditionalFields,
}

impl FieldSchema {
    /// Creates a new schema builder.
    #[must_use]
    pub fn builder() -> FieldSchemaBuilder {
        FieldSchemaBuilder::default()
    }

    /// Creates a schema that accepts any object, passing all fields through.
    #[must_use]
    pub fn any_object() -> Self {
        Self {
            fields: Vec::new(),
            additional: AdditionalFields::Passthrough,
        }
    }

    /// Validates `raw` synchronously, returning the coerced output object.
    pub fn check(&self, raw: Value) -> Result<Value, SchemaIssues> {
        let Some(obj) = raw.as_object() else {
            return Err(SchemaIssues::single(SchemaIssue::root(
                "expected an object",
            )));
        };

        let mut issues = Vec::new();
        let mut out = Map::new();

        for field in &self.fields {
            match obj.get(&field.name) {
                Some(value) => match field.rule.coerce(value) {
                    Ok(coerced) => {
                        out.insert(field.name.clone(), coerced);
                    }
                    Err(message) => issues.push(SchemaIssue::at(&field.name, message)),
                },
                None => {
                    if field.required {
                        issues.push(SchemaIssue::at(&field.name, "is required"));
                    }
                }
            }
        }

        for (name, value) in obj {
            if self.fields.iter().any(|f| &f.name == name) {
                continue;
            }
            match self.additional {
                AdditionalFields::Strip => {}
                AdditionalFields::Passthrough => {
                    out.insert(name.clone(), value.clone());
                }
                AdditionalFields::Deny => issues.push(SchemaIssue::at(name, "unexpected field")),
            }
        }

        if issues.is_empty() {
            Ok(Value::Object(out))
        } else {
            Err(SchemaIssues(issues))
        }
    }

    /// Renders this schema as a JSON Schema object for documentation.
    #[must_use]
    pub fn json_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();

        for field in &self.fields {
            properties.insert(field.name.clone(), field.rule.json_schema());
            if field.required {
                required.push(Value::from(field.name.clone()));
            }
        }

        let mut schema = Map::new();
        schema.insert("type".to_string(), Value::from("object"));
        schema.insert("properties".to_string(), Value::Object(properties));
        if !required.is_empty() {
            schema.insert("required".to_string(), Value::Array(required));
        }
        if self.additional == AdditionalFields::Deny {
            schema.insert("additionalProperties".to_string(), Value::Bool(false));
        }
        Value::Object(schema)
    }
}

impl ValidateSchema for FieldSchema {
    fn parse_value<'a>(&'a self, raw: Value) -> BoxFuture<'a, Result<Value, SchemaIssues>> {
        Box::pin(async move { self.check(raw) })
    }
}

/// Builder for [`FieldSchema`].
#[derive(Debug, Default)]
pub struct FieldSchemaBuilder {
    fields: Vec<Field>,
    additional: AdditionalFields,
}

impl FieldSchemaBuilder {
    /// Declares a required field.
    #[must_use]
    pub fn required(mut self, name: &str, rule: FieldRule) -> Self {
        self.fields.push(Field {
            name: name.to_string(),
            rule,
            required: true,
        });
        self
    }

    /// Declares an optional field.
    #[must_use]
    pub fn optional(mut self, name: &str, rule: FieldRule) -> Self {
        self.fields.push(Field {
            name: name.to_string(),
            rule,
            required: false,
        });
        self
    }

    /// Sets how undeclared fields are treated. The default strips them.
    #[must_use]
    pub fn additional(mut self, additional: AdditionalFields) -> Self {
        self.additional = additional;
        self
    }

    /// Builds the schema.
    #[must_use]
    pub fn build(self) -> FieldSchema {
        FieldSchema {
            fields: self.fields,
            additional: self.additional,
        }
    }
}
