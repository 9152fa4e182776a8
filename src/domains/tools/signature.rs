//! Declared handler signatures.
//!
//! axum handlers are plain async functions whose extractor types are erased
//! once they are mounted, so the parameters a tool accepts and the value it
//! returns are declared next to the handler. Structured parameters are
//! described by any `schemars::JsonSchema` type.

use schemars::{JsonSchema, Schema};
use serde_json::Value;
use std::fmt;

// ============================================================================
// Model schemas
// ============================================================================

/// A named schema generator for a structured data model.
#[derive(Clone, Copy)]
pub struct ModelSchema {
    name: &'static str,
    generate: fn() -> Schema,
}

fn root_schema<T: JsonSchema>() -> Schema {
    schemars::schema_for!(T)
}

impl ModelSchema {
    /// Schema generator for a `JsonSchema` type.
    pub fn of<T: JsonSchema>() -> Self {
        Self {
            name: short_type_name(std::any::type_name::<T>()),
            generate: root_schema::<T>,
        }
    }

    /// Schema generator backed by a hand-written function.
    pub fn from_fn(name: &'static str, generate: fn() -> Schema) -> Self {
        Self { name, generate }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Run the generator.
    pub fn generate(&self) -> Schema {
        (self.generate)()
    }
}

impl fmt::Debug for ModelSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ModelSchema").field(&self.name).finish()
    }
}

impl PartialEq for ModelSchema {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

/// `my_crate::models::Request<my_crate::Inner>` -> `Request<Inner>`
fn short_type_name(full: &'static str) -> &'static str {
    let head = full.split('<').next().unwrap_or(full);
    match head.rfind("::") {
        Some(idx) => &full[idx + 2..],
        None => full,
    }
}

// ============================================================================
// Type hints
// ============================================================================

/// The declared type of a parameter or response.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeHint {
    String,
    Integer,
    Number,
    Boolean,
    Null,
    Object,
    Array(Box<TypeHint>),
    Optional(Box<TypeHint>),
    /// A closed set of string values.
    Enum(Vec<String>),
    Model(ModelSchema),
}

impl TypeHint {
    /// Hint backed by a `JsonSchema` type.
    pub fn of<T: JsonSchema>() -> Self {
        Self::Model(ModelSchema::of::<T>())
    }

    pub fn array(inner: TypeHint) -> Self {
        Self::Array(Box::new(inner))
    }

    pub fn optional(inner: TypeHint) -> Self {
        Self::Optional(Box::new(inner))
    }

    pub fn enumeration<I, T>(values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self::Enum(values.into_iter().map(Into::into).collect())
    }

    /// Whether `null` is an accepted value without generating any schema.
    pub fn is_nullable(&self) -> bool {
        matches!(self, Self::Optional(_) | Self::Null)
    }
}

// ============================================================================
// Parameters
// ============================================================================

/// Where a parameter is read from in the HTTP request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Path,
    Query,
    Body,
}

/// Value bounds rendered as JSON Schema keywords.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Constraints {
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
}

impl Constraints {
    pub fn is_empty(&self) -> bool {
        self.minimum.is_none()
            && self.maximum.is_none()
            && self.min_length.is_none()
            && self.max_length.is_none()
    }
}

/// One declared handler parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    pub name: String,
    pub location: Location,
    pub hint: TypeHint,
    pub required: bool,
    pub default: Option<Value>,
    pub description: Option<String>,
    pub example: Option<Value>,
    pub constraints: Constraints,
    /// Merge an object model's fields into the tool's input properties
    /// instead of nesting them under `name`.
    pub flatten: bool,
}

impl ParamSpec {
    /// A required query parameter of the given type.
    pub fn new(name: impl Into<String>, hint: TypeHint) -> Self {
        let required = !hint.is_nullable();
        Self {
            name: name.into(),
            location: Location::Query,
            hint,
            required,
            default: None,
            description: None,
            example: None,
            constraints: Constraints::default(),
            flatten: false,
        }
    }

    /// A query parameter typed by a `JsonSchema` type. `Option<_>` types are
    /// optional.
    pub fn of<T: JsonSchema>(name: impl Into<String>) -> Self {
        let mut spec = Self::new(name, TypeHint::of::<T>());
        spec.required = !schema_accepts_null(&root_schema::<T>());
        spec
    }

    pub fn location(mut self, location: Location) -> Self {
        self.location = location;
        if location == Location::Path {
            self.required = true;
        }
        self
    }

    pub fn optional(mut self) -> Self {
        if self.location != Location::Path {
            self.required = false;
        }
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Declare a default value, which makes the parameter optional.
    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(value);
        self.optional()
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn example(mut self, example: Value) -> Self {
        self.example = Some(example);
        self
    }

    pub fn minimum(mut self, minimum: f64) -> Self {
        self.constraints.minimum = Some(minimum);
        self
    }

    pub fn maximum(mut self, maximum: f64) -> Self {
        self.constraints.maximum = Some(maximum);
        self
    }

    pub fn min_length(mut self, min_length: u64) -> Self {
        self.constraints.min_length = Some(min_length);
        self
    }

    pub fn max_length(mut self, max_length: u64) -> Self {
        self.constraints.max_length = Some(max_length);
        self
    }

    pub fn flattened(mut self) -> Self {
        self.flatten = true;
        self
    }
}

fn schema_accepts_null(schema: &Schema) -> bool {
    let value = schema.as_value();
    let typed_null = match value.get("type") {
        Some(Value::String(t)) => t == "null",
        Some(Value::Array(types)) => types.iter().any(|t| t == "null"),
        _ => false,
    };
    let variant_null = ["anyOf", "oneOf"].iter().any(|key| {
        value
            .get(*key)
            .and_then(Value::as_array)
            .is_some_and(|variants| variants.iter().any(|v| v.get("type") == Some(&Value::from("null"))))
    });
    typed_null || variant_null
}

// ============================================================================
// Handler signature
// ============================================================================

/// Everything the schema synthesizer knows about one handler.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HandlerSignature {
    pub params: Vec<ParamSpec>,
    pub response: Option<TypeHint>,
    pub doc: Option<String>,
}

impl HandlerSignature {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn param(mut self, spec: ParamSpec) -> Self {
        self.params.push(spec);
        self
    }

    /// A path segment such as `{doc_id}`.
    pub fn path<T: JsonSchema>(self, name: impl Into<String>) -> Self {
        self.param(ParamSpec::of::<T>(name).location(Location::Path))
    }

    /// A single query parameter.
    pub fn query_param<T: JsonSchema>(self, name: impl Into<String>) -> Self {
        self.param(ParamSpec::of::<T>(name).location(Location::Query))
    }

    /// A `Query<Q>` extractor; the struct's fields become tool properties.
    pub fn query<Q: JsonSchema>(self) -> Self {
        self.param(
            ParamSpec::of::<Q>("query")
                .location(Location::Query)
                .flattened(),
        )
    }

    /// A `Json<B>` extractor; an object model's fields become tool properties.
    pub fn body<B: JsonSchema>(self) -> Self {
        self.param(ParamSpec::of::<B>("body").location(Location::Body).flattened())
    }

    /// A `Json<B>` extractor exposed as a single property called `name`.
    pub fn body_as<B: JsonSchema>(self, name: impl Into<String>) -> Self {
        self.param(ParamSpec::of::<B>(name).location(Location::Body))
    }

    pub fn returns<R: JsonSchema>(mut self) -> Self {
        self.response = Some(TypeHint::of::<R>());
        self
    }

    pub fn returns_hint(mut self, hint: TypeHint) -> Self {
        self.response = Some(hint);
        self
    }

    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }
}
