//! Schema synthesizer.
//!
//! Turns a tool's metadata and declared [`HandlerSignature`] into an input
//! and output JSON Schema. Model schemas generated by `schemars` are expanded
//! in place: `$ref`s into `$defs` are inlined so nested models, enum value
//! lists and bounds appear directly under each property. Only recursive
//! models keep a `$ref`, with the referenced definitions hoisted to the root.
//!
//! Synthesis never fails as a whole. A fragment that cannot be derived is
//! replaced by a minimal schema and the problem is recorded in
//! [`SynthesizedSchemas::errors`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::collections::BTreeSet;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, error, warn};

use super::docstring::DocString;
use super::error::ToolError;
use super::meta::ToolMeta;
use super::signature::{Constraints, HandlerSignature, ModelSchema, ParamSpec, TypeHint};

/// Output of one synthesis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesizedSchemas {
    pub description: String,
    pub input_schema: Value,
    pub output_schema: Value,
    pub errors: Vec<String>,
}

impl SynthesizedSchemas {
    pub fn is_degraded(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Derive both schemas for one tool.
pub fn synthesize(meta: &ToolMeta, signature: &HandlerSignature) -> SynthesizedSchemas {
    let doc = signature
        .doc
        .as_deref()
        .map(DocString::parse)
        .unwrap_or_default();
    let mut errors = Vec::new();

    let input_schema = build_input(meta, signature, &doc, &mut errors);
    let output_schema = build_output(meta, signature, &mut errors);

    let description = meta
        .description
        .clone()
        .filter(|d| !d.trim().is_empty())
        .or_else(|| doc.summary.clone())
        .unwrap_or_default();

    if errors.is_empty() {
        debug!("Synthesized schemas for tool {}", meta.name);
    } else {
        warn!(
            "Synthesized degraded schemas for tool {}: {}",
            meta.name,
            errors.join("; ")
        );
    }

    SynthesizedSchemas {
        description,
        input_schema,
        output_schema,
        errors,
    }
}

// ============================================================================
// Input and output documents
// ============================================================================

fn build_input(
    meta: &ToolMeta,
    signature: &HandlerSignature,
    doc: &DocString,
    errors: &mut Vec<String>,
) -> Value {
    let mut properties = Map::new();
    let mut required: Vec<String> = Vec::new();
    let mut defs = Map::new();

    for param in &signature.params {
        let target = format!("parameter '{}'", param.name);
        let mut schema = hint_schema(&param.hint, &mut defs, errors, &target);

        if param.flatten {
            if let Some((fields, field_required)) = object_fields(&schema) {
                let mut inserted = Vec::with_capacity(fields.len());
                for (field, mut field_schema) in fields {
                    if let Some(description) = doc.param(&field) {
                        set_key(&mut field_schema, "description", json!(description));
                    }
                    if insert_property(&mut properties, &field, field_schema, errors) {
                        inserted.push(field);
                    }
                }
                // The model's own `required` list is in declaration order.
                if param.required {
                    for field in field_required.iter().filter(|f| inserted.contains(f)) {
                        push_unique(&mut required, field);
                    }
                }
                continue;
            }
        }

        annotate_param(&mut schema, param, doc);
        if insert_property(&mut properties, &param.name, schema, errors) && param.required {
            push_unique(&mut required, &param.name);
        }
    }

    let mut schema = Map::new();
    schema.insert("type".into(), json!("object"));
    schema.insert("properties".into(), Value::Object(properties));
    schema.insert("required".into(), json!(required));
    if !defs.is_empty() {
        schema.insert("$defs".into(), Value::Object(defs));
    }
    if let Some(example) = meta.example_input.clone().or_else(|| doc.example.clone()) {
        check_example(&example, &required, errors);
        schema.insert("example".into(), example);
    }
    Value::Object(schema)
}

fn build_output(meta: &ToolMeta, signature: &HandlerSignature, errors: &mut Vec<String>) -> Value {
    let mut defs = Map::new();
    let before = errors.len();

    let mut schema = match &signature.response {
        Some(hint) => hint_schema(hint, &mut defs, errors, "response"),
        None => json!({"type": "object"}),
    };
    if errors.len() > before && schema.as_object().is_some_and(Map::is_empty) {
        schema = json!({"type": "object"});
    }

    if let Value::Object(map) = &mut schema {
        if !defs.is_empty() {
            map.insert("$defs".into(), Value::Object(defs));
        }
        if let Some(example) = &meta.example_output {
            map.insert("example".into(), example.clone());
        }
    }
    schema
}

/// Returns false (and records an error) when the name is already taken.
fn insert_property(
    properties: &mut Map<String, Value>,
    name: &str,
    schema: Value,
    errors: &mut Vec<String>,
) -> bool {
    if properties.contains_key(name) {
        errors.push(
            ToolError::extraction(
                format!("property '{}'", name),
                "declared more than once; keeping the first declaration",
            )
            .to_string(),
        );
        return false;
    }
    properties.insert(name.to_string(), schema);
    true
}

fn push_unique(required: &mut Vec<String>, name: &str) {
    if !required.iter().any(|r| r == name) {
        required.push(name.to_string());
    }
}

fn set_key(schema: &mut Value, key: &str, value: Value) {
    if let Value::Object(map) = schema {
        map.insert(key.to_string(), value);
    }
}

fn annotate_param(schema: &mut Value, param: &ParamSpec, doc: &DocString) {
    let description = param.description.as_deref().or_else(|| doc.param(&param.name));
    if let Some(description) = description {
        set_key(schema, "description", json!(description));
    }
    if let Some(default) = &param.default {
        set_key(schema, "default", default.clone());
    }
    if let Some(example) = &param.example {
        set_key(schema, "examples", json!([example]));
    }
    apply_constraints(schema, &param.constraints);
}

fn apply_constraints(schema: &mut Value, constraints: &Constraints) {
    if constraints.is_empty() {
        return;
    }
    if let Some(minimum) = constraints.minimum {
        set_key(schema, "minimum", number(minimum));
    }
    if let Some(maximum) = constraints.maximum {
        set_key(schema, "maximum", number(maximum));
    }
    if let Some(min_length) = constraints.min_length {
        set_key(schema, "minLength", json!(min_length));
    }
    if let Some(max_length) = constraints.max_length {
        set_key(schema, "maxLength", json!(max_length));
    }
}

/// Whole floats render as integers so `1.0` bounds read as `1`.
fn number(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        json!(value as i64)
    } else {
        json!(value)
    }
}

/// Properties and required names of an object schema.
fn object_fields(schema: &Value) -> Option<(Map<String, Value>, Vec<String>)> {
    let map = schema.as_object()?;
    let is_object = match map.get("type") {
        Some(Value::String(t)) => t == "object",
        None => true,
        _ => false,
    };
    if !is_object {
        return None;
    }
    let properties = map.get("properties")?.as_object()?.clone();
    let required = map
        .get("required")
        .and_then(Value::as_array)
        .map(|names| {
            names
                .iter()
                .filter_map(Value::as_str)
                .map(String::from)
                .collect()
        })
        .unwrap_or_default();
    Some((properties, required))
}

fn check_example(example: &Value, required: &[String], errors: &mut Vec<String>) {
    match example {
        Value::Object(fields) => {
            for name in required {
                if !fields.contains_key(name) {
                    errors.push(
                        ToolError::extraction(
                            "example input",
                            format!("missing required property '{}'", name),
                        )
                        .to_string(),
                    );
                }
            }
        }
        _ => errors.push(
            ToolError::extraction("example input", "expected a JSON object").to_string(),
        ),
    }
}

// ============================================================================
// Type hints
// ============================================================================

fn hint_schema(
    hint: &TypeHint,
    defs: &mut Map<String, Value>,
    errors: &mut Vec<String>,
    target: &str,
) -> Value {
    match hint {
        TypeHint::String => json!({"type": "string"}),
        TypeHint::Integer => json!({"type": "integer"}),
        TypeHint::Number => json!({"type": "number"}),
        TypeHint::Boolean => json!({"type": "boolean"}),
        TypeHint::Null => json!({"type": "null"}),
        TypeHint::Object => json!({"type": "object"}),
        TypeHint::Array(inner) => json!({
            "type": "array",
            "items": hint_schema(inner, defs, errors, target),
        }),
        TypeHint::Optional(inner) => {
            let mut schema = hint_schema(inner, defs, errors, target);
            make_nullable(&mut schema);
            schema
        }
        TypeHint::Enum(values) => json!({"type": "string", "enum": values}),
        TypeHint::Model(model) => match expand_model(model) {
            Ok(expanded) => {
                errors.extend(
                    expanded
                        .unresolved
                        .iter()
                        .map(|reference| {
                            ToolError::extraction(
                                target,
                                format!("unresolvable reference '{}'", reference),
                            )
                            .to_string()
                        }),
                );
                for (name, def) in expanded.defs {
                    match defs.get(&name) {
                        Some(existing) if *existing != def => errors.push(
                            ToolError::extraction(
                                target,
                                format!(
                                    "definition '{}' conflicts with another model of the same name",
                                    name
                                ),
                            )
                            .to_string(),
                        ),
                        Some(_) => {}
                        None => {
                            defs.insert(name, def);
                        }
                    }
                }
                expanded.schema
            }
            Err(err) => {
                error!("Model schema for {} failed: {}", target, err);
                errors.push(format!("{} ({})", err, target));
                json!({})
            }
        },
    }
}

fn make_nullable(schema: &mut Value) {
    let Value::Object(map) = schema else {
        return;
    };
    if map.is_empty() {
        return;
    }
    if let Some(Value::Array(values)) = map.get_mut("enum") {
        if !values.contains(&Value::Null) {
            values.push(Value::Null);
        }
    }
    match map.get("type").cloned() {
        Some(Value::String(t)) => {
            if t != "null" {
                map.insert("type".into(), json!([t, "null"]));
            }
        }
        Some(Value::Array(mut types)) => {
            if !types.iter().any(|t| t == "null") {
                types.push(json!("null"));
                map.insert("type".into(), Value::Array(types));
            }
        }
        _ => {
            let inner = std::mem::take(map);
            *schema = json!({"anyOf": [Value::Object(inner), {"type": "null"}]});
        }
    }
}

// ============================================================================
// Model expansion
// ============================================================================

struct ExpandedModel {
    schema: Value,
    /// Definitions still referenced after inlining (recursive models only).
    defs: Map<String, Value>,
    unresolved: Vec<String>,
}

fn expand_model(model: &ModelSchema) -> Result<ExpandedModel, ToolError> {
    let generated = panic::catch_unwind(AssertUnwindSafe(|| model.generate()))
        .map_err(|_| ToolError::extraction(model.name(), "schema generator panicked"))?;
    let value = serde_json::to_value(&generated)
        .map_err(|e| ToolError::extraction(model.name(), e.to_string()))?;

    let mut root = match value {
        Value::Object(map) => map,
        Value::Bool(true) => Map::new(),
        _ => {
            return Err(ToolError::extraction(
                model.name(),
                "schema accepts no values",
            ));
        }
    };

    let mut defs = Map::new();
    for key in ["$defs", "definitions"] {
        if let Some(Value::Object(found)) = root.remove(key) {
            defs.extend(found);
        }
    }
    root.remove("$schema");
    root.remove("title");

    // A `$ref` of "#" points back at the root model itself.
    defs.entry(model.name().to_string())
        .or_insert_with(|| Value::Object(root.clone()));

    let mut resolver = RefResolver {
        defs: &defs,
        root_name: model.name(),
        stack: vec![model.name().to_string()],
        recursive: BTreeSet::new(),
        unresolved: Vec::new(),
    };
    let mut schema = Value::Object(root);
    resolver.resolve(&mut schema);

    // Expand the definitions that recursive references still point at; they
    // may reference further definitions in turn.
    let mut kept = Map::new();
    loop {
        let pending: Vec<String> = resolver
            .recursive
            .iter()
            .filter(|name| !kept.contains_key(*name))
            .cloned()
            .collect();
        if pending.is_empty() {
            break;
        }
        for name in pending {
            let mut def = defs.get(&name).cloned().unwrap_or_else(|| json!({}));
            resolver.stack = vec![name.clone()];
            resolver.resolve(&mut def);
            kept.insert(name, def);
        }
    }

    Ok(ExpandedModel {
        schema,
        defs: kept,
        unresolved: resolver.unresolved,
    })
}

struct RefResolver<'a> {
    defs: &'a Map<String, Value>,
    root_name: &'a str,
    stack: Vec<String>,
    recursive: BTreeSet<String>,
    unresolved: Vec<String>,
}

impl RefResolver<'_> {
    fn def_name(&self, reference: &str) -> Option<String> {
        if reference == "#" {
            return Some(self.root_name.to_string());
        }
        reference
            .strip_prefix("#/$defs/")
            .or_else(|| reference.strip_prefix("#/definitions/"))
            .map(String::from)
    }

    fn resolve(&mut self, value: &mut Value) {
        match value {
            Value::Object(map) => {
                let reference = match map.remove("$ref") {
                    Some(Value::String(reference)) => Some(reference),
                    Some(other) => {
                        map.insert("$ref".into(), other);
                        None
                    }
                    None => None,
                };

                for child in map.values_mut() {
                    self.resolve(child);
                }

                let Some(reference) = reference else {
                    return;
                };
                let Some(name) = self.def_name(&reference) else {
                    self.unresolved.push(reference);
                    return;
                };

                if self.stack.contains(&name) {
                    self.recursive.insert(name.clone());
                    map.insert("$ref".into(), json!(format!("#/$defs/{}", name)));
                    return;
                }

                let Some(def) = self.defs.get(&name) else {
                    self.unresolved.push(reference);
                    return;
                };

                let mut expanded = def.clone();
                self.stack.push(name);
                self.resolve(&mut expanded);
                self.stack.pop();

                // Keywords next to the `$ref` (usually a description) win.
                if let Value::Object(def_map) = expanded {
                    for (key, value) in def_map {
                        map.entry(key).or_insert(value);
                    }
                }
            }
            Value::Array(items) => {
                for item in items {
                    self.resolve(item);
                }
            }
            _ => {}
        }
    }
}
