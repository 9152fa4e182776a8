//! Published tool records.

use chrono::{DateTime, Utc};
use rmcp::model::Tool;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::sync::Arc;

use super::scanner::{ScanIssue, ScannedTool};
use super::schema::SynthesizedSchemas;

/// Health of a published tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolStatus {
    Ok,
    /// Some schema fragments fell back to minimal schemas.
    Degraded,
}

/// The published metadata and schemas of one tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub tags: BTreeSet<String>,
    pub endpoint: String,
    pub method: String,
    pub input_schema: Value,
    pub output_schema: Value,
    pub status: ToolStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl ToolDescriptor {
    pub fn new(tool: &ScannedTool, schemas: SynthesizedSchemas) -> Self {
        let status = if schemas.is_degraded() {
            ToolStatus::Degraded
        } else {
            ToolStatus::Ok
        };
        Self {
            name: tool.meta.name.clone(),
            description: schemas.description,
            tags: tool.meta.tags.clone(),
            endpoint: tool.endpoint.clone(),
            method: tool.method.to_string(),
            input_schema: schemas.input_schema,
            output_schema: schemas.output_schema,
            status,
            errors: schemas.errors,
        }
    }

    /// Convert to the MCP tool model.
    pub fn to_mcp_tool(&self) -> Tool {
        Tool {
            name: self.name.clone().into(),
            description: Some(self.description.clone().into()),
            input_schema: Arc::new(as_object(&self.input_schema)),
            annotations: None,
            output_schema: object_schema(&self.output_schema).map(Arc::new),
            icons: None,
            meta: None,
            title: None,
        }
    }
}

/// MCP only accepts output schemas of `type: "object"`.
fn object_schema(schema: &Value) -> Option<Map<String, Value>> {
    match schema {
        Value::Object(map) if map.get("type").and_then(Value::as_str) == Some("object") => {
            Some(map.clone())
        }
        _ => None,
    }
}

fn as_object(schema: &Value) -> Map<String, Value> {
    match schema {
        Value::Object(map) => map.clone(),
        _ => {
            let mut map = Map::new();
            map.insert("type".into(), Value::from("object"));
            map
        }
    }
}

/// The full listing served by the tools API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolListing {
    pub tools: Vec<ToolDescriptor>,
    pub count: usize,
    pub endpoints: Vec<String>,
    pub errors: Vec<ScanIssue>,
    /// When the listing was last rebuilt; `None` before the first scan.
    pub scanned_at: Option<DateTime<Utc>>,
}

impl ToolListing {
    pub fn new(
        tools: Vec<ToolDescriptor>,
        errors: Vec<ScanIssue>,
        scanned_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            count: tools.len(),
            endpoints: tools.iter().map(|t| t.endpoint.clone()).collect(),
            tools,
            errors,
            scanned_at,
        }
    }

    pub fn get(&self, name: &str) -> Option<&ToolDescriptor> {
        self.tools.iter().find(|t| t.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::meta::ToolMeta;
    use crate::domains::tools::routes::HandlerId;
    use crate::domains::tools::signature::HandlerSignature;
    use axum::http::Method;
    use serde_json::json;

    fn scanned() -> ScannedTool {
        ScannedTool {
            meta: ToolMeta::new("calculator").tags(["math"]),
            handler: HandlerId::new(&Method::POST, "/calculate"),
            method: Method::POST,
            endpoint: "/calculate".to_string(),
            signature: HandlerSignature::default(),
        }
    }

    fn schemas(errors: Vec<String>) -> SynthesizedSchemas {
        SynthesizedSchemas {
            description: "Run a basic arithmetic operation".to_string(),
            input_schema: json!({"type": "object", "properties": {}, "required": []}),
            output_schema: json!({"type": "object"}),
            errors,
        }
    }

    #[test]
    fn test_descriptor_json_shape() {
        let descriptor = ToolDescriptor::new(&scanned(), schemas(Vec::new()));
        let value = serde_json::to_value(&descriptor).unwrap();

        assert_eq!(value["name"], "calculator");
        assert_eq!(value["tags"], json!(["math"]));
        assert_eq!(value["method"], "POST");
        assert_eq!(value["status"], "ok");
        assert_eq!(value["inputSchema"]["type"], "object");
        assert_eq!(value["outputSchema"], json!({"type": "object"}));
        assert!(value.get("errors").is_none());
    }

    #[test]
    fn test_degraded_descriptor_lists_errors() {
        let descriptor =
            ToolDescriptor::new(&scanned(), schemas(vec!["parameter 'a' failed".to_string()]));
        assert_eq!(descriptor.status, ToolStatus::Degraded);

        let value = serde_json::to_value(&descriptor).unwrap();
        assert_eq!(value["status"], "degraded");
        assert_eq!(value["errors"], json!(["parameter 'a' failed"]));
    }

    #[test]
    fn test_mcp_tool_conversion() {
        let descriptor = ToolDescriptor::new(&scanned(), schemas(Vec::new()));
        let tool = descriptor.to_mcp_tool();

        assert_eq!(tool.name, "calculator");
        assert_eq!(tool.input_schema.get("type"), Some(&json!("object")));
        assert!(tool.output_schema.is_some());

        let value = serde_json::to_value(&tool).unwrap();
        assert_eq!(value["inputSchema"]["type"], "object");
    }

    #[test]
    fn test_mcp_tool_omits_non_object_output() {
        let mut string_output = schemas(Vec::new());
        string_output.output_schema = json!({"type": "string"});
        let descriptor = ToolDescriptor::new(&scanned(), string_output);

        // The plain listing still shows the response schema.
        assert_eq!(descriptor.output_schema, json!({"type": "string"}));

        let tool = descriptor.to_mcp_tool();
        assert!(tool.output_schema.is_none());
        let value = serde_json::to_value(&tool).unwrap();
        assert!(value.get("outputSchema").is_none_or(Value::is_null));
    }

    #[test]
    fn test_listing_counts_and_endpoints() {
        let descriptor = ToolDescriptor::new(&scanned(), schemas(Vec::new()));
        let listing = ToolListing::new(vec![descriptor], Vec::new(), Some(Utc::now()));

        assert_eq!(listing.count, 1);
        assert_eq!(listing.endpoints, vec!["/calculate".to_string()]);
        assert!(listing.get("calculator").is_some());
        assert!(listing.get("missing").is_none());
    }
}
