//! Tool registration metadata.
//!
//! A [`ToolMeta`] is attached to an endpoint when it is mounted. It marks the
//! handler as a tool without touching how axum invokes it.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

/// Metadata describing one published tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolMeta {
    /// Unique tool name.
    pub name: String,

    /// Explicit description. Falls back to the handler's doc summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Grouping tags.
    #[serde(default)]
    pub tags: BTreeSet<String>,

    /// Example arguments, copied verbatim into the input schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example_input: Option<Value>,

    /// Example result, copied verbatim into the output schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example_output: Option<Value>,
}

impl ToolMeta {
    /// Create metadata for a tool with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            tags: BTreeSet::new(),
            example_input: None,
            example_output: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    pub fn tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn example_input(mut self, example: Value) -> Self {
        self.example_input = Some(example);
        self
    }

    pub fn example_output(mut self, example: Value) -> Self {
        self.example_output = Some(example);
        self
    }
}
