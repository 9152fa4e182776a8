//! Tool-specific error types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Errors that can occur while scanning, synthesizing or serving tools.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The requested tool was not found.
    #[error("Tool not found: {0}")]
    NotFound(String),

    /// Two handlers registered the same tool name.
    #[error("Duplicate tool name '{name}' on {rejected} (already registered by {kept})")]
    DuplicateName {
        name: String,
        kept: String,
        rejected: String,
    },

    /// A schema fragment could not be derived.
    #[error("Schema extraction failed for {target}: {reason}")]
    SchemaExtraction { target: String, reason: String },
}

impl ToolError {
    /// Create a new "not found" error.
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound(name.into())
    }

    /// Create a new "duplicate name" error.
    pub fn duplicate(
        name: impl Into<String>,
        kept: impl Into<String>,
        rejected: impl Into<String>,
    ) -> Self {
        Self::DuplicateName {
            name: name.into(),
            kept: kept.into(),
            rejected: rejected.into(),
        }
    }

    /// Create a new schema extraction error.
    pub fn extraction(target: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SchemaExtraction {
            target: target.into(),
            reason: reason.into(),
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::DuplicateName { .. } => StatusCode::CONFLICT,
            Self::SchemaExtraction { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ToolError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        }));
        (status, body).into_response()
    }
}
