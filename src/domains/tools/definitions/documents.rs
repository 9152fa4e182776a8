//! Document lookup endpoint of the demo application.

use axum::{
    Json,
    extract::{Path, Query},
};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::domains::tools::{Endpoint, HandlerSignature, ToolMeta, TypeHint};

/// Tool name of the document lookup.
pub const GET_DOCUMENT: &str = "get_document";

/// Query string of the document lookup.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct DocumentQuery {
    #[serde(default)]
    pub include_metadata: bool,
}

pub async fn get_document(
    Path(doc_id): Path<String>,
    Query(query): Query<DocumentQuery>,
) -> Json<Value> {
    let metadata = if query.include_metadata {
        json!({ "created": "2023-01-01" })
    } else {
        Value::Null
    };
    Json(json!({
        "id": doc_id,
        "title": format!("Document {}", doc_id),
        "metadata": metadata
    }))
}

pub fn document_endpoint() -> Endpoint {
    Endpoint::get("/document/{doc_id}", get_document)
        .doc(
            "Retrieve a document by its ID with optional metadata

Args:
    doc_id: Identifier of the document
    include_metadata: Attach creation metadata to the response",
        )
        .signature(
            HandlerSignature::new()
                .path::<String>("doc_id")
                .query::<DocumentQuery>()
                .returns_hint(TypeHint::Object),
        )
        .tool(
            ToolMeta::new(GET_DOCUMENT)
                .description("Retrieve a document by ID")
                .tag("documents"),
        )
}
