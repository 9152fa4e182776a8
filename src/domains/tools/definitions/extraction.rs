//! Text extraction endpoint of the demo application.

use axum::Json;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, instrument};

use crate::domains::tools::{Endpoint, HandlerSignature, ToolMeta};

/// Tool name of the extractor.
pub const TEXT_EXTRACTOR: &str = "text_extractor";

fn default_max_tokens() -> u32 {
    100
}

/// Text to run the extractor on.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TextExtractionRequest {
    /// Source text.
    #[schemars(length(min = 1))]
    pub text: String,

    /// Maximum number of tokens to extract
    #[serde(default = "default_max_tokens")]
    #[schemars(range(min = 1, max = 10000))]
    pub max_tokens: u32,
}

/// What the extractor kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ExtractionResult {
    pub extracted_text: String,
    pub token_count: usize,
}

/// Keep the first `max_tokens` whitespace-separated tokens.
pub fn extract(request: &TextExtractionRequest) -> ExtractionResult {
    let extracted = request
        .text
        .split_whitespace()
        .take(request.max_tokens as usize)
        .collect::<Vec<_>>()
        .join(" ");
    ExtractionResult {
        token_count: extracted.split_whitespace().count(),
        extracted_text: extracted,
    }
}

#[instrument(skip_all, fields(max_tokens = request.max_tokens))]
pub async fn extract_text(Json(request): Json<TextExtractionRequest>) -> Json<ExtractionResult> {
    info!("Extracting from {} bytes of text", request.text.len());
    Json(extract(&request))
}

pub fn extract_endpoint() -> Endpoint {
    Endpoint::post("/extract", extract_text)
        .doc(
            "Extracts important information from provided text.

The extractor will analyze the input text and return the most relevant parts
up to the specified max_tokens limit.",
        )
        .signature(
            HandlerSignature::new()
                .body::<TextExtractionRequest>()
                .returns::<ExtractionResult>(),
        )
        .tool(
            ToolMeta::new(TEXT_EXTRACTOR)
                .description("Extract important information from text")
                .tags(["extraction", "text"])
                .example_input(json!({
                    "text": "Extract important information from this document.",
                    "max_tokens": 50
                }))
                .example_output(json!({
                    "extracted_text": "Important information from document",
                    "token_count": 5
                })),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::synthesize;

    #[test]
    fn test_extract_truncates_tokens() {
        let request = TextExtractionRequest {
            text: "one two  three\nfour".to_string(),
            max_tokens: 3,
        };
        assert_eq!(
            extract(&request),
            ExtractionResult {
                extracted_text: "one two three".to_string(),
                token_count: 3,
            }
        );
    }

    #[test]
    fn test_max_tokens_defaults_to_100() {
        let request: TextExtractionRequest =
            serde_json::from_value(json!({"text": "hello"})).unwrap();
        assert_eq!(request.max_tokens, 100);
    }

    #[test]
    fn test_declared_schema() {
        let routes = crate::domains::tools::ToolApp::new().endpoint(extract_endpoint());
        let route = &routes.routes()[0];
        let result = synthesize(route.tool.as_ref().unwrap(), &route.signature);

        assert!(!result.is_degraded(), "{:?}", result.errors);
        assert_eq!(result.input_schema["required"], json!(["text"]));
        assert_eq!(
            result.input_schema["properties"]["max_tokens"]["description"],
            "Maximum number of tokens to extract"
        );
        assert_eq!(result.output_schema["example"]["token_count"], 5);
    }
}
