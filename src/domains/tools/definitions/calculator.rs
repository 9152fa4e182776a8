//! Calculator endpoint of the demo application.

use axum::{Json, http::StatusCode};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::warn;

use crate::domains::tools::{Endpoint, HandlerSignature, ToolMeta};

/// Tool name of the calculator.
pub const CALCULATOR: &str = "calculator";

/// Arithmetic operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Add,
    Subtract,
    Multiply,
    Divide,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CalculationRequest {
    pub operation: Operation,
    pub a: f64,
    pub b: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CalculationResult {
    pub result: f64,
}

pub fn evaluate(request: &CalculationRequest) -> Option<f64> {
    let CalculationRequest { operation, a, b } = *request;
    match operation {
        Operation::Add => Some(a + b),
        Operation::Subtract => Some(a - b),
        Operation::Multiply => Some(a * b),
        Operation::Divide if b == 0.0 => None,
        Operation::Divide => Some(a / b),
    }
}

pub async fn calculate(
    Json(request): Json<CalculationRequest>,
) -> Result<Json<CalculationResult>, (StatusCode, Json<Value>)> {
    match evaluate(&request) {
        Some(result) => Ok(Json(CalculationResult { result })),
        None => {
            warn!("Rejected division by zero");
            Err((
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "error": "division by zero" })),
            ))
        }
    }
}

pub fn calculator_endpoint() -> Endpoint {
    Endpoint::post("/calculate", calculate)
        .doc(
            "Run a basic arithmetic operation.

# Arguments

* `operation` - One of add, subtract, multiply, divide
* `a` - Left operand
* `b` - Right operand",
        )
        .signature(
            HandlerSignature::new()
                .body::<CalculationRequest>()
                .returns::<CalculationResult>(),
        )
        .tool(
            ToolMeta::new(CALCULATOR)
                .tag("math")
                .example_input(json!({"operation": "add", "a": 5, "b": 3}))
                .example_output(json!({"result": 8.0})),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::{ToolApp, synthesize};

    fn request(operation: Operation, a: f64, b: f64) -> CalculationRequest {
        CalculationRequest { operation, a, b }
    }

    #[test]
    fn test_evaluate() {
        assert_eq!(evaluate(&request(Operation::Add, 5.0, 3.0)), Some(8.0));
        assert_eq!(evaluate(&request(Operation::Subtract, 5.0, 3.0)), Some(2.0));
        assert_eq!(evaluate(&request(Operation::Multiply, 5.0, 3.0)), Some(15.0));
        assert_eq!(evaluate(&request(Operation::Divide, 6.0, 3.0)), Some(2.0));
        assert_eq!(evaluate(&request(Operation::Divide, 6.0, 0.0)), None);
    }

    #[tokio::test]
    async fn test_division_by_zero_is_rejected() {
        let result = calculate(Json(request(Operation::Divide, 1.0, 0.0))).await;
        let (status, _) = result.unwrap_err();
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_declared_schema() {
        let app = ToolApp::new().endpoint(calculator_endpoint());
        let route = &app.routes()[0];
        let result = synthesize(route.tool.as_ref().unwrap(), &route.signature);

        assert!(!result.is_degraded(), "{:?}", result.errors);
        let input = &result.input_schema;
        assert_eq!(input["properties"]["operation"]["type"], "string");
        assert_eq!(
            input["properties"]["operation"]["enum"],
            json!(["add", "subtract", "multiply", "divide"])
        );
        assert_eq!(input["properties"]["a"]["type"], "number");
        assert_eq!(input["properties"]["b"]["type"], "number");
        assert_eq!(input["properties"]["a"]["description"], "Left operand");
        assert_eq!(input["required"], json!(["operation", "a", "b"]));
        assert_eq!(input["example"], json!({"operation": "add", "a": 5, "b": 3}));
        assert_eq!(result.description, "Run a basic arithmetic operation.");
    }
}
