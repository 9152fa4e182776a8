//! System endpoints of the demo application.

use axum::{Json, http::Method, routing};
use serde_json::{Value, json};

use crate::domains::tools::{Endpoint, HandlerSignature, ToolApp, ToolMeta, TypeHint};

/// Tool name of the health check.
pub const HEALTH_CHECK: &str = "health_check";

/// Check if the API is running correctly.
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Internal endpoint that is not published as a tool.
pub async fn internal_stats() -> Json<Value> {
    Json(json!({ "active_users": 100 }))
}

pub fn health_endpoint() -> Endpoint {
    Endpoint::get("/", health_check)
        .doc("Check if the API is running correctly")
        .signature(HandlerSignature::new().returns_hint(TypeHint::Object))
        .tool(
            ToolMeta::new(HEALTH_CHECK)
                .description("Check API health status")
                .tag("system")
                .example_output(json!({"status": "ok", "version": "1.0.0"})),
        )
}

/// Mount the system routes.
pub fn mount(app: ToolApp) -> ToolApp {
    app.endpoint(health_endpoint())
        .route(Method::GET, "/internal/stats", routing::get(internal_stats))
}
