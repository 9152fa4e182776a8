//! HTTP transport implementation.
//!
//! Serves the tools API (plain JSON listing, manual rescan and an
//! MCP-compatible JSON-RPC endpoint) next to the application's routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, instrument, warn};

use super::{TransportError, TransportResult, config::HttpConfig};
use crate::core::{ToolServer, config::ToolsConfig, server::INSTRUCTIONS};
use crate::domains::tools::{ScanIssue, ToolDescriptor, ToolError, ToolListing};

/// MCP protocol revision announced by `initialize`.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// HTTP transport handler.
pub struct HttpTransport {
    config: HttpConfig,
}

/// JSON-RPC request structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    pub method: String,
    #[serde(default)]
    pub params: Option<serde_json::Value>,
}

/// JSON-RPC response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC error structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl JsonRpcResponse {
    /// Create a success response.
    pub fn success(id: Option<serde_json::Value>, result: serde_json::Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response.
    pub fn error(id: Option<serde_json::Value>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
                data: None,
            }),
        }
    }

    /// Method not found error.
    pub fn method_not_found(id: Option<serde_json::Value>) -> Self {
        Self::error(id, -32601, "Method not found")
    }

    /// Invalid request error.
    pub fn invalid_request(id: Option<serde_json::Value>) -> Self {
        Self::error(id, -32600, "Invalid Request")
    }
}

/// Body of a manual rescan response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResponse {
    pub success: bool,
    pub tools_count: usize,
    pub tools: Vec<ToolDescriptor>,
    pub errors: Vec<ScanIssue>,
}

/// Application state shared across the API handlers.
#[derive(Clone)]
pub struct AppState {
    server: ToolServer,
}

/// Method and path of every API route under the configured prefix.
pub fn api_routes(config: &ToolsConfig) -> Vec<(Method, String)> {
    vec![
        (Method::GET, config.route("all")),
        (Method::GET, config.route("list")),
        (Method::POST, config.route("scan")),
        (Method::POST, config.route("mcp")),
        (Method::GET, config.route("tool/{name}")),
    ]
}

/// Build the API router. Paths match [`api_routes`].
pub fn api_router<S>(server: ToolServer) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let tools = server.config().tools.clone();
    Router::new()
        .route(&tools.route("all"), get(list_all))
        .route(&tools.route("list"), get(list_descriptors))
        .route(&tools.route("scan"), post(scan))
        .route(&tools.route("mcp"), post(handle_rpc))
        .route(&tools.route("tool/{name}"), get(get_tool))
        .with_state(AppState { server })
}

impl HttpTransport {
    /// Create a new HTTP transport with the given config.
    pub fn new(config: HttpConfig) -> Self {
        Self { config }
    }

    /// Get the bind address.
    pub fn address(&self) -> String {
        self.config.address()
    }

    /// Run the startup scan, then serve `app` until shutdown.
    pub async fn run(self, server: ToolServer, app: Router) -> TransportResult<()> {
        info!("Starting transport: {}", self.config.description());
        if let Some(listing) = server.startup().await {
            info!("Startup scan published {} tools", listing.count);
        }

        let mut app = app.layer(TraceLayer::new_for_http());

        // Add CORS if enabled
        if self.config.enable_cors {
            let cors = CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any);
            app = app.layer(cors);
        }

        let addr = self.address();
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| TransportError::bind(&addr, e))?;

        info!("Ready - listening on {}", addr);
        if server.config().tools.enable_api {
            for (method, path) in api_routes(&server.config().tools) {
                info!("  → {:<4} {}", method, path);
            }
        }

        axum::serve(listener, app)
            .await
            .map_err(|e| TransportError::http(e.to_string()))?;

        Ok(())
    }
}

/// Full listing.
#[instrument(skip_all)]
async fn list_all(State(state): State<AppState>) -> Json<ToolListing> {
    let listing = state.server.list_tools().await;
    info!("Listing {} tools", listing.count);
    Json(listing)
}

/// Descriptors only.
#[instrument(skip_all)]
async fn list_descriptors(State(state): State<AppState>) -> Json<Vec<ToolDescriptor>> {
    Json(state.server.list_tools().await.tools)
}

#[instrument(skip(state))]
async fn get_tool(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ToolDescriptor>, ToolError> {
    state.server.get_tool(&name).await.map(Json)
}

/// Manual rescan.
#[instrument(skip_all)]
async fn scan(State(state): State<AppState>) -> Json<ScanResponse> {
    info!("Manual refresh of tool registry requested");
    let listing = state.server.scan().await;
    Json(ScanResponse {
        success: listing.errors.is_empty(),
        tools_count: listing.count,
        tools: listing.tools,
        errors: listing.errors,
    })
}

/// Handle JSON-RPC requests.
#[instrument(skip_all, fields(method = tracing::field::Empty))]
async fn handle_rpc(
    State(state): State<AppState>,
    Json(request): Json<JsonRpcRequest>,
) -> impl IntoResponse {
    tracing::Span::current().record("method", request.method.as_str());
    info!("Received JSON-RPC request: {}", request.method);

    let response = process_request(&state, request).await;

    (StatusCode::OK, Json(response))
}

/// Process a JSON-RPC request and return the response.
async fn process_request(state: &AppState, request: JsonRpcRequest) -> JsonRpcResponse {
    // Validate JSON-RPC version
    if request.jsonrpc != "2.0" {
        return JsonRpcResponse::invalid_request(request.id);
    }

    match request.method.as_str() {
        "initialize" => handle_initialize(state, request),

        "ping" => JsonRpcResponse::success(request.id, serde_json::json!({})),

        "tools/list" => handle_tools_list(state, request).await,

        // Notifications (no response needed for stateless HTTP)
        method if method.starts_with("notifications/") => {
            info!("Received notification: {}", method);
            JsonRpcResponse::success(request.id, serde_json::json!(null))
        }

        _ => {
            warn!("Unknown method: {}", request.method);
            JsonRpcResponse::method_not_found(request.id)
        }
    }
}

/// Handle initialize request.
fn handle_initialize(state: &AppState, request: JsonRpcRequest) -> JsonRpcResponse {
    info!("Processing initialize request");

    let result = serde_json::json!({
        "protocolVersion": PROTOCOL_VERSION,
        "capabilities": {
            "tools": { "listChanged": false }
        },
        "serverInfo": {
            "name": state.server.name(),
            "version": state.server.version()
        },
        "instructions": INSTRUCTIONS
    });

    JsonRpcResponse::success(request.id, result)
}

/// Handle tools/list request.
async fn handle_tools_list(state: &AppState, request: JsonRpcRequest) -> JsonRpcResponse {
    info!("Processing tools/list request");

    let tools = state.server.mcp_tools().await;
    match serde_json::to_value(&tools) {
        Ok(tools) => JsonRpcResponse::success(request.id, serde_json::json!({ "tools": tools })),
        Err(e) => JsonRpcResponse::error(request.id, -32603, e.to_string()),
    }
}
