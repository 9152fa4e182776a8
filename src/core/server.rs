//! Tool server implementation and lifecycle management.
//!
//! `ToolServer` attaches the tools API to an application built with
//! [`ToolApp`], owns the registry that scans it and answers MCP
//! `tools/list` requests from the published listing.
//!
//! ## Attaching
//!
//! ```rust,no_run
//! use route_tools::core::{Config, ToolServer};
//! use route_tools::domains::tools::ToolApp;
//!
//! let app: ToolApp = ToolApp::new();
//! let (server, router) = ToolServer::attach(Config::default(), app);
//! ```
//!
//! The returned router serves the application routes plus the API under
//! the configured prefix. Nothing is scanned until [`ToolServer::startup`]
//! or [`ToolServer::scan`] runs.

use axum::Router;
use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler, model::*, service::RequestContext,
};
use std::sync::Arc;
use tracing::{info, instrument};

use super::config::Config;
use super::transport::http;
use crate::domains::tools::{ToolApp, ToolDescriptor, ToolError, ToolListing, ToolRegistry};

/// Instructions announced to MCP clients.
pub const INSTRUCTIONS: &str = "Tools published from this application's HTTP endpoints. \
                                Each tool lists the endpoint and method that invoke it.";

/// The tools server.
#[derive(Clone)]
pub struct ToolServer {
    /// Server configuration.
    config: Arc<Config>,

    /// Registry over the attached application's route table.
    registry: Arc<ToolRegistry>,
}

impl ToolServer {
    /// Attach the tools API to `app`.
    ///
    /// API routes are recorded as internal so a scan never publishes them.
    /// With `enable_api` off only the registry is created.
    pub fn attach<S>(config: Config, mut app: ToolApp<S>) -> (Self, Router<S>)
    where
        S: Clone + Send + Sync + 'static,
    {
        let config = Arc::new(config);

        if config.tools.enable_api {
            for (method, path) in http::api_routes(&config.tools) {
                app.record_internal(method, path);
            }
        }

        let (router, routes) = app.into_parts();
        let registry = Arc::new(ToolRegistry::from_config(routes, &config.tools));
        let server = Self { config, registry };

        let router = if server.config.tools.enable_api {
            info!("Tools API mounted under {}", server.config.tools.prefix);
            router.merge(http::api_router::<S>(server.clone()))
        } else {
            info!("Tools API disabled");
            router
        };

        (server, router)
    }

    /// Get the server name.
    pub fn name(&self) -> &str {
        &self.config.server.name
    }

    /// Get the server version.
    pub fn version(&self) -> &str {
        &self.config.server.version
    }

    /// Get the server configuration.
    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    /// Run the startup scan unless it is disabled.
    pub async fn startup(&self) -> Option<ToolListing> {
        self.registry.startup().await
    }

    /// The current listing.
    pub async fn list_tools(&self) -> ToolListing {
        self.registry.list().await
    }

    /// Rescan the route table and publish the result.
    pub async fn scan(&self) -> ToolListing {
        self.registry.scan().await
    }

    pub async fn get_tool(&self, name: &str) -> Result<ToolDescriptor, ToolError> {
        self.registry.get(name).await
    }

    /// The listing converted to MCP tool records.
    pub async fn mcp_tools(&self) -> Vec<Tool> {
        self.list_tools()
            .await
            .tools
            .iter()
            .map(ToolDescriptor::to_mcp_tool)
            .collect()
    }
}

impl ServerHandler for ToolServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: self.name().to_string(),
                version: self.version().to_string(),
                ..Implementation::from_build_env()
            },
            ..Default::default()
        }
    }

    #[instrument(skip(self, _context))]
    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        info!("Listing tools");
        Ok(ListToolsResult {
            tools: self.mcp_tools().await,
            next_cursor: None,
            meta: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::definitions::demo_app;
    use axum::http::Method;

    #[tokio::test]
    async fn test_attach_records_api_routes_as_internal() {
        let (server, _router) = ToolServer::attach(Config::default(), demo_app());
        let routes = server.registry().routes();

        assert!(routes.contains(&Method::GET, "/tools/all").await);
        assert!(routes.contains(&Method::POST, "/tools/scan").await);
        assert_eq!(routes.len().await, 10);

        let listing = server.scan().await;
        assert_eq!(listing.count, 4);
        assert!(listing.endpoints.iter().all(|e| !e.starts_with("/tools")));
    }

    #[tokio::test]
    async fn test_disabled_api_keeps_registry() {
        let mut config = Config::default();
        config.tools.enable_api = false;
        let (server, _router) = ToolServer::attach(config, demo_app());

        assert_eq!(server.registry().routes().len().await, 5);
        assert_eq!(server.scan().await.count, 4);
    }

    #[tokio::test]
    async fn test_startup_respects_config() {
        let mut config = Config::default();
        config.tools.scan_on_startup = false;
        let (server, _router) = ToolServer::attach(config, demo_app());

        assert!(server.startup().await.is_none());
        assert_eq!(server.list_tools().await.count, 0);
        assert!(server.mcp_tools().await.is_empty());
    }

    #[tokio::test]
    async fn test_mcp_tools_follow_listing() {
        let (server, _router) = ToolServer::attach(Config::default(), demo_app());
        server.scan().await;

        let tools = server.mcp_tools().await;
        let names: Vec<_> = tools.iter().map(|t| t.name.to_string()).collect();
        assert_eq!(
            names,
            vec!["health_check", "text_extractor", "get_document", "calculator"]
        );
    }

    #[test]
    fn test_server_info() {
        let (server, _router) = ToolServer::attach(Config::default(), demo_app());
        let info = server.get_info();

        assert_eq!(info.server_info.name, "route-tools");
        assert!(info.capabilities.tools.is_some());
        assert_eq!(info.instructions.as_deref(), Some(INSTRUCTIONS));
    }
}
